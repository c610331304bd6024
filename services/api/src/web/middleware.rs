//! services/api/src/web/middleware.rs
//!
//! Session middleware for worker-protected routes.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use crate::error::ApiError;
use crate::web::state::AppState;

/// The raw session id a request arrived with, for handlers that need to act
/// on the session itself rather than the bound principal.
#[derive(Clone)]
pub struct SessionToken(pub String);

/// Pulls the session id out of the `session` cookie, if one is present.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|cookies| {
            cookies
                .split(';')
                .find_map(|c| c.trim().strip_prefix("session="))
        })
        .map(|token| token.to_string())
}

/// Middleware that resolves the session cookie to a worker binding.
///
/// On success the cached worker view and the raw token are inserted into the
/// request extensions for handlers to use. Anything else (no cookie, expired
/// session, requestor-bound session) is rejected with 401.
pub async fn require_worker(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    // 1. Extract the session id from the cookie header.
    let token = session_token(req.headers());

    // 2. Resolve it through the session authority.
    let view = state.authority.current_worker(token.as_deref()).await?;

    // 3. Insert the worker view and token into request extensions.
    //    Resolution only succeeds for a live token, so one is present here.
    req.extensions_mut().insert(view);
    req.extensions_mut().insert(SessionToken(token.unwrap_or_default()));

    // 4. Continue to the handler.
    Ok(next.run(req).await)
}
