//! services/api/src/web/probes.rs
//!
//! Liveness and readiness probes for deployment tooling.

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use std::sync::Arc;
use tracing::debug;

use crate::error::ApiError;
use crate::web::state::AppState;

/// GET /livez - Process is up
#[utoipa::path(
    get,
    path = "/livez",
    responses((status = 200, description = "Service is live"))
)]
pub async fn livez_handler() -> impl IntoResponse {
    debug!("service is live");
    StatusCode::OK
}

/// GET /healthz - Process is up and the database answers
#[utoipa::path(
    get,
    path = "/healthz",
    responses(
        (status = 200, description = "Service is healthy"),
        (status = 500, description = "Database unreachable")
    )
)]
pub async fn healthz_handler(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    state.db.ping().await?;
    debug!("service is healthy");
    Ok(StatusCode::OK)
}
