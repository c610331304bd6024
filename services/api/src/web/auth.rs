//! services/api/src/web/auth.rs
//!
//! Session endpoints: worker registration/login, requestor registration/login,
//! and logout. Role exclusivity and credential checks live in
//! `taskhive_core::SessionAuthority`; this module only translates HTTP.

use axum::{
    extract::{Multipart, State},
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use taskhive_core::{ResumeUpload, Session, WorkerProfile, WorkerRegistration, WorkerSession};

use crate::error::ApiError;
use crate::web::middleware::session_token;
use crate::web::state::AppState;

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Username/password pair for the requestor endpoints. Both fields default to
/// empty so that absent JSON keys reach the core validation instead of failing
/// deserialization with a bare 422.
#[derive(Deserialize, ToSchema)]
pub struct RequestorCredentials {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Full worker row as returned by registration.
#[derive(Serialize, ToSchema)]
pub struct WorkerProfileResponse {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub resume: Option<String>,
    pub program: String,
    pub skills: String,
    pub experience: String,
    pub verification_status: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<WorkerProfile> for WorkerProfileResponse {
    fn from(profile: WorkerProfile) -> Self {
        Self {
            id: profile.id,
            name: profile.name,
            email: profile.email,
            resume: profile.resume,
            program: profile.program,
            skills: profile.skills,
            experience: profile.experience,
            verification_status: profile.verification_status,
            created_at: profile.created_at,
        }
    }
}

/// The worker fields cached on the session, as seen by clients after login.
#[derive(Serialize, ToSchema)]
pub struct WorkerSessionView {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub resume: Option<String>,
    pub program: String,
    pub skills: String,
    pub experience: String,
    #[serde(rename = "userType")]
    pub user_type: String,
}

impl From<WorkerSession> for WorkerSessionView {
    fn from(view: WorkerSession) -> Self {
        Self {
            id: view.worker_id,
            name: view.name,
            email: view.email,
            resume: view.resume,
            program: view.program,
            skills: view.skills,
            experience: view.experience,
            user_type: "worker".to_string(),
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct LoginResponse {
    pub message: String,
    pub user: WorkerSessionView,
}

#[derive(Serialize, ToSchema)]
pub struct RequestorResponse {
    pub username: String,
}

#[derive(Serialize, ToSchema)]
pub struct RequestorLoginResponse {
    pub user: RequestorResponse,
}

#[derive(Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

//=========================================================================================
// Cookie helpers
//=========================================================================================

/// Builds the `Set-Cookie` value carrying a session token.
///
/// No `Secure` attribute: the reference deployment serves plain HTTP to the
/// static frontend.
fn session_cookie(session: &Session, max_age_secs: i64) -> String {
    format!(
        "session={}; HttpOnly; SameSite=Lax; Path=/; Max-Age={}",
        session.id, max_age_secs
    )
}

/// `Set-Cookie` value that expires the session cookie immediately.
fn clear_session_cookie() -> String {
    "session=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0".to_string()
}

//=========================================================================================
// Multipart collection
//=========================================================================================

/// Drains a `multipart/form-data` body into the registration fields plus the
/// optional `resume` file part. Unknown parts are ignored, matching the
/// permissive form handling of the original frontend.
async fn collect_registration(
    mut multipart: Multipart,
) -> Result<(WorkerRegistration, Option<ResumeUpload>), ApiError> {
    let mut registration = WorkerRegistration::default();
    let mut resume: Option<ResumeUpload> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::Internal(format!("Failed to read multipart data: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "resume" => {
                let file_name = field.file_name().unwrap_or("resume.pdf").to_string();
                let content_type = field.content_type().unwrap_or_default().to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::Internal(format!("Failed to read file bytes: {}", e)))?;
                resume = Some(ResumeUpload {
                    file_name,
                    content_type,
                    data,
                });
            }
            text_field => {
                let value = field.text().await.map_err(|e| {
                    ApiError::Internal(format!("Failed to read multipart data: {}", e))
                })?;
                match text_field {
                    "name" => registration.name = value,
                    "email" => registration.email = value,
                    "password" => registration.password = value,
                    "program" => registration.program = value,
                    "skills" => registration.skills = value,
                    "experience" => registration.experience = value,
                    _ => {}
                }
            }
        }
    }

    Ok((registration, resume))
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /registerWorker - Create a worker account from a multipart form
#[utoipa::path(
    post,
    path = "/registerWorker",
    request_body(
        content_type = "multipart/form-data",
        description = "Worker details plus a PDF file part named `resume`."
    ),
    responses(
        (status = 200, description = "Worker registered", body = WorkerProfileResponse),
        (status = 400, description = "Missing resume or non-PDF upload"),
        (status = 401, description = "A requestor session is active"),
        (status = 409, description = "Email is already registered"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn register_worker_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    // 1. Identify any session already attached to this client
    let token = session_token(&headers);

    // 2. Collect the form fields and the resume part
    let (registration, resume) = collect_registration(multipart).await?;

    // 3. Hand off to the authority (role guard, PDF check, hash, persist)
    let profile = state
        .authority
        .register_worker(token.as_deref(), registration, resume)
        .await?;

    // 4. Registration does not start a session; the client logs in next
    Ok((StatusCode::OK, Json(WorkerProfileResponse::from(profile))))
}

/// POST /login - Authenticate a worker and bind the session
#[utoipa::path(
    post,
    path = "/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 400, description = "Email or password missing"),
        (status = 401, description = "Bad credentials or a requestor session is active"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    // 1. Identify any session already attached to this client
    let token = session_token(&headers);

    // 2. Verify credentials and bind the session to the worker
    let (view, session) = state
        .authority
        .login_worker(token.as_deref(), &req.email, &req.password)
        .await?;

    // 3. Return the session cookie alongside the cached worker fields
    let cookie = session_cookie(&session, state.config.session_ttl_secs);
    let response = LoginResponse {
        message: "Login successful".to_string(),
        user: WorkerSessionView::from(view),
    };

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(response),
    ))
}

/// POST /logout - Destroy the current session, whichever role holds it
#[utoipa::path(
    post,
    path = "/logout",
    responses(
        (status = 200, description = "Logout successful", body = MessageResponse),
        (status = 500, description = "Session could not be destroyed")
    )
)]
pub async fn logout_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    // 1. A missing cookie is fine; logout is idempotent
    let token = session_token(&headers);

    // 2. Drop the session server-side
    state.authority.logout(token.as_deref()).await?;

    // 3. Expire the cookie client-side
    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, clear_session_cookie())],
        Json(MessageResponse {
            message: "Logged out successfully".to_string(),
        }),
    ))
}

/// POST /registerRequestor - Bind the session to a requestor username
#[utoipa::path(
    post,
    path = "/registerRequestor",
    request_body = RequestorCredentials,
    responses(
        (status = 200, description = "Requestor registered", body = RequestorResponse),
        (status = 400, description = "Username or password missing"),
        (status = 401, description = "A worker session is active"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn register_requestor_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<RequestorCredentials>,
) -> Result<impl IntoResponse, ApiError> {
    // 1. Identify any session already attached to this client
    let token = session_token(&headers);

    // 2. Registration and login collapse into one step for this role
    let (requestor, session) = state
        .authority
        .register_requestor(token.as_deref(), &req.username, &req.password)
        .await?;

    // 3. Return the session cookie and the bound username
    let cookie = session_cookie(&session, state.config.session_ttl_secs);
    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(RequestorResponse {
            username: requestor.username,
        }),
    ))
}

/// POST /loginRequestor - Bind the session to a requestor username
#[utoipa::path(
    post,
    path = "/loginRequestor",
    request_body = RequestorCredentials,
    responses(
        (status = 200, description = "Login successful", body = RequestorLoginResponse),
        (status = 401, description = "Empty credentials or a worker session is active"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn login_requestor_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<RequestorCredentials>,
) -> Result<impl IntoResponse, ApiError> {
    // 1. Identify any session already attached to this client
    let token = session_token(&headers);

    // 2. Presence-only credential check, then bind
    let (requestor, session) = state
        .authority
        .login_requestor(token.as_deref(), &req.username, &req.password)
        .await?;

    // 3. Return the session cookie and the bound username
    let cookie = session_cookie(&session, state.config.session_ttl_secs);
    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(RequestorLoginResponse {
            user: RequestorResponse {
                username: requestor.username,
            },
        }),
    ))
}
