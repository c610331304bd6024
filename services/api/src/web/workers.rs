//! services/api/src/web/workers.rs
//!
//! Worker-facing endpoints: the authenticated profile view, resume
//! re-upload, and the public worker directory.

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

use taskhive_core::{CoreError, ResumeUpload, Worker, WorkerSession};

use crate::error::ApiError;
use crate::web::middleware::SessionToken;
use crate::web::state::AppState;

//=========================================================================================
// Response Types
//=========================================================================================

/// The signed-in worker's own profile. `resume` is a fetchable URL, not the
/// stored reference.
#[derive(Serialize, ToSchema)]
pub struct ProfileResponse {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub resume: Option<String>,
    pub program: String,
    pub skills: String,
    pub experience: String,
}

/// One row of the public worker directory. Never carries the resume
/// reference or anything credential-adjacent.
#[derive(Serialize, ToSchema)]
pub struct WorkerSummary {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub program: String,
    pub skills: String,
    pub experience: String,
    pub verification_status: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<Worker> for WorkerSummary {
    fn from(worker: Worker) -> Self {
        Self {
            id: worker.id,
            name: worker.name,
            email: worker.email,
            program: worker.program,
            skills: worker.skills,
            experience: worker.experience,
            verification_status: worker.verification_status,
            created_at: worker.created_at,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct ResumeUpdatedResponse {
    pub message: String,
    pub resume: String,
}

//=========================================================================================
// Multipart collection
//=========================================================================================

/// Pulls the `resume` file part out of a multipart body, ignoring everything
/// else. Returns `None` when the part is absent so the core can report the
/// missing file.
async fn collect_resume(mut multipart: Multipart) -> Result<Option<ResumeUpload>, ApiError> {
    let mut resume: Option<ResumeUpload> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::Internal(format!("Failed to read multipart data: {}", e)))?
    {
        if field.name() != Some("resume") {
            continue;
        }
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

    Ok(resume)
}

//=========================================================================================
// Handlers
//=========================================================================================

/// GET /profile - The signed-in worker's profile, freshly read from storage
#[utoipa::path(
    get,
    path = "/profile",
    responses(
        (status = 200, description = "Current worker profile", body = ProfileResponse),
        (status = 401, description = "No worker session"),
        (status = 404, description = "Worker row no longer exists"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn profile_handler(
    State(state): State<Arc<AppState>>,
    Extension(view): Extension<WorkerSession>,
) -> Result<impl IntoResponse, ApiError> {
    // 1. Re-read the row; the session cache may lag behind a re-upload
    let worker = state
        .workers
        .find_by_id(view.worker_id)
        .await?
        .ok_or_else(|| CoreError::NotFound("Profile not found".to_string()))?;

    // 2. An absent or blank reference renders as a null resume
    let resume = worker
        .resume
        .as_deref()
        .and_then(|reference| state.resumes.resolve_url(reference).ok());

    Ok((
        StatusCode::OK,
        Json(ProfileResponse {
            id: worker.id,
            name: worker.name,
            email: worker.email,
            resume,
            program: worker.program,
            skills: worker.skills,
            experience: worker.experience,
        }),
    ))
}

/// POST /reuploadResume - Replace the signed-in worker's resume
#[utoipa::path(
    post,
    path = "/reuploadResume",
    request_body(
        content_type = "multipart/form-data",
        description = "A PDF file part named `resume`."
    ),
    responses(
        (status = 200, description = "Resume replaced", body = ResumeUpdatedResponse),
        (status = 400, description = "Missing resume or non-PDF upload"),
        (status = 401, description = "No worker session"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn reupload_resume_handler(
    State(state): State<Arc<AppState>>,
    Extension(token): Extension<SessionToken>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    // 1. Extract the replacement file
    let upload = collect_resume(multipart).await?;

    // 2. Persist, swap the row reference, refresh the session cache
    let reference = state
        .authority
        .reupload_resume(Some(token.0.as_str()), upload)
        .await?;

    Ok((
        StatusCode::OK,
        Json(ResumeUpdatedResponse {
            message: "Resume updated successfully".to_string(),
            resume: reference,
        }),
    ))
}

/// GET /getWorkers - Public directory of all registered workers
#[utoipa::path(
    get,
    path = "/getWorkers",
    responses(
        (status = 200, description = "All workers", body = [WorkerSummary]),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn get_workers_handler(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let workers = state.workers.list().await?;
    let summaries: Vec<WorkerSummary> = workers.into_iter().map(WorkerSummary::from).collect();
    Ok((StatusCode::OK, Json(summaries)))
}
