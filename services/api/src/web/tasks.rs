//! services/api/src/web/tasks.rs
//!
//! Task ledger endpoints: posting (requestor-gated), the two listing views,
//! and application submission.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};

use taskhive_core::{ApplicantSnapshot, CoreError, Task, TaskApplication, TaskDraft};

use crate::error::ApiError;
use crate::web::auth::MessageResponse;
use crate::web::middleware::session_token;
use crate::web::state::AppState;

//=========================================================================================
// Request/Response Types
//=========================================================================================

/// Task fields as submitted by a requestor. Everything defaults to empty so
/// absent keys are reported by the field validation, not by serde.
#[derive(Deserialize, ToSchema)]
pub struct PostTaskRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub deadline: String,
    #[serde(default)]
    pub reward: String,
}

#[derive(Serialize, ToSchema)]
pub struct TaskResponse {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub deadline: NaiveDate,
    pub reward: String,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

impl From<Task> for TaskResponse {
    fn from(task: Task) -> Self {
        Self {
            id: task.id,
            title: task.title,
            description: task.description,
            deadline: task.deadline,
            reward: task.reward,
            username: task.username,
            created_at: task.created_at,
        }
    }
}

#[derive(Deserialize, IntoParams)]
pub struct TasksQuery {
    /// Requestor username whose tasks to list.
    pub username: Option<String>,
}

/// The profile snapshot a worker sends along with an application. All fields
/// are optional; the notification falls back across them for a display name.
#[derive(Deserialize, Default, ToSchema)]
#[serde(default)]
pub struct ApplicantSnapshotRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub username: Option<String>,
    pub resume: Option<String>,
    pub program: Option<String>,
    pub skills: Option<String>,
    pub experience: Option<String>,
}

impl From<ApplicantSnapshotRequest> for ApplicantSnapshot {
    fn from(req: ApplicantSnapshotRequest) -> Self {
        Self {
            name: req.name,
            email: req.email,
            username: req.username,
            resume: req.resume,
            program: req.program,
            skills: req.skills,
            experience: req.experience,
        }
    }
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApplyTaskRequest {
    pub task_id: Option<i64>,
    pub worker_profile: Option<ApplicantSnapshotRequest>,
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /postTask - Append a task to the ledger under the requestor's name
#[utoipa::path(
    post,
    path = "/postTask",
    request_body = PostTaskRequest,
    responses(
        (status = 200, description = "Task created", body = TaskResponse),
        (status = 400, description = "A field is missing or the deadline is not YYYY-MM-DD"),
        (status = 401, description = "No requestor session"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn post_task_handler(
    State(state): State<Arc<AppState>>,
    headers: axum::http::HeaderMap,
    Json(req): Json<PostTaskRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let token = session_token(&headers);
    let draft = TaskDraft {
        title: req.title,
        description: req.description,
        deadline: req.deadline,
        reward: req.reward,
    };

    let task = state.marketplace.post_task(token.as_deref(), draft).await?;

    Ok((StatusCode::OK, Json(TaskResponse::from(task))))
}

/// GET /getRequestorTasks - Tasks posted under one requestor username
#[utoipa::path(
    get,
    path = "/getRequestorTasks",
    params(TasksQuery),
    responses(
        (status = 200, description = "Tasks owned by the username", body = [TaskResponse]),
        (status = 400, description = "Username query parameter missing"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn get_requestor_tasks_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TasksQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let username = query
        .username
        .filter(|u| !u.is_empty())
        .ok_or_else(|| {
            CoreError::Validation("Username is required as a query parameter.".to_string())
        })?;

    let tasks = state.marketplace.list_by_requestor(&username).await?;
    let tasks: Vec<TaskResponse> = tasks.into_iter().map(TaskResponse::from).collect();

    Ok((StatusCode::OK, Json(tasks)))
}

/// GET /getAllTasks - The full task ledger, oldest first
#[utoipa::path(
    get,
    path = "/getAllTasks",
    responses(
        (status = 200, description = "All posted tasks", body = [TaskResponse]),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn get_all_tasks_handler(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let tasks = state.marketplace.list_all().await?;
    let tasks: Vec<TaskResponse> = tasks.into_iter().map(TaskResponse::from).collect();

    Ok((StatusCode::OK, Json(tasks)))
}

/// POST /applyTask - Forward a worker's profile to a task's owner
#[utoipa::path(
    post,
    path = "/applyTask",
    request_body = ApplyTaskRequest,
    responses(
        (status = 200, description = "Application forwarded", body = MessageResponse),
        (status = 400, description = "taskId or workerProfile missing"),
        (status = 404, description = "No task with that id"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn apply_task_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ApplyTaskRequest>,
) -> Result<impl IntoResponse, ApiError> {
    // 1. Both halves of the application are mandatory
    let (Some(task_id), Some(profile)) = (req.task_id, req.worker_profile) else {
        return Err(CoreError::Validation("Missing taskId or workerProfile.".to_string()).into());
    };

    // 2. Look up the owner and push the notification
    state
        .marketplace
        .apply_to_task(TaskApplication {
            task_id,
            applicant: ApplicantSnapshot::from(profile),
        })
        .await?;

    Ok((
        StatusCode::OK,
        Json(MessageResponse {
            message: "Application submitted. The requestor has been notified.".to_string(),
        }),
    ))
}
