//! services/api/src/web/mod.rs
//!
//! The HTTP surface: handler modules, session middleware, the master OpenAPI
//! definition, and the router that wires everything together.

pub mod auth;
pub mod middleware;
pub mod probes;
pub mod state;
pub mod tasks;
pub mod workers;

use axum::{
    extract::DefaultBodyLimit,
    http::{
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    services::ServeDir,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::web::state::AppState;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::register_worker_handler,
        auth::login_handler,
        auth::logout_handler,
        auth::register_requestor_handler,
        auth::login_requestor_handler,
        workers::profile_handler,
        workers::reupload_resume_handler,
        workers::get_workers_handler,
        tasks::post_task_handler,
        tasks::get_requestor_tasks_handler,
        tasks::get_all_tasks_handler,
        tasks::apply_task_handler,
        probes::livez_handler,
        probes::healthz_handler,
    ),
    components(
        schemas(
            auth::LoginRequest,
            auth::RequestorCredentials,
            auth::WorkerProfileResponse,
            auth::WorkerSessionView,
            auth::LoginResponse,
            auth::RequestorResponse,
            auth::RequestorLoginResponse,
            auth::MessageResponse,
            workers::ProfileResponse,
            workers::WorkerSummary,
            workers::ResumeUpdatedResponse,
            tasks::PostTaskRequest,
            tasks::TaskResponse,
            tasks::ApplicantSnapshotRequest,
            tasks::ApplyTaskRequest,
            crate::error::ErrorBody,
        )
    ),
    tags(
        (name = "TaskHive API", description = "Gig marketplace endpoints: worker accounts with PDF resumes, requestor sessions, and a shared task ledger.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// Router Assembly
//=========================================================================================

/// Builds the CORS layer from the configured origin allowlist. Origins that
/// fail to parse as header values are skipped.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE, ACCEPT])
}

/// Assembles the complete application router over the shared state.
///
/// Only `/profile` and `/reuploadResume` sit behind the worker-session
/// middleware; the task endpoints check the requestor binding inside the
/// marketplace operations instead.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = cors_layer(&state.config.allowed_origins);

    // Public routes (no session middleware)
    let public_routes = Router::new()
        .route("/registerWorker", post(auth::register_worker_handler))
        .route("/login", post(auth::login_handler))
        .route("/logout", post(auth::logout_handler))
        .route("/registerRequestor", post(auth::register_requestor_handler))
        .route("/loginRequestor", post(auth::login_requestor_handler))
        .route("/getWorkers", get(workers::get_workers_handler))
        .route("/postTask", post(tasks::post_task_handler))
        .route("/getRequestorTasks", get(tasks::get_requestor_tasks_handler))
        .route("/getAllTasks", get(tasks::get_all_tasks_handler))
        .route("/applyTask", post(tasks::apply_task_handler))
        .route("/livez", get(probes::livez_handler))
        .route("/healthz", get(probes::healthz_handler));

    // Protected routes (worker session required)
    let protected_routes = Router::new()
        .route("/profile", get(workers::profile_handler))
        .route("/reuploadResume", post(workers::reupload_resume_handler))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::require_worker,
        ));

    // Combine API routes; stored resumes are served back as static files
    let api_router = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .nest_service(
            "/uploads/resumes",
            ServeDir::new(state.config.upload_dir.clone()),
        )
        .layer(DefaultBodyLimit::max(10 * 1024 * 1024))
        .layer(cors)
        .with_state(state);

    // Merge the API router with the Swagger UI router for a complete application.
    Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
