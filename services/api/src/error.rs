//! services/api/src/error.rs
//!
//! Defines the primary error type for the entire API service and how each
//! failure class renders on the wire.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Serialize;
use tracing::error;
use utoipa::ToSchema;

use crate::config::ConfigError;
use taskhive_core::error::CoreError;
use taskhive_core::ports::PortError;

/// The wire shape of every failure: a reason for humans and a stable class
/// code for machines. Internal details never appear here; they go to the log.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
    pub code: String,
}

/// The primary error type for the `api` service.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// An error produced by a core marketplace operation. Carries the
    /// caller-facing reason and class.
    #[error("{0}")]
    Core(#[from] CoreError),

    /// Represents an error that propagated up from one of the core service ports.
    #[error("Service Port Error: {0}")]
    Port(#[from] PortError),

    /// Represents an error from the underlying database library.
    #[error("Database Error: {0}")]
    Database(#[from] sqlx::Error),

    /// Represents a standard Input/Output error (e.g., binding to a network socket).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A catch-all for any other unexpected errors.
    #[error("An unexpected internal error occurred: {0}")]
    Internal(String),
}

const GENERIC_INTERNAL: &str = "An unexpected internal error occurred";

impl ApiError {
    fn to_status_and_body(&self) -> (StatusCode, ErrorBody) {
        match self {
            ApiError::Core(core) => {
                let status = match core {
                    CoreError::Validation(_) => StatusCode::BAD_REQUEST,
                    CoreError::Conflict(_) => StatusCode::CONFLICT,
                    CoreError::Auth(_) => StatusCode::UNAUTHORIZED,
                    CoreError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
                    CoreError::NotFound(_) => StatusCode::NOT_FOUND,
                    CoreError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
                };
                if status == StatusCode::INTERNAL_SERVER_ERROR {
                    error!("Core operation failed: {}", core);
                    return (status, internal_body());
                }
                (
                    status,
                    ErrorBody {
                        error: core.to_string(),
                        code: core.code().to_string(),
                    },
                )
            }
            ApiError::Port(port) => match port {
                PortError::NotFound(_) => (
                    StatusCode::NOT_FOUND,
                    ErrorBody {
                        error: port.to_string(),
                        code: "NOT_FOUND".to_string(),
                    },
                ),
                PortError::Duplicate(_) => (
                    StatusCode::CONFLICT,
                    ErrorBody {
                        error: port.to_string(),
                        code: "CONFLICT".to_string(),
                    },
                ),
                PortError::Unexpected(_) => {
                    error!("Port operation failed: {}", port);
                    (StatusCode::INTERNAL_SERVER_ERROR, internal_body())
                }
            },
            other => {
                error!("Request failed: {}", other);
                (StatusCode::INTERNAL_SERVER_ERROR, internal_body())
            }
        }
    }
}

fn internal_body() -> ErrorBody {
    ErrorBody {
        error: GENERIC_INTERNAL.to_string(),
        code: "INTERNAL".to_string(),
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = self.to_status_and_body();
        (status, Json(body)).into_response()
    }
}
