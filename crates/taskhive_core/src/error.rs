//! crates/taskhive_core/src/error.rs
//!
//! The caller-facing error taxonomy for every core operation. Each class
//! tells the caller what to do next: resubmit, pick a different identity,
//! fix credentials, log in, or give up.

use crate::ports::PortError;

/// The primary error type for core marketplace operations.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Missing or malformed input; the caller must resubmit.
    #[error("{0}")]
    Validation(String),

    /// The identity is already taken; the caller must choose another.
    #[error("{0}")]
    Conflict(String),

    /// Bad credentials or a cross-role session conflict.
    #[error("{0}")]
    Auth(String),

    /// No valid session; the caller must log in.
    #[error("{0}")]
    Unauthenticated(String),

    /// The addressed resource does not exist. Kept distinct from auth
    /// failures so clients are never left guessing which one happened.
    #[error("{0}")]
    NotFound(String),

    /// Storage or filesystem failure; surfaced generically, never retried.
    #[error("{0}")]
    Internal(String),
}

impl CoreError {
    /// Stable machine-readable class code for the wire.
    pub fn code(&self) -> &'static str {
        match self {
            CoreError::Validation(_) => "VALIDATION",
            CoreError::Conflict(_) => "CONFLICT",
            CoreError::Auth(_) => "AUTH",
            CoreError::Unauthenticated(_) => "UNAUTHENTICATED",
            CoreError::NotFound(_) => "NOT_FOUND",
            CoreError::Internal(_) => "INTERNAL",
        }
    }
}

impl From<PortError> for CoreError {
    fn from(err: PortError) -> Self {
        match err {
            PortError::NotFound(msg) => CoreError::NotFound(msg),
            PortError::Duplicate(msg) => CoreError::Conflict(msg),
            PortError::Unexpected(msg) => CoreError::Internal(msg),
        }
    }
}

/// A convenience type alias for `Result<T, CoreError>`.
pub type CoreResult<T> = Result<T, CoreError>;
