//! crates/taskhive_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the
//! core to be independent of specific external implementations like databases
//! or the filesystem.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{NewTask, NewWorker, Session, Task, TaskApplication, Worker};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
///
/// Storage adapters must keep the three outcomes distinct: "the row is not
/// there", "the row would collide with an existing unique key", and "the
/// backend failed". The operation layer maps them onto caller-facing errors.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Duplicate key: {0}")]
    Duplicate(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// Durable worker records keyed by id, with a unique email index.
#[async_trait]
pub trait WorkerStore: Send + Sync {
    /// Inserts a new worker. Fails with [`PortError::Duplicate`] when the
    /// email is already registered; the check and the insert are one atomic
    /// step so concurrent registrations of the same email cannot both win.
    async fn insert(&self, new_worker: NewWorker) -> PortResult<Worker>;

    async fn find_by_email(&self, email: &str) -> PortResult<Option<Worker>>;

    async fn find_by_id(&self, id: i64) -> PortResult<Option<Worker>>;

    /// Replaces the current resume reference of an existing worker.
    async fn update_resume(&self, id: i64, reference: &str) -> PortResult<()>;

    /// All workers, insertion order.
    async fn list(&self) -> PortResult<Vec<Worker>>;
}

/// The durable collection of posted tasks.
#[async_trait]
pub trait TaskStore: Send + Sync {
    async fn insert(&self, new_task: NewTask) -> PortResult<Task>;

    async fn find_by_id(&self, id: i64) -> PortResult<Option<Task>>;

    /// Full ledger, insertion order.
    async fn list_all(&self) -> PortResult<Vec<Task>>;

    /// Tasks whose owning username matches exactly.
    async fn list_by_requestor(&self, username: &str) -> PortResult<Vec<Task>>;
}

/// Live sessions keyed by their opaque id.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn insert(&self, session: Session) -> PortResult<()>;

    /// Returns the session, or `None` when the id is unknown or the session
    /// has expired. Expired entries are evicted, never returned.
    async fn get(&self, id: &str) -> PortResult<Option<Session>>;

    /// Replaces a stored session (rebinding or refreshing its deadline).
    async fn update(&self, session: Session) -> PortResult<()>;

    /// Pushes out the deadline of a live session. The stored binding is left
    /// untouched; unknown ids are ignored.
    async fn touch(&self, id: &str, expires_at: DateTime<Utc>) -> PortResult<()>;

    /// Removes a session. Removing an unknown id is not an error.
    async fn remove(&self, id: &str) -> PortResult<()>;
}

/// Binary artifact persistence. Implementations must guarantee that two
/// concurrent writes never land under the same reference.
#[async_trait]
pub trait FileStore: Send + Sync {
    /// Persists the blob under `file_name` and returns the stable reference
    /// used to retrieve it later.
    async fn save(&self, file_name: &str, data: &[u8]) -> PortResult<String>;

    /// Deletes a previously saved blob. Unknown references are ignored so
    /// rollback paths can call this unconditionally.
    async fn remove(&self, reference: &str) -> PortResult<()>;
}

/// Outbound delivery of task applications to requestors. Whether the
/// recipient actually receives anything is the sink's responsibility.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn notify_application(
        &self,
        recipient: &str,
        application: &TaskApplication,
    ) -> PortResult<()>;
}
