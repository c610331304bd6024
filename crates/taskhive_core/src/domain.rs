//! crates/taskhive_core/src/domain.rs
//!
//! Defines the pure, core data structures for the marketplace.
//! These structs are independent of any database or serialization format.

use bytes::Bytes;
use chrono::{DateTime, NaiveDate, Utc};

/// A fully hydrated worker row, including the credential hash.
///
/// Only the storage layer and the session authority ever see this; everything
/// outward-facing works with [`WorkerProfile`].
#[derive(Debug, Clone)]
pub struct Worker {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub credential_hash: String,
    pub resume: Option<String>,
    pub program: String,
    pub skills: String,
    pub experience: String,
    pub verification_status: bool,
    pub created_at: DateTime<Utc>,
}

impl Worker {
    /// The public projection of this worker, with the credential stripped.
    pub fn profile(&self) -> WorkerProfile {
        WorkerProfile {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            resume: self.resume.clone(),
            program: self.program.clone(),
            skills: self.skills.clone(),
            experience: self.experience.clone(),
            verification_status: self.verification_status,
            created_at: self.created_at,
        }
    }

    /// The view of this worker cached on a session at login.
    pub fn session_view(&self) -> WorkerSession {
        WorkerSession {
            worker_id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            resume: self.resume.clone(),
            program: self.program.clone(),
            skills: self.skills.clone(),
            experience: self.experience.clone(),
        }
    }
}

/// A worker as returned to callers - never contains the credential.
#[derive(Debug, Clone)]
pub struct WorkerProfile {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub resume: Option<String>,
    pub program: String,
    pub skills: String,
    pub experience: String,
    pub verification_status: bool,
    pub created_at: DateTime<Utc>,
}

/// Insert payload for a new worker. The credential is already hashed by the
/// time this struct exists.
#[derive(Debug, Clone)]
pub struct NewWorker {
    pub name: String,
    pub email: String,
    pub credential_hash: String,
    pub resume: String,
    pub program: String,
    pub skills: String,
    pub experience: String,
}

/// Registration input as collected from the transport layer, raw password
/// included. Hashing happens inside the session authority.
#[derive(Debug, Clone, Default)]
pub struct WorkerRegistration {
    pub name: String,
    pub email: String,
    pub password: String,
    pub program: String,
    pub skills: String,
    pub experience: String,
}

/// A requestor exists only as session state; there is no durable record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requestor {
    pub username: String,
}

/// An uploaded resume file plus the metadata the client declared for it.
#[derive(Debug, Clone)]
pub struct ResumeUpload {
    pub file_name: String,
    pub content_type: String,
    pub data: Bytes,
}

/// The slice of a worker's profile cached on their session at login.
///
/// `/profile` re-reads the durable row; this cache exists so re-uploads can
/// refresh the session view together with the row update.
#[derive(Debug, Clone)]
pub struct WorkerSession {
    pub worker_id: i64,
    pub name: String,
    pub email: String,
    pub resume: Option<String>,
    pub program: String,
    pub skills: String,
    pub experience: String,
}

/// What a session currently represents.
///
/// At most one role is ever bound: the variants make the exclusivity
/// invariant a matter of types rather than of field checks. `Anonymous` is
/// the resolved state of a missing or expired token; it is never stored.
#[derive(Debug, Clone)]
pub enum SessionBinding {
    Anonymous,
    Worker(WorkerSession),
    Requestor(Requestor),
}

impl SessionBinding {
    pub fn is_worker(&self) -> bool {
        matches!(self, SessionBinding::Worker(_))
    }

    pub fn is_requestor(&self) -> bool {
        matches!(self, SessionBinding::Requestor(_))
    }
}

/// A live session: opaque id (carried in a cookie), one role binding, and
/// an inactivity deadline.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: String,
    pub binding: SessionBinding,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// A posted task. Immutable once created; there are no update or delete
/// operations.
#[derive(Debug, Clone)]
pub struct Task {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub deadline: NaiveDate,
    pub reward: String,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

/// Insert payload for a task, already validated and tagged with its owner.
#[derive(Debug, Clone)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub deadline: NaiveDate,
    pub reward: String,
    pub username: String,
}

/// Task fields as submitted by a requestor, before validation.
#[derive(Debug, Clone, Default)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub deadline: String,
    pub reward: String,
}

/// The profile snapshot a worker attaches when applying to a task. Clients
/// send whatever subset they have; the label falls back across the
/// identifying fields when addressing the applicant in the notification.
#[derive(Debug, Clone, Default)]
pub struct ApplicantSnapshot {
    pub name: Option<String>,
    pub email: Option<String>,
    pub username: Option<String>,
    pub resume: Option<String>,
    pub program: Option<String>,
    pub skills: Option<String>,
    pub experience: Option<String>,
}

impl ApplicantSnapshot {
    /// A display label for the applicant: name, then email, then username.
    pub fn label(&self) -> &str {
        self.name
            .as_deref()
            .or(self.email.as_deref())
            .or(self.username.as_deref())
            .unwrap_or("unknown worker")
    }
}

/// A transient application: never persisted, only forwarded to the task's
/// owning requestor through the notification sink.
#[derive(Debug, Clone)]
pub struct TaskApplication {
    pub task_id: i64,
    pub applicant: ApplicantSnapshot,
}
