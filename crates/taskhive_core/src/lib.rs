pub mod authority;
pub mod domain;
pub mod error;
pub mod marketplace;
pub mod ports;
pub mod resume;
pub mod session;

pub use authority::SessionAuthority;
pub use domain::{
    ApplicantSnapshot, NewTask, NewWorker, Requestor, ResumeUpload, Session, SessionBinding, Task,
    TaskApplication, TaskDraft, Worker, WorkerProfile, WorkerRegistration, WorkerSession,
};
pub use error::{CoreError, CoreResult};
pub use marketplace::Marketplace;
pub use ports::{
    FileStore, NotificationSink, PortError, PortResult, SessionStore, TaskStore, WorkerStore,
};
pub use resume::ResumeManager;
pub use session::MemorySessionStore;
