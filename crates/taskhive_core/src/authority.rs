//! crates/taskhive_core/src/authority.rs
//!
//! The session authority: registration and login for both principal roles,
//! session resolution, logout, and resume re-upload. One session binds at
//! most one role at a time; every login/registration path checks the
//! opposite-role guard before doing any credential work, so the error names
//! the conflicting role instead of leaking credential validity.

use std::collections::HashMap;
use std::sync::Arc;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{Duration, Utc};
use tokio::sync::Mutex;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::domain::{
    NewWorker, Requestor, ResumeUpload, Session, SessionBinding, WorkerProfile,
    WorkerRegistration, WorkerSession,
};
use crate::error::{CoreError, CoreResult};
use crate::ports::{PortError, SessionStore, WorkerStore};
use crate::resume::ResumeManager;

/// Owns every operation that creates, consumes, or destroys a session.
///
/// Concurrency duties: credential hashing and verification run on the
/// blocking pool so concurrent logins do not serialize behind CPU-bound
/// argon2 work, and re-uploads for the same worker serialize behind a
/// per-worker mutex so the durable row and the session cache cannot diverge.
pub struct SessionAuthority {
    workers: Arc<dyn WorkerStore>,
    sessions: Arc<dyn SessionStore>,
    resumes: ResumeManager,
    session_ttl: Duration,
    upload_locks: Mutex<HashMap<i64, Arc<Mutex<()>>>>,
}

impl SessionAuthority {
    pub fn new(
        workers: Arc<dyn WorkerStore>,
        sessions: Arc<dyn SessionStore>,
        resumes: ResumeManager,
        session_ttl: Duration,
    ) -> Self {
        Self {
            workers,
            sessions,
            resumes,
            session_ttl,
            upload_locks: Mutex::new(HashMap::new()),
        }
    }

    //=========================================================================================
    // Worker paths
    //=========================================================================================

    /// Registers a new worker. Does NOT start a session; registration and
    /// login are separate steps.
    pub async fn register_worker(
        &self,
        current: Option<&str>,
        registration: WorkerRegistration,
        upload: Option<ResumeUpload>,
    ) -> CoreResult<WorkerProfile> {
        // 1. A requestor-bound session may not register workers.
        if self.resolve(current).await?.is_requestor() {
            return Err(CoreError::Auth(
                "You are signed in as a requestor. Please log out before registering as a worker."
                    .to_string(),
            ));
        }

        // 2. Identity fields are mandatory. A row with a blank email could
        //    never be logged into, yet would still hold the unique slot.
        if registration.name.is_empty()
            || registration.email.is_empty()
            || registration.password.is_empty()
        {
            return Err(CoreError::Validation(
                "Name, email, and password are required".to_string(),
            ));
        }

        // 3. The resume is mandatory and must declare the PDF kind. All
        //    validation completes before any durable step starts.
        let upload = upload
            .ok_or_else(|| CoreError::Validation("Resume file is required".to_string()))?;
        self.resumes.validate(&upload)?;

        // 4. Hash the password off the async executor.
        let credential_hash = Self::hash_password(registration.password.clone()).await?;

        // 5. Persist the artifact first so the row never references a file
        //    that does not exist.
        let reference = self.resumes.store(&upload).await?;

        // 6. Insert the row. The store's unique email index is the only
        //    duplicate check, so concurrent registrations of one email
        //    cannot both win. On failure the stored file is rolled back.
        let new_worker = NewWorker {
            name: registration.name,
            email: registration.email,
            credential_hash,
            resume: reference.clone(),
            program: registration.program,
            skills: registration.skills,
            experience: registration.experience,
        };
        match self.workers.insert(new_worker).await {
            Ok(worker) => {
                info!("Registered worker {} ({})", worker.id, worker.email);
                Ok(worker.profile())
            }
            Err(err) => {
                if let Err(cleanup) = self.resumes.remove(&reference).await {
                    warn!("Failed to roll back resume {}: {:?}", reference, cleanup);
                }
                Err(match err {
                    PortError::Duplicate(_) => {
                        CoreError::Conflict("Email is already registered.".to_string())
                    }
                    other => other.into(),
                })
            }
        }
    }

    /// Verifies a worker's credentials and binds the session to them.
    ///
    /// Unknown email and wrong password fail with the same message.
    pub async fn login_worker(
        &self,
        current: Option<&str>,
        email: &str,
        password: &str,
    ) -> CoreResult<(WorkerSession, Session)> {
        // 1. Opposite-role guard, ahead of any credential work.
        if self.resolve(current).await?.is_requestor() {
            return Err(CoreError::Auth(
                "You are signed in as a requestor. Please log out before logging in as a worker."
                    .to_string(),
            ));
        }

        if email.is_empty() || password.is_empty() {
            return Err(CoreError::Validation(
                "Email and password are required".to_string(),
            ));
        }

        // 2. Look the worker up and verify the password on the blocking pool.
        let Some(worker) = self.workers.find_by_email(email).await? else {
            return Err(CoreError::Auth("Invalid email or password".to_string()));
        };
        let valid =
            Self::verify_password(worker.credential_hash.clone(), password.to_string()).await?;
        if !valid {
            return Err(CoreError::Auth("Invalid email or password".to_string()));
        }

        // 3. Bind. A live same-role session is rebound in place; otherwise a
        //    fresh session id is minted.
        let view = worker.session_view();
        let session = self
            .bind(current, SessionBinding::Worker(view.clone()))
            .await?;
        info!("Worker {} logged in", worker.id);
        Ok((view, session))
    }

    /// The worker bound to `token`, touching the session's deadline.
    pub async fn current_worker(&self, token: Option<&str>) -> CoreResult<WorkerSession> {
        match self.resolve(token).await? {
            SessionBinding::Worker(view) => Ok(view),
            _ => Err(CoreError::Unauthenticated(
                "Unauthorized access: Please log in as a worker.".to_string(),
            )),
        }
    }

    /// Replaces the caller's resume: persist the new file, update the
    /// durable row, then refresh the session's cached reference. Runs under
    /// a per-worker lock so overlapping re-uploads serialize and the row and
    /// cache never diverge. Returns the new reference.
    pub async fn reupload_resume(
        &self,
        token: Option<&str>,
        upload: Option<ResumeUpload>,
    ) -> CoreResult<String> {
        let view = self.current_worker(token).await?;
        let upload = upload
            .ok_or_else(|| CoreError::Validation("Resume file is required".to_string()))?;
        self.resumes.validate(&upload)?;

        let lock = self.upload_lock(view.worker_id).await;
        let _guard = lock.lock().await;

        let reference = self.resumes.store(&upload).await?;
        if let Err(err) = self.workers.update_resume(view.worker_id, &reference).await {
            if let Err(cleanup) = self.resumes.remove(&reference).await {
                warn!("Failed to roll back resume {}: {:?}", reference, cleanup);
            }
            return Err(err.into());
        }

        // The row is durable; now the cached view. A reader that resolves
        // after this returns must see the new reference.
        if let Some(token) = token {
            if let Some(mut session) = self.sessions.get(token).await? {
                if let SessionBinding::Worker(cached) = &mut session.binding {
                    cached.resume = Some(reference.clone());
                }
                session.expires_at = Utc::now() + self.session_ttl;
                self.sessions.update(session).await?;
            }
        }

        info!("Worker {} replaced their resume", view.worker_id);
        Ok(reference)
    }

    //=========================================================================================
    // Requestor paths
    //=========================================================================================

    /// Binds the session to a requestor username.
    ///
    /// Credentials are held only for the lifetime of the session; there is
    /// no durable requestor record and no password verification beyond
    /// presence. Known weak path, kept as observed in deployment.
    pub async fn register_requestor(
        &self,
        current: Option<&str>,
        username: &str,
        password: &str,
    ) -> CoreResult<(Requestor, Session)> {
        if self.resolve(current).await?.is_worker() {
            return Err(CoreError::Auth(
                "You are signed in as a worker. Please log out before registering as a requestor."
                    .to_string(),
            ));
        }
        if username.is_empty() || password.is_empty() {
            return Err(CoreError::Validation(
                "Username and password are required".to_string(),
            ));
        }
        self.bind_requestor(current, username).await
    }

    /// Presence-only credential check, then binds the session. See
    /// [`Self::register_requestor`] on why there is nothing to verify against.
    pub async fn login_requestor(
        &self,
        current: Option<&str>,
        username: &str,
        password: &str,
    ) -> CoreResult<(Requestor, Session)> {
        if self.resolve(current).await?.is_worker() {
            return Err(CoreError::Auth(
                "You are signed in as a worker. Please log out before logging in as a requestor."
                    .to_string(),
            ));
        }
        if username.is_empty() || password.is_empty() {
            return Err(CoreError::Auth("Invalid credentials.".to_string()));
        }
        self.bind_requestor(current, username).await
    }

    /// The requestor bound to `token`, touching the session's deadline.
    pub async fn current_requestor(&self, token: Option<&str>) -> CoreResult<Requestor> {
        match self.resolve(token).await? {
            SessionBinding::Requestor(requestor) => Ok(requestor),
            _ => Err(CoreError::Unauthenticated(
                "Unauthorized access: Please log in as a requestor.".to_string(),
            )),
        }
    }

    //=========================================================================================
    // Shared session mechanics
    //=========================================================================================

    /// Destroys the session behind `token`. Unknown or already-removed
    /// tokens succeed; logging out twice is not an error.
    pub async fn logout(&self, token: Option<&str>) -> CoreResult<()> {
        if let Some(token) = token {
            self.sessions.remove(token).await.map_err(|err| {
                error!("Failed to remove session: {:?}", err);
                CoreError::Internal("Failed to log out".to_string())
            })?;
        }
        Ok(())
    }

    /// Resolves a token to its binding. Missing, unknown, and expired tokens
    /// all resolve to `Anonymous`; a live session has its inactivity
    /// deadline pushed out. Resolution only touches the deadline and never
    /// writes the binding back.
    async fn resolve(&self, token: Option<&str>) -> CoreResult<SessionBinding> {
        let Some(token) = token else {
            return Ok(SessionBinding::Anonymous);
        };
        let Some(session) = self.sessions.get(token).await? else {
            return Ok(SessionBinding::Anonymous);
        };
        self.sessions
            .touch(token, Utc::now() + self.session_ttl)
            .await?;
        Ok(session.binding)
    }

    async fn bind_requestor(
        &self,
        current: Option<&str>,
        username: &str,
    ) -> CoreResult<(Requestor, Session)> {
        let requestor = Requestor {
            username: username.to_string(),
        };
        let session = self
            .bind(current, SessionBinding::Requestor(requestor.clone()))
            .await?;
        info!("Requestor {} bound to a session", requestor.username);
        Ok((requestor, session))
    }

    /// Attaches a binding to the caller's live session, or mints a fresh one.
    /// The guard in every caller has already excluded opposite-role sessions,
    /// so an existing session here can only be same-role and is rebound in
    /// place, keeping its id.
    async fn bind(&self, current: Option<&str>, binding: SessionBinding) -> CoreResult<Session> {
        let now = Utc::now();
        let expires_at = now + self.session_ttl;
        if let Some(token) = current {
            if let Some(mut session) = self.sessions.get(token).await? {
                session.binding = binding;
                session.expires_at = expires_at;
                self.sessions.update(session.clone()).await?;
                return Ok(session);
            }
        }
        let session = Session {
            id: Uuid::new_v4().to_string(),
            binding,
            created_at: now,
            expires_at,
        };
        self.sessions.insert(session.clone()).await?;
        Ok(session)
    }

    /// The per-worker re-upload lock. An entry whose `Arc` is held only by
    /// the map belongs to a finished re-upload and is swept on the next
    /// acquisition; the map only ever holds in-flight work plus the entry
    /// being acquired.
    async fn upload_lock(&self, worker_id: i64) -> Arc<Mutex<()>> {
        let mut locks = self.upload_locks.lock().await;
        locks.retain(|_, lock| Arc::strong_count(lock) > 1);
        locks
            .entry(worker_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    async fn hash_password(password: String) -> CoreResult<String> {
        tokio::task::spawn_blocking(move || {
            let salt = SaltString::generate(&mut OsRng);
            Argon2::default()
                .hash_password(password.as_bytes(), &salt)
                .map(|hash| hash.to_string())
                .map_err(|e| {
                    error!("Failed to hash password: {:?}", e);
                    CoreError::Internal("Error hashing password".to_string())
                })
        })
        .await
        .map_err(|e| {
            error!("Hashing task panicked or was cancelled: {:?}", e);
            CoreError::Internal("Error hashing password".to_string())
        })?
    }

    async fn verify_password(hash: String, password: String) -> CoreResult<bool> {
        tokio::task::spawn_blocking(move || {
            let parsed_hash = PasswordHash::new(&hash).map_err(|e| {
                error!("Failed to parse stored credential hash: {:?}", e);
                CoreError::Internal("Error comparing passwords".to_string())
            })?;
            Ok(Argon2::default()
                .verify_password(password.as_bytes(), &parsed_hash)
                .is_ok())
        })
        .await
        .map_err(|e| {
            error!("Verification task panicked or was cancelled: {:?}", e);
            CoreError::Internal("Error comparing passwords".to_string())
        })?
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use bytes::Bytes;
    use chrono::DateTime;

    use super::*;
    use crate::domain::Worker;
    use crate::ports::{FileStore, PortResult};
    use crate::session::MemorySessionStore;

    #[derive(Default)]
    struct MemWorkerStore {
        rows: Mutex<Vec<Worker>>,
    }

    #[async_trait]
    impl WorkerStore for MemWorkerStore {
        async fn insert(&self, new_worker: NewWorker) -> PortResult<Worker> {
            let mut rows = self.rows.lock().await;
            if rows.iter().any(|w| w.email == new_worker.email) {
                return Err(PortError::Duplicate(format!(
                    "workers.email: {}",
                    new_worker.email
                )));
            }
            let worker = Worker {
                id: rows.len() as i64 + 1,
                name: new_worker.name,
                email: new_worker.email,
                credential_hash: new_worker.credential_hash,
                resume: Some(new_worker.resume),
                program: new_worker.program,
                skills: new_worker.skills,
                experience: new_worker.experience,
                verification_status: false,
                created_at: Utc::now(),
            };
            rows.push(worker.clone());
            Ok(worker)
        }

        async fn find_by_email(&self, email: &str) -> PortResult<Option<Worker>> {
            Ok(self.rows.lock().await.iter().find(|w| w.email == email).cloned())
        }

        async fn find_by_id(&self, id: i64) -> PortResult<Option<Worker>> {
            Ok(self.rows.lock().await.iter().find(|w| w.id == id).cloned())
        }

        async fn update_resume(&self, id: i64, reference: &str) -> PortResult<()> {
            let mut rows = self.rows.lock().await;
            let Some(row) = rows.iter_mut().find(|w| w.id == id) else {
                return Err(PortError::NotFound(format!("worker {}", id)));
            };
            row.resume = Some(reference.to_string());
            Ok(())
        }

        async fn list(&self) -> PortResult<Vec<Worker>> {
            Ok(self.rows.lock().await.clone())
        }
    }

    #[derive(Default)]
    struct MemFileStore {
        saved: Mutex<Vec<String>>,
        removed: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl FileStore for MemFileStore {
        async fn save(&self, file_name: &str, _data: &[u8]) -> PortResult<String> {
            let reference = format!("uploads/resumes/{}", file_name);
            self.saved.lock().await.push(reference.clone());
            Ok(reference)
        }

        async fn remove(&self, reference: &str) -> PortResult<()> {
            self.removed.lock().await.push(reference.to_string());
            Ok(())
        }
    }

    #[derive(Default)]
    struct CountingSessionStore {
        inner: MemorySessionStore,
        updates: Mutex<usize>,
    }

    #[async_trait]
    impl SessionStore for CountingSessionStore {
        async fn insert(&self, session: Session) -> PortResult<()> {
            self.inner.insert(session).await
        }

        async fn get(&self, id: &str) -> PortResult<Option<Session>> {
            self.inner.get(id).await
        }

        async fn update(&self, session: Session) -> PortResult<()> {
            *self.updates.lock().await += 1;
            self.inner.update(session).await
        }

        async fn touch(&self, id: &str, expires_at: DateTime<Utc>) -> PortResult<()> {
            self.inner.touch(id, expires_at).await
        }

        async fn remove(&self, id: &str) -> PortResult<()> {
            self.inner.remove(id).await
        }
    }

    struct Fixture {
        authority: SessionAuthority,
        workers: Arc<MemWorkerStore>,
        files: Arc<MemFileStore>,
    }

    fn fixture() -> Fixture {
        fixture_with_ttl(Duration::minutes(30))
    }

    fn fixture_with_ttl(ttl: Duration) -> Fixture {
        let workers = Arc::new(MemWorkerStore::default());
        let files = Arc::new(MemFileStore::default());
        let resumes = ResumeManager::new(files.clone(), "http://localhost:3000".to_string());
        let authority = SessionAuthority::new(
            workers.clone(),
            Arc::new(MemorySessionStore::new()),
            resumes,
            ttl,
        );
        Fixture {
            authority,
            workers,
            files,
        }
    }

    fn ada() -> WorkerRegistration {
        WorkerRegistration {
            name: "Ada".to_string(),
            email: "ada@x.com".to_string(),
            password: "pw123".to_string(),
            program: "CS".to_string(),
            skills: "Rust".to_string(),
            experience: "2 years".to_string(),
        }
    }

    fn pdf() -> ResumeUpload {
        ResumeUpload {
            file_name: "resume.pdf".to_string(),
            content_type: "application/pdf".to_string(),
            data: Bytes::from_static(b"%PDF-1.4"),
        }
    }

    #[tokio::test]
    async fn register_then_login_round_trip() {
        let fx = fixture();

        let profile = fx
            .authority
            .register_worker(None, ada(), Some(pdf()))
            .await
            .unwrap();
        assert!(!profile.verification_status);
        assert!(profile.resume.is_some());

        let (view, session) = fx
            .authority
            .login_worker(None, "ada@x.com", "pw123")
            .await
            .unwrap();
        assert_eq!(view.email, "ada@x.com");

        let current = fx
            .authority
            .current_worker(Some(&session.id))
            .await
            .unwrap();
        assert_eq!(current.worker_id, profile.id);
    }

    #[tokio::test]
    async fn stored_credential_is_not_the_raw_password() {
        let fx = fixture();
        fx.authority
            .register_worker(None, ada(), Some(pdf()))
            .await
            .unwrap();

        let row = fx.workers.find_by_email("ada@x.com").await.unwrap().unwrap();
        assert_ne!(row.credential_hash, "pw123");
        assert!(row.credential_hash.starts_with("$argon2"));
    }

    #[tokio::test]
    async fn unknown_email_and_wrong_password_are_indistinguishable() {
        let fx = fixture();
        fx.authority
            .register_worker(None, ada(), Some(pdf()))
            .await
            .unwrap();

        let wrong_password = fx
            .authority
            .login_worker(None, "ada@x.com", "nope")
            .await
            .unwrap_err();
        let unknown_email = fx
            .authority
            .login_worker(None, "ghost@x.com", "pw123")
            .await
            .unwrap_err();
        assert!(matches!(wrong_password, CoreError::Auth(_)));
        assert_eq!(wrong_password.to_string(), unknown_email.to_string());
    }

    #[tokio::test]
    async fn duplicate_email_conflicts_and_rolls_back_the_file() {
        let fx = fixture();
        fx.authority
            .register_worker(None, ada(), Some(pdf()))
            .await
            .unwrap();

        let err = fx
            .authority
            .register_worker(None, ada(), Some(pdf()))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Conflict(_)));
        assert_eq!(fx.workers.list().await.unwrap().len(), 1);
        assert_eq!(fx.files.removed.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn non_pdf_registration_never_reaches_storage() {
        let fx = fixture();
        let upload = ResumeUpload {
            content_type: "text/plain".to_string(),
            ..pdf()
        };

        let err = fx
            .authority
            .register_worker(None, ada(), Some(upload))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
        assert!(fx.workers.list().await.unwrap().is_empty());
        assert!(fx.files.saved.lock().await.is_empty());
    }

    #[tokio::test]
    async fn missing_resume_is_rejected() {
        let fx = fixture();
        let err = fx
            .authority
            .register_worker(None, ada(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
        assert_eq!(err.to_string(), "Resume file is required");
    }

    #[tokio::test]
    async fn blank_identity_fields_are_rejected() {
        let fx = fixture();
        let blanked = [
            WorkerRegistration {
                name: String::new(),
                ..ada()
            },
            WorkerRegistration {
                email: String::new(),
                ..ada()
            },
            WorkerRegistration {
                password: String::new(),
                ..ada()
            },
        ];

        for registration in blanked {
            let err = fx
                .authority
                .register_worker(None, registration, Some(pdf()))
                .await
                .unwrap_err();
            assert!(matches!(err, CoreError::Validation(_)));
            assert_eq!(err.to_string(), "Name, email, and password are required");
        }

        // Nothing durable was created, so a real registration is still free
        // to use the email.
        assert!(fx.workers.list().await.unwrap().is_empty());
        assert!(fx.files.saved.lock().await.is_empty());
        fx.authority
            .register_worker(None, ada(), Some(pdf()))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn requestor_session_blocks_worker_paths_until_logout() {
        let fx = fixture();
        fx.authority
            .register_worker(None, ada(), Some(pdf()))
            .await
            .unwrap();
        let (_, session) = fx
            .authority
            .login_requestor(None, "boss", "pw")
            .await
            .unwrap();

        let register = fx
            .authority
            .register_worker(Some(&session.id), ada(), Some(pdf()))
            .await
            .unwrap_err();
        assert!(matches!(register, CoreError::Auth(_)));

        let login = fx
            .authority
            .login_worker(Some(&session.id), "ada@x.com", "pw123")
            .await
            .unwrap_err();
        assert!(matches!(login, CoreError::Auth(_)));

        fx.authority.logout(Some(&session.id)).await.unwrap();
        fx.authority
            .login_worker(Some(&session.id), "ada@x.com", "pw123")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn worker_session_blocks_requestor_paths() {
        let fx = fixture();
        fx.authority
            .register_worker(None, ada(), Some(pdf()))
            .await
            .unwrap();
        let (_, session) = fx
            .authority
            .login_worker(None, "ada@x.com", "pw123")
            .await
            .unwrap();

        let register = fx
            .authority
            .register_requestor(Some(&session.id), "boss", "pw")
            .await
            .unwrap_err();
        assert!(matches!(register, CoreError::Auth(_)));

        let login = fx
            .authority
            .login_requestor(Some(&session.id), "boss", "pw")
            .await
            .unwrap_err();
        assert!(matches!(login, CoreError::Auth(_)));
    }

    #[tokio::test]
    async fn logout_twice_succeeds_and_unauthenticates() {
        let fx = fixture();
        fx.authority
            .register_worker(None, ada(), Some(pdf()))
            .await
            .unwrap();
        let (_, session) = fx
            .authority
            .login_worker(None, "ada@x.com", "pw123")
            .await
            .unwrap();

        fx.authority.logout(Some(&session.id)).await.unwrap();
        fx.authority.logout(Some(&session.id)).await.unwrap();

        let err = fx
            .authority
            .current_worker(Some(&session.id))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Unauthenticated(_)));
    }

    #[tokio::test]
    async fn reupload_refreshes_row_and_session_cache() {
        let fx = fixture();
        let profile = fx
            .authority
            .register_worker(None, ada(), Some(pdf()))
            .await
            .unwrap();
        let old_reference = profile.resume.unwrap();
        let (_, session) = fx
            .authority
            .login_worker(None, "ada@x.com", "pw123")
            .await
            .unwrap();

        let new_reference = fx
            .authority
            .reupload_resume(Some(&session.id), Some(pdf()))
            .await
            .unwrap();
        assert_ne!(new_reference, old_reference);

        let cached = fx
            .authority
            .current_worker(Some(&session.id))
            .await
            .unwrap();
        assert_eq!(cached.resume.as_deref(), Some(new_reference.as_str()));

        let row = fx.workers.find_by_id(profile.id).await.unwrap().unwrap();
        assert_eq!(row.resume.as_deref(), Some(new_reference.as_str()));
    }

    #[tokio::test]
    async fn resolution_never_writes_the_session_back() {
        let workers = Arc::new(MemWorkerStore::default());
        let files = Arc::new(MemFileStore::default());
        let resumes = ResumeManager::new(files.clone(), "http://localhost:3000".to_string());
        let sessions = Arc::new(CountingSessionStore::default());
        let authority = SessionAuthority::new(
            workers,
            sessions.clone(),
            resumes,
            Duration::minutes(30),
        );

        authority
            .register_worker(None, ada(), Some(pdf()))
            .await
            .unwrap();
        let (_, session) = authority
            .login_worker(None, "ada@x.com", "pw123")
            .await
            .unwrap();
        let baseline = *sessions.updates.lock().await;

        // Resolving slides the deadline without a full-session write.
        authority.current_worker(Some(&session.id)).await.unwrap();
        authority.current_worker(Some(&session.id)).await.unwrap();
        assert_eq!(*sessions.updates.lock().await, baseline);

        // The re-upload cache refresh is the only full-session write, and
        // resolution afterwards still sees the new reference.
        let reference = authority
            .reupload_resume(Some(&session.id), Some(pdf()))
            .await
            .unwrap();
        assert_eq!(*sessions.updates.lock().await, baseline + 1);
        let cached = authority.current_worker(Some(&session.id)).await.unwrap();
        assert_eq!(cached.resume.as_deref(), Some(reference.as_str()));
    }

    #[tokio::test]
    async fn reupload_requires_a_worker_session() {
        let fx = fixture();
        let err = fx
            .authority
            .reupload_resume(None, Some(pdf()))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Unauthenticated(_)));

        let (_, session) = fx
            .authority
            .login_requestor(None, "boss", "pw")
            .await
            .unwrap();
        let err = fx
            .authority
            .reupload_resume(Some(&session.id), Some(pdf()))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Unauthenticated(_)));
    }

    #[tokio::test]
    async fn finished_reuploads_leave_no_locks_behind() {
        let fx = fixture();
        fx.authority
            .register_worker(None, ada(), Some(pdf()))
            .await
            .unwrap();
        let grace = WorkerRegistration {
            name: "Grace".to_string(),
            email: "grace@x.com".to_string(),
            ..ada()
        };
        fx.authority
            .register_worker(None, grace, Some(pdf()))
            .await
            .unwrap();

        let (_, session) = fx
            .authority
            .login_worker(None, "ada@x.com", "pw123")
            .await
            .unwrap();
        fx.authority
            .reupload_resume(Some(&session.id), Some(pdf()))
            .await
            .unwrap();
        assert_eq!(fx.authority.upload_locks.lock().await.len(), 1);

        let (_, session) = fx
            .authority
            .login_worker(None, "grace@x.com", "pw123")
            .await
            .unwrap();
        fx.authority
            .reupload_resume(Some(&session.id), Some(pdf()))
            .await
            .unwrap();

        // The first worker's idle entry was swept when the second acquired.
        let locks = fx.authority.upload_locks.lock().await;
        assert_eq!(locks.len(), 1);
        assert!(locks.contains_key(&2));
    }

    #[tokio::test]
    async fn expired_sessions_resolve_to_anonymous() {
        let fx = fixture_with_ttl(Duration::seconds(-1));
        fx.authority
            .register_worker(None, ada(), Some(pdf()))
            .await
            .unwrap();
        let (_, session) = fx
            .authority
            .login_worker(None, "ada@x.com", "pw123")
            .await
            .unwrap();

        let err = fx
            .authority
            .current_worker(Some(&session.id))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Unauthenticated(_)));
    }

    #[tokio::test]
    async fn empty_requestor_credentials_are_rejected() {
        let fx = fixture();

        let register = fx
            .authority
            .register_requestor(None, "", "pw")
            .await
            .unwrap_err();
        assert!(matches!(register, CoreError::Validation(_)));

        let login = fx
            .authority
            .login_requestor(None, "boss", "")
            .await
            .unwrap_err();
        assert!(matches!(login, CoreError::Auth(_)));
    }
}
