//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `WorkerStore` and `TaskStore` ports from the `core` crate. It handles
//! all interactions with the SQLite database using `sqlx`.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, SqlitePool};
use taskhive_core::domain::{NewTask, NewWorker, Task, Worker};
use taskhive_core::ports::{PortError, PortResult, TaskStore, WorkerStore};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the worker and task storage ports.
#[derive(Clone)]
pub struct DbAdapter {
    pool: SqlitePool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::Error> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    /// Round-trips a trivial query; used by the readiness probe.
    pub async fn ping(&self) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .map(|db_err| db_err.is_unique_violation())
        .unwrap_or(false)
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct WorkerRecord {
    id: i64,
    name: String,
    email: String,
    password: String,
    resume: Option<String>,
    program: String,
    skills: String,
    experience: String,
    verification_status: bool,
    created_at: DateTime<Utc>,
}
impl WorkerRecord {
    fn to_domain(self) -> Worker {
        Worker {
            id: self.id,
            name: self.name,
            email: self.email,
            credential_hash: self.password,
            resume: self.resume,
            program: self.program,
            skills: self.skills,
            experience: self.experience,
            verification_status: self.verification_status,
            created_at: self.created_at,
        }
    }
}

#[derive(FromRow)]
struct TaskRecord {
    id: i64,
    title: String,
    description: String,
    deadline: NaiveDate,
    reward: String,
    username: String,
    created_at: DateTime<Utc>,
}
impl TaskRecord {
    fn to_domain(self) -> Task {
        Task {
            id: self.id,
            title: self.title,
            description: self.description,
            deadline: self.deadline,
            reward: self.reward,
            username: self.username,
            created_at: self.created_at,
        }
    }
}

const WORKER_COLUMNS: &str =
    "id, name, email, password, resume, program, skills, experience, verification_status, created_at";
const TASK_COLUMNS: &str = "id, title, description, deadline, reward, username, created_at";

//=========================================================================================
// `WorkerStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl WorkerStore for DbAdapter {
    async fn insert(&self, new_worker: NewWorker) -> PortResult<Worker> {
        let sql = format!(
            "INSERT INTO workers (name, email, password, resume, program, skills, experience, verification_status, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, FALSE, ?) RETURNING {}",
            WORKER_COLUMNS
        );
        let record = sqlx::query_as::<_, WorkerRecord>(&sql)
            .bind(&new_worker.name)
            .bind(&new_worker.email)
            .bind(&new_worker.credential_hash)
            .bind(&new_worker.resume)
            .bind(&new_worker.program)
            .bind(&new_worker.skills)
            .bind(&new_worker.experience)
            .bind(Utc::now())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    PortError::Duplicate(format!("workers.email: {}", new_worker.email))
                } else {
                    PortError::Unexpected(e.to_string())
                }
            })?;
        Ok(record.to_domain())
    }

    async fn find_by_email(&self, email: &str) -> PortResult<Option<Worker>> {
        let sql = format!("SELECT {} FROM workers WHERE email = ?", WORKER_COLUMNS);
        let record = sqlx::query_as::<_, WorkerRecord>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(record.map(WorkerRecord::to_domain))
    }

    async fn find_by_id(&self, id: i64) -> PortResult<Option<Worker>> {
        let sql = format!("SELECT {} FROM workers WHERE id = ?", WORKER_COLUMNS);
        let record = sqlx::query_as::<_, WorkerRecord>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(record.map(WorkerRecord::to_domain))
    }

    async fn update_resume(&self, id: i64, reference: &str) -> PortResult<()> {
        let result = sqlx::query("UPDATE workers SET resume = ? WHERE id = ?")
            .bind(reference)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!("Worker {} not found", id)));
        }
        Ok(())
    }

    async fn list(&self) -> PortResult<Vec<Worker>> {
        let sql = format!("SELECT {} FROM workers ORDER BY id ASC", WORKER_COLUMNS);
        let records = sqlx::query_as::<_, WorkerRecord>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(records.into_iter().map(WorkerRecord::to_domain).collect())
    }
}

//=========================================================================================
// `TaskStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl TaskStore for DbAdapter {
    async fn insert(&self, new_task: NewTask) -> PortResult<Task> {
        let sql = format!(
            "INSERT INTO tasks (title, description, deadline, reward, username, created_at) \
             VALUES (?, ?, ?, ?, ?, ?) RETURNING {}",
            TASK_COLUMNS
        );
        let record = sqlx::query_as::<_, TaskRecord>(&sql)
            .bind(&new_task.title)
            .bind(&new_task.description)
            .bind(new_task.deadline)
            .bind(&new_task.reward)
            .bind(&new_task.username)
            .bind(Utc::now())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(record.to_domain())
    }

    async fn find_by_id(&self, id: i64) -> PortResult<Option<Task>> {
        let sql = format!("SELECT {} FROM tasks WHERE id = ?", TASK_COLUMNS);
        let record = sqlx::query_as::<_, TaskRecord>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(record.map(TaskRecord::to_domain))
    }

    async fn list_all(&self) -> PortResult<Vec<Task>> {
        let sql = format!("SELECT {} FROM tasks ORDER BY id ASC", TASK_COLUMNS);
        let records = sqlx::query_as::<_, TaskRecord>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(records.into_iter().map(TaskRecord::to_domain).collect())
    }

    async fn list_by_requestor(&self, username: &str) -> PortResult<Vec<Task>> {
        let sql = format!(
            "SELECT {} FROM tasks WHERE username = ? ORDER BY id ASC",
            TASK_COLUMNS
        );
        let records = sqlx::query_as::<_, TaskRecord>(&sql)
            .bind(username)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(records.into_iter().map(TaskRecord::to_domain).collect())
    }
}

#[cfg(test)]
mod tests {
    use sqlx::sqlite::SqlitePoolOptions;

    use super::*;

    // Every `sqlite::memory:` connection is its own database, so the pool is
    // pinned to a single connection for the adapter under test.
    async fn adapter() -> DbAdapter {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        let adapter = DbAdapter::new(pool);
        adapter.run_migrations().await.unwrap();
        adapter
    }

    fn ada() -> NewWorker {
        NewWorker {
            name: "Ada".to_string(),
            email: "ada@x.com".to_string(),
            credential_hash: "$argon2id$stub".to_string(),
            resume: "uploads/resumes/1_resume.pdf".to_string(),
            program: "CS".to_string(),
            skills: "Rust".to_string(),
            experience: "2 years".to_string(),
        }
    }

    // `DbAdapter` implements both stores, and `insert`/`find_by_id` exist on
    // each, so the calls below name the trait explicitly.

    #[tokio::test]
    async fn insert_round_trips_and_defaults_verification() {
        let db = adapter().await;
        let worker = WorkerStore::insert(&db, ada()).await.unwrap();

        assert_eq!(worker.id, 1);
        assert!(!worker.verification_status);
        assert_eq!(worker.resume.as_deref(), Some("uploads/resumes/1_resume.pdf"));

        let found = db.find_by_email("ada@x.com").await.unwrap().unwrap();
        assert_eq!(found.id, worker.id);
        assert_eq!(found.credential_hash, "$argon2id$stub");
    }

    #[tokio::test]
    async fn duplicate_email_is_reported_as_duplicate() {
        let db = adapter().await;
        WorkerStore::insert(&db, ada()).await.unwrap();

        let err = WorkerStore::insert(&db, ada()).await.unwrap_err();
        assert!(matches!(err, PortError::Duplicate(_)));
        assert_eq!(db.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn concurrent_same_email_inserts_let_exactly_one_win() {
        let db = adapter().await;
        let (first, second) = tokio::join!(
            WorkerStore::insert(&db, ada()),
            WorkerStore::insert(&db, ada())
        );

        let winners = [first, second].into_iter().filter(Result::is_ok).count();
        assert_eq!(winners, 1);
        assert_eq!(db.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn update_resume_replaces_the_reference() {
        let db = adapter().await;
        let worker = WorkerStore::insert(&db, ada()).await.unwrap();

        db.update_resume(worker.id, "uploads/resumes/2_new.pdf")
            .await
            .unwrap();
        let found = WorkerStore::find_by_id(&db, worker.id).await.unwrap().unwrap();
        assert_eq!(found.resume.as_deref(), Some("uploads/resumes/2_new.pdf"));
    }

    #[tokio::test]
    async fn update_resume_for_unknown_worker_is_not_found() {
        let db = adapter().await;
        let err = db.update_resume(99, "uploads/resumes/x.pdf").await.unwrap_err();
        assert!(matches!(err, PortError::NotFound(_)));
    }

    #[tokio::test]
    async fn tasks_round_trip_and_filter_by_username() {
        let db = adapter().await;
        let task = TaskStore::insert(
            &db,
            NewTask {
                title: "Fix bug".to_string(),
                description: "desc".to_string(),
                deadline: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
                reward: "50".to_string(),
                username: "boss".to_string(),
            },
        )
        .await
        .unwrap();
        assert_eq!(task.id, 1);
        assert_eq!(task.deadline, NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());

        TaskStore::insert(
            &db,
            NewTask {
                title: "Write docs".to_string(),
                description: "desc".to_string(),
                deadline: NaiveDate::from_ymd_opt(2025, 2, 1).unwrap(),
                reward: "25".to_string(),
                username: "other".to_string(),
            },
        )
        .await
        .unwrap();

        assert_eq!(db.list_all().await.unwrap().len(), 2);
        let mine = db.list_by_requestor("boss").await.unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].username, "boss");
        assert!(db.list_by_requestor("ghost").await.unwrap().is_empty());
    }
}
