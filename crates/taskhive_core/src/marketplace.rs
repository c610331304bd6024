//! crates/taskhive_core/src/marketplace.rs
//!
//! The task marketplace: requestors post tasks into the ledger, workers
//! browse them and apply. Applications are never persisted; they are
//! forwarded to the task's owner through the notification sink.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::info;

use crate::authority::SessionAuthority;
use crate::domain::{NewTask, Task, TaskApplication, TaskDraft};
use crate::error::{CoreError, CoreResult};
use crate::ports::{NotificationSink, TaskStore};

pub struct Marketplace {
    authority: Arc<SessionAuthority>,
    tasks: Arc<dyn TaskStore>,
    notifier: Arc<dyn NotificationSink>,
}

impl Marketplace {
    pub fn new(
        authority: Arc<SessionAuthority>,
        tasks: Arc<dyn TaskStore>,
        notifier: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            authority,
            tasks,
            notifier,
        }
    }

    /// Appends a task to the ledger, tagged with the posting requestor.
    ///
    /// All four content fields are mandatory and the deadline must be a
    /// calendar date; tasks are immutable once created.
    pub async fn post_task(&self, token: Option<&str>, draft: TaskDraft) -> CoreResult<Task> {
        let requestor = self.authority.current_requestor(token).await?;

        if draft.title.is_empty()
            || draft.description.is_empty()
            || draft.deadline.is_empty()
            || draft.reward.is_empty()
        {
            return Err(CoreError::Validation(
                "Please provide title, description, deadline (YYYY-MM-DD), and reward.".to_string(),
            ));
        }
        let deadline = NaiveDate::parse_from_str(&draft.deadline, "%Y-%m-%d").map_err(|_| {
            CoreError::Validation(
                "Please provide title, description, deadline (YYYY-MM-DD), and reward.".to_string(),
            )
        })?;

        let task = self
            .tasks
            .insert(NewTask {
                title: draft.title,
                description: draft.description,
                deadline,
                reward: draft.reward,
                username: requestor.username,
            })
            .await?;
        info!("Requestor {} posted task {}", task.username, task.id);
        Ok(task)
    }

    /// The full ledger, insertion order.
    pub async fn list_all(&self) -> CoreResult<Vec<Task>> {
        Ok(self.tasks.list_all().await?)
    }

    /// Tasks owned by `username`. An unknown username yields an empty list,
    /// not an error.
    pub async fn list_by_requestor(&self, username: &str) -> CoreResult<Vec<Task>> {
        Ok(self.tasks.list_by_requestor(username).await?)
    }

    /// Forwards a worker's application to the owner of the addressed task.
    ///
    /// The task id is looked up first; the owner recorded in the ledger is
    /// the notification recipient, never anything the applicant supplied.
    pub async fn apply_to_task(&self, application: TaskApplication) -> CoreResult<()> {
        let Some(task) = self.tasks.find_by_id(application.task_id).await? else {
            return Err(CoreError::NotFound("Task not found.".to_string()));
        };

        info!(
            "Worker {} applied for task {}",
            application.applicant.label(),
            task.id
        );
        self.notifier
            .notify_application(&task.username, &application)
            .await?;
        Ok(())
    }
}
