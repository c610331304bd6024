//! services/api/src/adapters/notify.rs
//!
//! Log-backed implementation of the `NotificationSink` port. Requestors have
//! no durable contact details yet, so "notifying" one means writing a
//! structured line to the service log addressed to their username. A mail
//! adapter would implement the same port.

use async_trait::async_trait;
use taskhive_core::domain::TaskApplication;
use taskhive_core::ports::{NotificationSink, PortResult};
use tracing::info;

#[derive(Clone, Default)]
pub struct LogNotifier;

impl LogNotifier {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl NotificationSink for LogNotifier {
    async fn notify_application(
        &self,
        recipient: &str,
        application: &TaskApplication,
    ) -> PortResult<()> {
        info!(
            "Notified requestor {}: worker {} applied for task {}",
            recipient,
            application.applicant.label(),
            application.task_id
        );
        Ok(())
    }
}
