//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use std::sync::Arc;

use taskhive_core::authority::SessionAuthority;
use taskhive_core::marketplace::Marketplace;
use taskhive_core::ports::WorkerStore;
use taskhive_core::resume::ResumeManager;

use crate::adapters::db::DbAdapter;
use crate::config::Config;

/// The shared application state, created once at startup and passed to all handlers.
///
/// `workers` and `db` point at the same adapter; the trait-typed handle is
/// what the handlers read through, while the concrete one exists for the
/// readiness probe's ping.
#[derive(Clone)]
pub struct AppState {
    pub authority: Arc<SessionAuthority>,
    pub marketplace: Arc<Marketplace>,
    pub workers: Arc<dyn WorkerStore>,
    pub resumes: ResumeManager,
    pub db: Arc<DbAdapter>,
    pub config: Arc<Config>,
}
