//! crates/taskhive_core/src/session.rs
//!
//! In-memory implementation of the [`SessionStore`] port. A requestor
//! identity lives only in its session, so the process-local map is the
//! production store as well as the test one.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::domain::Session;
use crate::ports::{PortResult, SessionStore};

/// Process-local session map with eviction-on-read expiry.
#[derive(Default)]
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<String, Session>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn insert(&self, session: Session) -> PortResult<()> {
        self.sessions
            .write()
            .await
            .insert(session.id.clone(), session);
        Ok(())
    }

    async fn get(&self, id: &str) -> PortResult<Option<Session>> {
        let expired = {
            let sessions = self.sessions.read().await;
            match sessions.get(id) {
                Some(session) if session.is_expired(Utc::now()) => true,
                Some(session) => return Ok(Some(session.clone())),
                None => return Ok(None),
            }
        };
        if expired {
            self.sessions.write().await.remove(id);
        }
        Ok(None)
    }

    async fn update(&self, session: Session) -> PortResult<()> {
        self.sessions
            .write()
            .await
            .insert(session.id.clone(), session);
        Ok(())
    }

    async fn touch(&self, id: &str, expires_at: DateTime<Utc>) -> PortResult<()> {
        if let Some(session) = self.sessions.write().await.get_mut(id) {
            session.expires_at = expires_at;
        }
        Ok(())
    }

    async fn remove(&self, id: &str) -> PortResult<()> {
        self.sessions.write().await.remove(id);
        Ok(())
    }
}
