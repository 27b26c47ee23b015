//! In-memory store adapters.
//!
//! Used by tests and local development. Each store exposes failure toggles
//! so resilience paths can be exercised without a real backend.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::foundation::{LeadId, SessionId};
use crate::domain::intake::{FlowDefinition, IntakeSession, Lead};
use crate::ports::{FlowStore, LeadStore, SessionStore, StoreError};

fn unavailable() -> StoreError {
    StoreError::Unavailable("in-memory store failing by request".to_string())
}

/// In-memory flow definition store.
#[derive(Clone)]
pub struct InMemoryFlowStore {
    flow: Arc<RwLock<FlowDefinition>>,
    failing: Arc<AtomicBool>,
}

impl InMemoryFlowStore {
    pub fn new(flow: FlowDefinition) -> Self {
        Self {
            flow: Arc::new(RwLock::new(flow)),
            failing: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Replaces the stored flow, simulating an administrator edit.
    pub async fn set_flow(&self, flow: FlowDefinition) {
        *self.flow.write().await = flow;
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl FlowStore for InMemoryFlowStore {
    async fn get_flow(&self) -> Result<FlowDefinition, StoreError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        Ok(self.flow.read().await.clone())
    }
}

/// In-memory session store with separate read/write failure toggles.
#[derive(Clone)]
pub struct InMemorySessionStore {
    sessions: Arc<RwLock<HashMap<SessionId, IntakeSession>>>,
    failing_gets: Arc<AtomicBool>,
    failing_puts: Arc<AtomicBool>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            failing_gets: Arc::new(AtomicBool::new(false)),
            failing_puts: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn fail_gets(&self, failing: bool) {
        self.failing_gets.store(failing, Ordering::SeqCst);
    }

    pub fn fail_puts(&self, failing: bool) {
        self.failing_puts.store(failing, Ordering::SeqCst);
    }

    /// Direct read bypassing the failure toggles (test assertions).
    pub async fn get_session(&self, id: &SessionId) -> Option<IntakeSession> {
        self.sessions.read().await.get(id).cloned()
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get(&self, id: &SessionId) -> Result<Option<IntakeSession>, StoreError> {
        if self.failing_gets.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        Ok(self.sessions.read().await.get(id).cloned())
    }

    async fn put(&self, session: &IntakeSession) -> Result<(), StoreError> {
        if self.failing_puts.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        self.sessions
            .write()
            .await
            .insert(session.session_id, session.clone());
        Ok(())
    }
}

/// In-memory lead sink.
#[derive(Clone)]
pub struct InMemoryLeadStore {
    leads: Arc<RwLock<Vec<Lead>>>,
    failing: Arc<AtomicBool>,
}

impl InMemoryLeadStore {
    pub fn new() -> Self {
        Self {
            leads: Arc::new(RwLock::new(Vec::new())),
            failing: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub async fn leads(&self) -> Vec<Lead> {
        self.leads.read().await.clone()
    }
}

impl Default for InMemoryLeadStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LeadStore for InMemoryLeadStore {
    async fn save(&self, lead: &Lead) -> Result<LeadId, StoreError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        let mut leads = self.leads.write().await;
        leads.push(lead.clone());
        Ok(LeadId::new(format!("lead-{}", leads.len())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::intake::default_flow;

    #[tokio::test]
    async fn session_store_roundtrip() {
        let store = InMemorySessionStore::new();
        let session = IntakeSession::new(SessionId::new(), 1);

        store.put(&session).await.unwrap();
        let loaded = store.get(&session.session_id).await.unwrap();
        assert_eq!(loaded, Some(session));
    }

    #[tokio::test]
    async fn failure_toggles_surface_store_errors() {
        let store = InMemorySessionStore::new();
        store.fail_gets(true);
        assert!(store.get(&SessionId::new()).await.is_err());

        store.fail_gets(false);
        store.fail_puts(true);
        let session = IntakeSession::new(SessionId::new(), 1);
        assert!(store.put(&session).await.is_err());
    }

    #[tokio::test]
    async fn lead_store_assigns_sequential_ids() {
        let store = InMemoryLeadStore::new();
        let lead = Lead::from_responses(&HashMap::new(), SessionId::new());
        let first = store.save(&lead).await.unwrap();
        let second = store.save(&lead).await.unwrap();
        assert_ne!(first, second);
        assert_eq!(store.leads().await.len(), 2);
    }

    #[tokio::test]
    async fn flow_store_serves_edits() {
        let store = InMemoryFlowStore::new(default_flow());
        assert_eq!(store.get_flow().await.unwrap().total_steps(), 4);

        let mut edited = default_flow();
        edited.steps.truncate(2);
        store.set_flow(edited).await;
        assert_eq!(store.get_flow().await.unwrap().total_steps(), 2);
    }
}
