//! Document-store ports: flow definitions, sessions, leads.
//!
//! The core consumes persistence as a simple key-value get/set contract.
//! Durability expectation is at-least-once with last-write-wins per
//! document; there is no compare-and-swap on session writes.

use async_trait::async_trait;

use crate::domain::foundation::{LeadId, SessionId};
use crate::domain::intake::{FlowDefinition, IntakeSession, Lead};

/// Errors from the persistence layer.
///
/// The manager treats every variant the same way (fallback transition), so
/// adapters collapse transport, auth and decode failures here.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("malformed document: {0}")]
    Malformed(String),
}

/// Source of the externally-editable questionnaire.
#[async_trait]
pub trait FlowStore: Send + Sync {
    /// Fetches the current flow definition. The caller caches the result.
    async fn get_flow(&self) -> Result<FlowDefinition, StoreError>;
}

/// Durable mapping from session id to session state.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Returns `None` when the session does not exist.
    async fn get(&self, id: &SessionId) -> Result<Option<IntakeSession>, StoreError>;

    /// Creates or overwrites the session document.
    async fn put(&self, session: &IntakeSession) -> Result<(), StoreError>;
}

/// Append-only sink for completed intake records.
#[async_trait]
pub trait LeadStore: Send + Sync {
    /// Persists the lead and returns its store-assigned id.
    async fn save(&self, lead: &Lead) -> Result<LeadId, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_ports_are_object_safe() {
        fn _flow(_: &dyn FlowStore) {}
        fn _session(_: &dyn SessionStore) {}
        fn _lead(_: &dyn LeadStore) {}
    }
}
