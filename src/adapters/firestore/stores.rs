//! Store port implementations over the Firestore client.

use async_trait::async_trait;
use serde_json::Value;
use tracing::info;

use crate::domain::foundation::{LeadId, SessionId};
use crate::domain::intake::{default_flow, FlowDefinition, IntakeSession, Lead};
use crate::ports::{FlowStore, LeadStore, SessionStore, StoreError};

use super::client::FirestoreClient;

fn decode<T: serde::de::DeserializeOwned>(value: Value) -> Result<T, StoreError> {
    serde_json::from_value(value).map_err(|e| StoreError::Malformed(e.to_string()))
}

fn encode<T: serde::Serialize>(value: &T) -> Result<Value, StoreError> {
    serde_json::to_value(value).map_err(|e| StoreError::Malformed(e.to_string()))
}

/// Flow definitions live in a single well-known document that lawyers edit
/// in the Firebase Console. Seeds the default flow on first read so the
/// backend works out of the box.
pub struct FirestoreFlowStore {
    client: FirestoreClient,
    document_path: String,
}

impl FirestoreFlowStore {
    pub fn new(client: FirestoreClient, document_path: impl Into<String>) -> Self {
        Self {
            client,
            document_path: document_path.into(),
        }
    }
}

#[async_trait]
impl FlowStore for FirestoreFlowStore {
    async fn get_flow(&self) -> Result<FlowDefinition, StoreError> {
        match self.client.get_document(&self.document_path).await? {
            Some(doc) => decode(doc),
            None => {
                let flow = default_flow();
                info!(path = %self.document_path, "seeding default conversation flow");
                self.client
                    .set_document(&self.document_path, &encode(&flow)?)
                    .await?;
                Ok(flow)
            }
        }
    }
}

/// Sessions are one document per session id.
pub struct FirestoreSessionStore {
    client: FirestoreClient,
    collection: String,
}

impl FirestoreSessionStore {
    pub fn new(client: FirestoreClient, collection: impl Into<String>) -> Self {
        Self {
            client,
            collection: collection.into(),
        }
    }

    fn path(&self, id: &SessionId) -> String {
        format!("{}/{}", self.collection, id)
    }
}

#[async_trait]
impl SessionStore for FirestoreSessionStore {
    async fn get(&self, id: &SessionId) -> Result<Option<IntakeSession>, StoreError> {
        match self.client.get_document(&self.path(id)).await? {
            Some(doc) => Ok(Some(decode(doc)?)),
            None => Ok(None),
        }
    }

    async fn put(&self, session: &IntakeSession) -> Result<(), StoreError> {
        self.client
            .set_document(&self.path(&session.session_id), &encode(session)?)
            .await
    }
}

/// Leads are appended to a collection; Firestore assigns the document id.
pub struct FirestoreLeadStore {
    client: FirestoreClient,
    collection: String,
}

impl FirestoreLeadStore {
    pub fn new(client: FirestoreClient, collection: impl Into<String>) -> Self {
        Self {
            client,
            collection: collection.into(),
        }
    }
}

#[async_trait]
impl LeadStore for FirestoreLeadStore {
    async fn save(&self, lead: &Lead) -> Result<LeadId, StoreError> {
        let id = self
            .client
            .create_document(&self.collection, &encode(lead)?)
            .await?;
        Ok(LeadId::new(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn session_document_roundtrips_through_json() {
        let mut session = IntakeSession::new(SessionId::new(), 2);
        session.record_response("name".to_string(), "Ana");

        let value = encode(&session).unwrap();
        let back: IntakeSession = decode(value).unwrap();
        assert_eq!(back, session);
    }

    #[test]
    fn lead_document_has_stable_schema() {
        let lead = Lead::from_responses(&HashMap::new(), SessionId::new());
        let value = encode(&lead).unwrap();
        let object = value.as_object().unwrap();
        for field in [
            "name",
            "area_of_law",
            "situation",
            "wants_meeting",
            "session_id",
            "completed_at",
            "source",
            "status",
        ] {
            assert!(object.contains_key(field), "missing field {field}");
            assert!(!object[field].is_null(), "field {field} must not be null");
        }
    }
}
