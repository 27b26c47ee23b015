//! Firestore configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Firestore configuration
#[derive(Debug, Clone, Deserialize)]
pub struct FirestoreConfig {
    /// Google Cloud project id
    pub project_id: String,

    /// Optional API key appended to every request
    pub api_key: Option<String>,

    /// REST endpoint (override for the emulator)
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Document the conversation flow lives in
    #[serde(default = "default_flow_document")]
    pub flow_document: String,

    /// Collection session documents live in
    #[serde(default = "default_sessions_collection")]
    pub sessions_collection: String,

    /// Collection completed leads are appended to
    #[serde(default = "default_leads_collection")]
    pub leads_collection: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Seconds a cached flow definition is served before refetching
    #[serde(default = "default_flow_cache_ttl")]
    pub flow_cache_ttl_secs: u64,
}

impl FirestoreConfig {
    /// Get timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Get flow cache TTL as Duration
    pub fn flow_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.flow_cache_ttl_secs)
    }

    /// Validate Firestore configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.project_id.trim().is_empty() {
            return Err(ValidationError::InvalidProjectId);
        }
        // Documents sit at even path depth, collections at odd.
        if self.flow_document.split('/').count() % 2 != 0 {
            return Err(ValidationError::InvalidFlowDocumentPath);
        }
        if self.flow_cache_ttl_secs == 0 {
            return Err(ValidationError::InvalidCacheTtl);
        }
        Ok(())
    }
}

fn default_base_url() -> String {
    "https://firestore.googleapis.com/v1".to_string()
}

fn default_flow_document() -> String {
    "conversation_flows/law_firm_intake".to_string()
}

fn default_sessions_collection() -> String {
    "user_sessions".to_string()
}

fn default_leads_collection() -> String {
    "leads".to_string()
}

fn default_timeout() -> u64 {
    10
}

fn default_flow_cache_ttl() -> u64 {
    300
}
