//! HTTP DTOs for direct AI chat endpoints.

use serde::{Deserialize, Serialize};

// ════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════

/// Request for a direct AI reply, outside any guided flow.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    /// Scopes conversation memory; omitted means the shared anonymous scope.
    pub session_id: Option<String>,
}

/// Request to drop conversation memory.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClearMemoryRequest {
    pub session_id: Option<String>,
}

// ════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════

/// Direct AI reply.
#[derive(Debug, Clone, Serialize)]
pub struct ChatResponse {
    pub response: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

/// Acknowledgement for memory clearing.
#[derive(Debug, Clone, Serialize)]
pub struct ClearMemoryResponse {
    pub cleared: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_request_session_id_optional() {
        let req: ChatRequest = serde_json::from_str(r#"{"message": "hi"}"#).unwrap();
        assert_eq!(req.message, "hi");
        assert!(req.session_id.is_none());
    }

    #[test]
    fn chat_response_omits_missing_session() {
        let value = serde_json::to_value(ChatResponse {
            response: "hello".to_string(),
            session_id: None,
        })
        .unwrap();
        assert!(value.get("session_id").is_none());
    }
}
