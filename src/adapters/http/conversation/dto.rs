//! HTTP DTOs for guided conversation endpoints.
//!
//! These types decouple the HTTP API from domain types, allowing independent evolution.

use serde::{Deserialize, Serialize};

use crate::domain::intake::{ConversationResult, StatusSnapshot};

// ════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════

/// Request to start a conversation. The session id is optional; omitting it
/// creates a fresh session.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StartConversationRequest {
    pub session_id: Option<String>,
}

/// Request to submit an answer. Omitting the session id starts a fresh
/// conversation instead of answering one.
#[derive(Debug, Clone, Deserialize)]
pub struct RespondRequest {
    pub session_id: Option<String>,
    pub message: String,
}

// ════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════

/// Single response shape for every conversation turn. Optional fields only
/// appear when the turn produced them.
#[derive(Debug, Clone, Serialize)]
pub struct ConversationResponse {
    pub session_id: String,
    pub response: String,
    pub ai_mode: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step_id: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_final_step: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flow_completed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lead_saved: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lead_id: Option<String>,
}

impl From<ConversationResult> for ConversationResponse {
    fn from(result: ConversationResult) -> Self {
        match result {
            ConversationResult::NextQuestion {
                session_id,
                question,
                step_id,
                is_final_step,
            } => Self {
                session_id: session_id.to_string(),
                response: question,
                ai_mode: false,
                step_id: Some(step_id),
                is_final_step: Some(is_final_step),
                flow_completed: None,
                lead_saved: None,
                lead_id: None,
            },
            ConversationResult::FlowCompleted {
                session_id,
                response,
                lead_id,
            } => Self {
                session_id: session_id.to_string(),
                response,
                ai_mode: true,
                step_id: None,
                is_final_step: None,
                flow_completed: Some(true),
                lead_saved: Some(true),
                lead_id: Some(lead_id.to_string()),
            },
            ConversationResult::AiReply {
                session_id,
                response,
            } => Self {
                session_id: session_id.to_string(),
                response,
                ai_mode: true,
                step_id: None,
                is_final_step: None,
                flow_completed: None,
                lead_saved: None,
                lead_id: None,
            },
        }
    }
}

/// Session status for API responses.
#[derive(Debug, Clone, Serialize)]
pub struct StatusResponse {
    pub exists: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_step: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_steps: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flow_completed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_mode: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub responses_collected: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
}

impl StatusResponse {
    pub fn missing() -> Self {
        Self {
            exists: false,
            session_id: None,
            current_step: None,
            total_steps: None,
            flow_completed: None,
            ai_mode: None,
            responses_collected: None,
            started_at: None,
            last_updated: None,
        }
    }
}

impl From<StatusSnapshot> for StatusResponse {
    fn from(snapshot: StatusSnapshot) -> Self {
        Self {
            exists: true,
            session_id: Some(snapshot.session_id.to_string()),
            current_step: Some(snapshot.current_step),
            total_steps: Some(snapshot.total_steps),
            flow_completed: Some(snapshot.flow_completed),
            ai_mode: Some(snapshot.ai_mode),
            responses_collected: Some(snapshot.responses_collected),
            started_at: Some(snapshot.started_at.as_datetime().to_rfc3339()),
            last_updated: Some(snapshot.last_updated.as_datetime().to_rfc3339()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{LeadId, SessionId};

    #[test]
    fn respond_request_deserializes() {
        let json = r#"{"session_id": "abc", "message": "Ana"}"#;
        let req: RespondRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.session_id.as_deref(), Some("abc"));
        assert_eq!(req.message, "Ana");
    }

    #[test]
    fn respond_request_session_id_is_optional() {
        let req: RespondRequest = serde_json::from_str(r#"{"message": "hello"}"#).unwrap();
        assert!(req.session_id.is_none());
        assert_eq!(req.message, "hello");
    }

    #[test]
    fn start_request_session_id_is_optional() {
        let req: StartConversationRequest = serde_json::from_str("{}").unwrap();
        assert!(req.session_id.is_none());
    }

    #[test]
    fn next_question_omits_completion_fields() {
        let result = ConversationResult::NextQuestion {
            session_id: SessionId::new(),
            question: "What is your name?".to_string(),
            step_id: 1,
            is_final_step: false,
        };

        let value = serde_json::to_value(ConversationResponse::from(result)).unwrap();
        assert_eq!(value["step_id"], 1);
        assert_eq!(value["ai_mode"], false);
        assert!(value.get("flow_completed").is_none());
        assert!(value.get("lead_saved").is_none());
    }

    #[test]
    fn flow_completed_reports_lead_saved() {
        let result = ConversationResult::FlowCompleted {
            session_id: SessionId::new(),
            response: "Thank you!".to_string(),
            lead_id: LeadId::new("lead-1"),
        };

        let value = serde_json::to_value(ConversationResponse::from(result)).unwrap();
        assert_eq!(value["flow_completed"], true);
        assert_eq!(value["lead_saved"], true);
        assert_eq!(value["lead_id"], "lead-1");
        assert_eq!(value["ai_mode"], true);
    }

    #[test]
    fn missing_status_only_carries_exists() {
        let value = serde_json::to_value(StatusResponse::missing()).unwrap();
        assert_eq!(value["exists"], false);
        assert!(value.get("current_step").is_none());
    }
}
