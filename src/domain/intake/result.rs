//! Outcomes the Conversation Flow Manager reports to inbound adapters.

use crate::domain::foundation::{LeadId, SessionId, Timestamp};

/// Result of one conversational turn.
///
/// Adapters pattern-match to shape the outward response; every variant
/// carries the session id so a channel can keep addressing the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversationResult {
    /// The flow advanced (or started); ask the user the next question.
    NextQuestion {
        session_id: SessionId,
        question: String,
        step_id: u32,
        is_final_step: bool,
    },
    /// The last answer was accepted; the flow is done and the lead was
    /// persisted under `lead_id`. A failed lead save takes the fallback
    /// transition and reports `AiReply` instead.
    FlowCompleted {
        session_id: SessionId,
        response: String,
        lead_id: LeadId,
    },
    /// Terminal steady state: the Responder answered (or the apology did).
    AiReply {
        session_id: SessionId,
        response: String,
    },
}

impl ConversationResult {
    pub fn session_id(&self) -> SessionId {
        match self {
            Self::NextQuestion { session_id, .. }
            | Self::FlowCompleted { session_id, .. }
            | Self::AiReply { session_id, .. } => *session_id,
        }
    }

    /// The text a plain-text channel (e.g. WhatsApp) should send the user.
    pub fn reply_text(&self) -> &str {
        match self {
            Self::NextQuestion { question, .. } => question,
            Self::FlowCompleted { response, .. } | Self::AiReply { response, .. } => response,
        }
    }

    pub fn ai_mode(&self) -> bool {
        !matches!(self, Self::NextQuestion { .. })
    }
}

/// Read-only progress snapshot for a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusSnapshot {
    pub session_id: SessionId,
    pub current_step: u32,
    pub total_steps: usize,
    pub flow_completed: bool,
    pub ai_mode: bool,
    pub responses_collected: usize,
    pub started_at: Timestamp,
    pub last_updated: Timestamp,
}

/// Outcome of a status query. A missing session is not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversationStatus {
    Missing,
    Active(StatusSnapshot),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reply_text_picks_the_user_visible_string() {
        let id = SessionId::new();
        let next = ConversationResult::NextQuestion {
            session_id: id,
            question: "Name?".to_string(),
            step_id: 1,
            is_final_step: false,
        };
        assert_eq!(next.reply_text(), "Name?");
        assert!(!next.ai_mode());

        let reply = ConversationResult::AiReply {
            session_id: id,
            response: "Hello".to_string(),
        };
        assert_eq!(reply.reply_text(), "Hello");
        assert!(reply.ai_mode());
        assert_eq!(reply.session_id(), id);
    }
}
