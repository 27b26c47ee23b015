//! Intake session aggregate - per-user conversation state.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{LeadId, SessionId, Timestamp};

/// Durable per-conversation state, keyed by session id.
///
/// # Invariants
///
/// - `ai_mode == true` implies `flow_completed == true`
/// - `current_step` is the step id the manager is waiting on an answer
///   for, until the flow completes
/// - once in AI mode, input is never matched against questionnaire steps
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntakeSession {
    pub session_id: SessionId,

    #[serde(default = "default_step")]
    pub current_step: u32,

    #[serde(default)]
    pub responses: HashMap<String, String>,

    #[serde(default)]
    pub flow_completed: bool,

    #[serde(default)]
    pub ai_mode: bool,

    pub started_at: Timestamp,
    pub last_updated: Timestamp,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<Timestamp>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lead_id: Option<LeadId>,
}

fn default_step() -> u32 {
    1
}

impl IntakeSession {
    /// Creates a fresh session awaiting the given entry step.
    pub fn new(session_id: SessionId, first_step: u32) -> Self {
        let now = Timestamp::now();
        Self {
            session_id,
            current_step: first_step,
            responses: HashMap::new(),
            flow_completed: false,
            ai_mode: false,
            started_at: now,
            last_updated: now,
            completed_at: None,
            lead_id: None,
        }
    }

    /// Records an answer under the given field, trimmed of surrounding
    /// whitespace. Answers are accepted verbatim beyond trimming.
    pub fn record_response(&mut self, field: String, answer: &str) {
        self.responses.insert(field, answer.trim().to_string());
        self.touch();
    }

    /// Advances to the next step the manager is waiting on.
    pub fn advance_to(&mut self, step_id: u32) {
        self.current_step = step_id;
        self.touch();
    }

    /// Marks the flow completed and enters AI mode, optionally recording
    /// the persisted lead id.
    pub fn complete(&mut self, lead_id: Option<LeadId>) {
        self.flow_completed = true;
        self.ai_mode = true;
        self.lead_id = lead_id;
        self.completed_at = Some(Timestamp::now());
        self.touch();
    }

    /// Enters AI mode without a lead (fallback transition).
    ///
    /// Also marks the flow completed, upholding the `ai_mode` invariant.
    pub fn switch_to_ai_mode(&mut self) {
        self.ai_mode = true;
        self.flow_completed = true;
        self.touch();
    }

    fn touch(&mut self) {
        self.last_updated = Timestamp::now();
    }
}
