//! Lead record - a completed intake, destined for sales follow-up.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{SessionId, Timestamp};

/// Tag recorded on every lead so downstream tooling can tell intake leads
/// apart from leads entered by hand.
const LEAD_SOURCE: &str = "chatbot_intake";

/// Status a freshly captured lead starts in.
const LEAD_STATUS_NEW: &str = "new";

/// Write-once record of a completed intake.
///
/// Missing answers default to literal placeholder strings, never null, to
/// keep the Lead Store schema stable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lead {
    pub name: String,
    pub area_of_law: String,
    pub situation: String,
    pub wants_meeting: String,
    pub session_id: SessionId,
    pub completed_at: Timestamp,
    pub source: String,
    pub status: String,
}

impl Lead {
    /// Builds a lead from the answers a session collected.
    pub fn from_responses(responses: &HashMap<String, String>, session_id: SessionId) -> Self {
        let field = |name: &str, placeholder: &str| {
            responses
                .get(name)
                .cloned()
                .unwrap_or_else(|| placeholder.to_string())
        };

        Self {
            name: field("name", "Unknown"),
            area_of_law: field("area_of_law", "Not specified"),
            situation: field("situation", "Not provided"),
            wants_meeting: field("wants_meeting", "Not specified"),
            session_id,
            completed_at: Timestamp::now(),
            source: LEAD_SOURCE.to_string(),
            status: LEAD_STATUS_NEW.to_string(),
        }
    }
}
