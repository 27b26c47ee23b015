//! Conversation flow definition - the ordered intake questionnaire.
//!
//! The flow lives in the Flow Definition Store and is edited by lawyers
//! without code changes. The core never mutates it.

use serde::{Deserialize, Serialize};

/// Fallback shown when the stored flow has no completion message.
const DEFAULT_COMPLETION_MESSAGE: &str =
    "Thank you! Your information has been recorded. Do you have any other questions?";

/// One question in the guided flow.
///
/// Step ids are 1-based and unique but may have gaps. Lookups are by exact
/// id match; advancement does not skip-search past a gap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    pub id: u32,

    /// Question text shown to the user.
    pub question: String,

    /// Lead field the answer is recorded under. Defaults to `step_<id>`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,

    #[serde(default = "default_required")]
    pub required: bool,
}

fn default_required() -> bool {
    true
}

impl Step {
    /// Field name the answer is stored under.
    pub fn field_name(&self) -> String {
        self.field
            .clone()
            .unwrap_or_else(|| format!("step_{}", self.id))
    }
}

/// The ordered questionnaire, externally authored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowDefinition {
    pub steps: Vec<Step>,

    #[serde(default = "default_completion_message")]
    pub completion_message: String,
}

fn default_completion_message() -> String {
    DEFAULT_COMPLETION_MESSAGE.to_string()
}

impl FlowDefinition {
    pub fn total_steps(&self) -> usize {
        self.steps.len()
    }

    /// The entry-point step: the one with the lowest id.
    pub fn first_step(&self) -> Option<&Step> {
        self.steps.iter().min_by_key(|s| s.id)
    }

    /// Looks up a step by exact id.
    pub fn step(&self, id: u32) -> Option<&Step> {
        self.steps.iter().find(|s| s.id == id)
    }

    /// Highest step id present in the definition.
    pub fn max_step_id(&self) -> Option<u32> {
        self.steps.iter().map(|s| s.id).max()
    }
}

/// Default law-firm intake flow, seeded into the store on first use so the
/// backend works before anyone edits the flow document.
pub fn default_flow() -> FlowDefinition {
    FlowDefinition {
        steps: vec![
            Step {
                id: 1,
                question: "Hello! Welcome to our law firm. What is your full name?".to_string(),
                field: Some("name".to_string()),
                required: true,
            },
            Step {
                id: 2,
                question: "Which area of law do you need help with?\n\n1. Penal Law\n2. Civil Law\n3. Labor Law\n4. Other\n\nPlease type the number or name:".to_string(),
                field: Some("area_of_law".to_string()),
                required: true,
            },
            Step {
                id: 3,
                question: "Please describe your legal situation briefly. This will help us understand how we can assist you:".to_string(),
                field: Some("situation".to_string()),
                required: true,
            },
            Step {
                id: 4,
                question: "Thank you for the information. Even if budget is a concern, we can work together to find a suitable payment plan. Would you like me to schedule a consultation with one of our lawyers?\n\nPlease answer: Yes or No".to_string(),
                field: Some("wants_meeting".to_string()),
                required: true,
            },
        ],
        completion_message: "Thank you! Your information has been recorded and one of our lawyers will contact you soon. Do you have any other questions I can help you with?".to_string(),
    }
}
