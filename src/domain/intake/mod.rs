//! Intake domain - the guided questionnaire and its artifacts.
//!
//! A [`FlowDefinition`] describes the lawyer-editable questionnaire, an
//! [`IntakeSession`] tracks one user's progress through it, and a completed
//! flow produces a [`Lead`]. The manager reports outcomes through the
//! [`ConversationResult`] tagged union.

mod flow;
mod lead;
mod result;
mod session;

pub use flow::{default_flow, FlowDefinition, Step};
pub use lead::Lead;
pub use result::{ConversationResult, ConversationStatus, StatusSnapshot};
pub use session::IntakeSession;
