//! Application layer - the conversation flow manager.

mod flow_manager;

pub use flow_manager::{ConversationFlowManager, FlowDefinitionError};
