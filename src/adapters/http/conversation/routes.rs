//! HTTP routes for guided conversation endpoints.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::application::ConversationFlowManager;

use super::handlers::{conversation_status, current_flow, respond, start_conversation};

/// Creates the conversation router with all endpoints.
pub fn conversation_routes(manager: Arc<ConversationFlowManager>) -> Router {
    Router::new()
        .route("/start", post(start_conversation))
        .route("/respond", post(respond))
        .route("/status/:session_id", get(conversation_status))
        .route("/flow", get(current_flow))
        .with_state(manager)
}
