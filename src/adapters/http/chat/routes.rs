//! HTTP routes for direct AI chat endpoints.

use std::sync::Arc;

use axum::{routing::post, Router};

use crate::ports::Responder;

use super::handlers::{chat, clear_memory};

/// Creates the chat router with all endpoints.
pub fn chat_routes(responder: Arc<dyn Responder>) -> Router {
    Router::new()
        .route("/", post(chat))
        .route("/clear-memory", post(clear_memory))
        .with_state(responder)
}
