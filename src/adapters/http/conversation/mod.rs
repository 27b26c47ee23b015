//! Guided conversation HTTP adapter.

mod dto;
mod handlers;
mod routes;

pub use dto::{ConversationResponse, RespondRequest, StartConversationRequest, StatusResponse};
pub use routes::conversation_routes;
