//! Direct AI chat HTTP adapter.

mod dto;
mod handlers;
mod routes;

pub use dto::{ChatRequest, ChatResponse, ClearMemoryRequest, ClearMemoryResponse};
pub use routes::chat_routes;
