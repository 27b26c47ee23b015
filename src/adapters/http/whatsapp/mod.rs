//! WhatsApp HTTP adapter: webhook intake plus instance management.

mod dto;
mod handlers;
mod routes;

pub use dto::{SendMessageRequest, SendMessageResponse, VerifyQuery, WebhookAck};
pub use handlers::WhatsAppState;
pub use routes::whatsapp_routes;
