//! HTTP adapters - REST API implementations.
//!
//! Each surface (guided conversation, direct chat, WhatsApp) has its own
//! module; `router` assembles them under `/api/v1`.

pub mod chat;
pub mod conversation;
pub mod dto;
pub mod router;
pub mod whatsapp;

pub use router::app_router;
pub use whatsapp::WhatsAppState;
