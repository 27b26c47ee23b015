//! Ports - collaborator contracts the core depends on.
//!
//! Each port is an `async_trait` consumed as `Arc<dyn ...>` by the
//! Conversation Flow Manager and the HTTP adapters. Adapters live under
//! `crate::adapters`.

mod gateway;
mod responder;
mod stores;

pub use gateway::{GatewayError, MessageGateway};
pub use responder::{GenerationError, Responder};
pub use stores::{FlowStore, LeadStore, SessionStore, StoreError};
