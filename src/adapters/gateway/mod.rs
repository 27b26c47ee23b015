//! WhatsApp gateway adapters: the Evolution API client and webhook parsing.

mod evolution;
mod webhook;

pub use evolution::{EvolutionConfig, EvolutionGateway};
pub use webhook::{parse_webhook, InboundMessage};
