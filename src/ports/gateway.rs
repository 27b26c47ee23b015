//! Message gateway port - outbound WhatsApp messaging and instance admin.
//!
//! Instance management responses are vendor-shaped blobs the backend only
//! passes through to operators, so they stay as raw JSON values.

use async_trait::async_trait;
use serde_json::Value;

/// Failures talking to the messaging gateway.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("gateway unreachable: {0}")]
    Unreachable(String),

    #[error("gateway rejected request ({status}): {body}")]
    Rejected { status: u16, body: String },
}

/// Client for a WhatsApp-bridging API (Evolution-style).
#[async_trait]
pub trait MessageGateway: Send + Sync {
    /// Sends a text message to a phone number.
    async fn send_text(&self, phone: &str, text: &str) -> Result<(), GatewayError>;

    /// Creates the instance if needed and returns connection/QR info.
    async fn initialize(&self) -> Result<Value, GatewayError>;

    /// Fetches the QR code for authentication.
    async fn qr_code(&self) -> Result<Value, GatewayError>;

    /// Reports the instance connection state.
    async fn connection_state(&self) -> Result<Value, GatewayError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gateway_is_object_safe() {
        fn _accepts_dyn(_: &dyn MessageGateway) {}
    }
}
