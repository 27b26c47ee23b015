//! HTTP DTOs for WhatsApp endpoints.

use serde::{Deserialize, Serialize};

// ════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════

/// Webhook verification query, Meta-style hub parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct VerifyQuery {
    #[serde(rename = "hub.mode")]
    pub mode: Option<String>,
    #[serde(rename = "hub.verify_token")]
    pub verify_token: Option<String>,
    #[serde(rename = "hub.challenge")]
    pub challenge: Option<String>,
}

/// Request to send an outbound WhatsApp message manually.
#[derive(Debug, Clone, Deserialize)]
pub struct SendMessageRequest {
    pub phone: String,
    pub message: String,
}

// ════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════

/// Webhook delivery acknowledgement. Evolution retries on non-2xx, so the
/// webhook always acknowledges.
#[derive(Debug, Clone, Serialize)]
pub struct WebhookAck {
    pub status: &'static str,
}

impl WebhookAck {
    pub fn received() -> Self {
        Self { status: "received" }
    }

    pub fn ignored() -> Self {
        Self { status: "ignored" }
    }
}

/// Acknowledgement for a manual outbound send.
#[derive(Debug, Clone, Serialize)]
pub struct SendMessageResponse {
    pub sent: bool,
}
