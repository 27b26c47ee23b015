//! HTTP routes for WhatsApp endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{
    initialize, instance_status, qr_code, receive_webhook, send_message, verify_webhook,
    WhatsAppState,
};

/// Creates the WhatsApp router with all endpoints.
pub fn whatsapp_routes(state: WhatsAppState) -> Router {
    Router::new()
        .route("/webhook", get(verify_webhook).post(receive_webhook))
        .route("/initialize", post(initialize))
        .route("/qr", get(qr_code))
        .route("/instance-status", get(instance_status))
        .route("/send-message", post(send_message))
        .with_state(state)
}
