//! HTTP handlers for WhatsApp endpoints.
//!
//! The webhook always acknowledges with 200 once the payload is accepted;
//! Evolution retries deliveries on non-2xx and a retry storm helps nobody.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;
use tracing::{error, info, warn};

use crate::adapters::gateway::parse_webhook;
use crate::adapters::http::dto::ErrorResponse;
use crate::application::ConversationFlowManager;
use crate::ports::{GatewayError, MessageGateway};

use super::dto::{SendMessageRequest, SendMessageResponse, VerifyQuery, WebhookAck};

// ════════════════════════════════════════════════════════════════════════════
// Handler state
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone)]
pub struct WhatsAppState {
    pub manager: Arc<ConversationFlowManager>,
    pub gateway: Arc<dyn MessageGateway>,
    pub verify_token: Option<String>,
}

// ════════════════════════════════════════════════════════════════════════════
// HTTP handlers
// ════════════════════════════════════════════════════════════════════════════

/// GET /api/v1/whatsapp/webhook - Webhook verification handshake
pub async fn verify_webhook(
    State(state): State<WhatsAppState>,
    Query(query): Query<VerifyQuery>,
) -> Response {
    let token_matches = match (&state.verify_token, &query.verify_token) {
        (Some(expected), Some(got)) => expected == got,
        (None, _) => true,
        _ => false,
    };

    if query.mode.as_deref() == Some("subscribe") && token_matches {
        let challenge = query.challenge.unwrap_or_default();
        (StatusCode::OK, challenge).into_response()
    } else {
        (
            StatusCode::FORBIDDEN,
            Json(ErrorResponse::forbidden("Webhook verification failed")),
        )
            .into_response()
    }
}

/// POST /api/v1/whatsapp/webhook - Inbound Evolution events
pub async fn receive_webhook(
    State(state): State<WhatsAppState>,
    Json(payload): Json<Value>,
) -> Response {
    let Some(inbound) = parse_webhook(&payload) else {
        return (StatusCode::OK, Json(WebhookAck::ignored())).into_response();
    };

    let session_id = inbound.session_id();
    info!(phone = %inbound.phone, %session_id, "inbound WhatsApp message");

    let result = state
        .manager
        .process_response(session_id, &inbound.text)
        .await;

    // Reply delivery is best-effort; the session already advanced and the
    // user can simply message again.
    if let Err(e) = state
        .gateway
        .send_text(&inbound.phone, result.reply_text())
        .await
    {
        error!(phone = %inbound.phone, %e, "failed to deliver WhatsApp reply");
    }

    (StatusCode::OK, Json(WebhookAck::received())).into_response()
}

/// POST /api/v1/whatsapp/initialize - Create/connect the Evolution instance
pub async fn initialize(State(state): State<WhatsAppState>) -> Response {
    match state.gateway.initialize().await {
        Ok(value) => (StatusCode::OK, Json(value)).into_response(),
        Err(e) => handle_gateway_error(e),
    }
}

/// GET /api/v1/whatsapp/qr - Current pairing QR code
pub async fn qr_code(State(state): State<WhatsAppState>) -> Response {
    match state.gateway.qr_code().await {
        Ok(value) => (StatusCode::OK, Json(value)).into_response(),
        Err(e) => handle_gateway_error(e),
    }
}

/// GET /api/v1/whatsapp/instance-status - Connection state
pub async fn instance_status(State(state): State<WhatsAppState>) -> Response {
    match state.gateway.connection_state().await {
        Ok(value) => (StatusCode::OK, Json(value)).into_response(),
        Err(e) => handle_gateway_error(e),
    }
}

/// POST /api/v1/whatsapp/send-message - Manual outbound message
pub async fn send_message(
    State(state): State<WhatsAppState>,
    Json(request): Json<SendMessageRequest>,
) -> Response {
    if request.phone.trim().is_empty() || request.message.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::bad_request(
                "Both phone and message are required",
            )),
        )
            .into_response();
    }

    match state
        .gateway
        .send_text(&request.phone, &request.message)
        .await
    {
        Ok(()) => (StatusCode::OK, Json(SendMessageResponse { sent: true })).into_response(),
        Err(e) => handle_gateway_error(e),
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Error handling
// ════════════════════════════════════════════════════════════════════════════

fn handle_gateway_error(error: GatewayError) -> Response {
    match &error {
        GatewayError::Unreachable(msg) => warn!(%msg, "Evolution API unreachable"),
        GatewayError::Rejected { status, body } => {
            warn!(status, %body, "Evolution API rejected request")
        }
    }
    (
        StatusCode::BAD_GATEWAY,
        Json(ErrorResponse::bad_gateway(format!(
            "WhatsApp gateway error: {error}"
        ))),
    )
        .into_response()
}
