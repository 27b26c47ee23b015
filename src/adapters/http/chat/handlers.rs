//! HTTP handlers for direct AI chat endpoints.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::adapters::http::dto::ErrorResponse;
use crate::domain::foundation::SessionId;
use crate::ports::{GenerationError, Responder};

use super::dto::{ChatRequest, ChatResponse, ClearMemoryRequest, ClearMemoryResponse};

// ════════════════════════════════════════════════════════════════════════════
// HTTP handlers
// ════════════════════════════════════════════════════════════════════════════

/// POST /api/v1/chat - Direct AI reply, outside any guided flow
pub async fn chat(
    State(responder): State<Arc<dyn Responder>>,
    Json(request): Json<ChatRequest>,
) -> Response {
    if request.message.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::bad_request("Message must not be empty")),
        )
            .into_response();
    }

    let session_id = match parse_optional_session(request.session_id.as_deref()) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match responder.generate(&request.message, session_id.as_ref()).await {
        Ok(text) => (
            StatusCode::OK,
            Json(ChatResponse {
                response: text,
                session_id: session_id.map(|id| id.to_string()),
            }),
        )
            .into_response(),
        Err(e) => handle_generation_error(e),
    }
}

/// POST /api/v1/chat/clear-memory - Drop conversation memory for a scope
pub async fn clear_memory(
    State(responder): State<Arc<dyn Responder>>,
    request: Option<Json<ClearMemoryRequest>>,
) -> Response {
    let request = request.map(|Json(r)| r).unwrap_or_default();

    let session_id = match parse_optional_session(request.session_id.as_deref()) {
        Ok(id) => id,
        Err(response) => return response,
    };

    responder.clear_history(session_id.as_ref()).await;
    (StatusCode::OK, Json(ClearMemoryResponse { cleared: true })).into_response()
}

fn parse_optional_session(raw: Option<&str>) -> Result<Option<SessionId>, Response> {
    match raw {
        None => Ok(None),
        Some(raw) => raw.parse::<SessionId>().map(Some).map_err(|_| {
            (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::bad_request("Invalid session ID")),
            )
                .into_response()
        }),
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Error handling
// ════════════════════════════════════════════════════════════════════════════

fn handle_generation_error(error: GenerationError) -> Response {
    (
        StatusCode::BAD_GATEWAY,
        Json(ErrorResponse::bad_gateway(format!(
            "AI generation failed: {error}"
        ))),
    )
        .into_response()
}
