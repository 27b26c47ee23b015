//! HTTP handlers for guided conversation endpoints.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::adapters::http::dto::ErrorResponse;
use crate::application::{ConversationFlowManager, FlowDefinitionError};
use crate::domain::foundation::SessionId;
use crate::domain::intake::ConversationStatus;

use super::dto::{
    ConversationResponse, RespondRequest, StartConversationRequest, StatusResponse,
};

// ════════════════════════════════════════════════════════════════════════════
// HTTP handlers
// ════════════════════════════════════════════════════════════════════════════

/// POST /api/v1/conversation/start - Begin (or restart) a guided conversation
pub async fn start_conversation(
    State(manager): State<Arc<ConversationFlowManager>>,
    request: Option<Json<StartConversationRequest>>,
) -> Response {
    let request = request.map(|Json(r)| r).unwrap_or_default();

    let session_id = match request.session_id.as_deref() {
        Some(raw) => match raw.parse::<SessionId>() {
            Ok(id) => Some(id),
            Err(_) => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(ErrorResponse::bad_request("Invalid session ID")),
                )
                    .into_response()
            }
        },
        None => None,
    };

    match manager.start_conversation(session_id).await {
        Ok(result) => {
            (StatusCode::OK, Json(ConversationResponse::from(result))).into_response()
        }
        Err(e) => handle_flow_error(e),
    }
}

/// POST /api/v1/conversation/respond - Submit an answer for a session
///
/// A body without a session id starts a fresh conversation instead.
pub async fn respond(
    State(manager): State<Arc<ConversationFlowManager>>,
    Json(request): Json<RespondRequest>,
) -> Response {
    if request.message.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::bad_request("Message must not be empty")),
        )
            .into_response();
    }

    let session_id = match request.session_id.as_deref() {
        Some(raw) => match raw.parse::<SessionId>() {
            Ok(id) => id,
            Err(_) => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(ErrorResponse::bad_request("Invalid session ID")),
                )
                    .into_response()
            }
        },
        None => {
            return match manager.start_conversation(None).await {
                Ok(result) => {
                    (StatusCode::OK, Json(ConversationResponse::from(result))).into_response()
                }
                Err(e) => handle_flow_error(e),
            }
        }
    };

    let result = manager.process_response(session_id, &request.message).await;
    (StatusCode::OK, Json(ConversationResponse::from(result))).into_response()
}

/// GET /api/v1/conversation/status/:session_id - Inspect a session
pub async fn conversation_status(
    State(manager): State<Arc<ConversationFlowManager>>,
    Path(session_id): Path<String>,
) -> Response {
    let session_id = match session_id.parse::<SessionId>() {
        Ok(id) => id,
        Err(_) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::bad_request("Invalid session ID")),
            )
                .into_response()
        }
    };

    let response = match manager.conversation_status(session_id).await {
        ConversationStatus::Missing => StatusResponse::missing(),
        ConversationStatus::Active(snapshot) => snapshot.into(),
    };
    (StatusCode::OK, Json(response)).into_response()
}

/// GET /api/v1/conversation/flow - The active flow definition
pub async fn current_flow(State(manager): State<Arc<ConversationFlowManager>>) -> Response {
    match manager.current_flow().await {
        Ok(flow) => (StatusCode::OK, Json(flow)).into_response(),
        Err(e) => handle_flow_error(e),
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Error handling
// ════════════════════════════════════════════════════════════════════════════

fn handle_flow_error(error: FlowDefinitionError) -> Response {
    match error {
        FlowDefinitionError::Empty => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ErrorResponse::unavailable(
                "Conversation flow has no steps configured",
            )),
        )
            .into_response(),
        FlowDefinitionError::Unavailable(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ErrorResponse::unavailable(format!(
                "Conversation flow unavailable: {e}"
            ))),
        )
            .into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::StoreError;

    #[test]
    fn empty_flow_maps_to_503() {
        let response = handle_flow_error(FlowDefinitionError::Empty);
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn unavailable_flow_maps_to_503() {
        let error =
            FlowDefinitionError::Unavailable(StoreError::Unavailable("down".to_string()));
        let response = handle_flow_error(error);
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
