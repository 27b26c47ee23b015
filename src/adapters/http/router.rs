//! Top-level application router.

use std::sync::Arc;

use axum::{http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use serde_json::json;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::application::ConversationFlowManager;
use crate::ports::Responder;

use super::chat::chat_routes;
use super::conversation::conversation_routes;
use super::whatsapp::{whatsapp_routes, WhatsAppState};

/// Assembles the full application router.
///
/// WhatsApp routes are only mounted when a gateway is configured; web chat
/// works without one.
pub fn app_router(
    manager: Arc<ConversationFlowManager>,
    responder: Arc<dyn Responder>,
    whatsapp: Option<WhatsAppState>,
    cors_origins: Vec<String>,
) -> Router {
    let mut api = Router::new()
        .nest("/conversation", conversation_routes(manager))
        .nest("/chat", chat_routes(responder));

    if let Some(state) = whatsapp {
        api = api.nest("/whatsapp", whatsapp_routes(state));
    }

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .nest("/api/v1", api)
        .layer(cors_layer(cors_origins))
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(origins: Vec<String>) -> CorsLayer {
    if origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let parsed: Vec<_> = origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(parsed))
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

/// GET / - Service identification
async fn root() -> impl IntoResponse {
    Json(json!({
        "service": "intake-relay",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// GET /health - Liveness probe
async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({ "status": "ok" })))
}
