//! Application entry point: loads configuration, wires adapters into the
//! conversation manager and serves the HTTP API.

use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use intake_relay::adapters::ai::{GeminiConfig, GeminiResponder};
use intake_relay::adapters::firestore::{
    FirestoreClient, FirestoreConfig, FirestoreFlowStore, FirestoreLeadStore,
    FirestoreSessionStore,
};
use intake_relay::adapters::gateway::{EvolutionConfig, EvolutionGateway};
use intake_relay::adapters::http::{app_router, WhatsAppState};
use intake_relay::application::ConversationFlowManager;
use intake_relay::config::AppConfig;
use intake_relay::ports::Responder;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level)),
        )
        .init();

    config.validate()?;

    // Firestore-backed stores share one REST client.
    let mut firestore_config = FirestoreConfig::new(config.firestore.project_id.clone())
        .with_base_url(config.firestore.base_url.clone())
        .with_timeout(config.firestore.timeout());
    if let Some(key) = &config.firestore.api_key {
        firestore_config = firestore_config.with_api_key(key.clone());
    }
    let firestore = FirestoreClient::new(firestore_config)?;

    let flow_store = Arc::new(FirestoreFlowStore::new(
        firestore.clone(),
        config.firestore.flow_document.clone(),
    ));
    let session_store = Arc::new(FirestoreSessionStore::new(
        firestore.clone(),
        config.firestore.sessions_collection.clone(),
    ));
    let lead_store = Arc::new(FirestoreLeadStore::new(
        firestore,
        config.firestore.leads_collection.clone(),
    ));

    let gemini_key = config
        .ai
        .gemini_api_key
        .clone()
        .ok_or("Gemini API key missing after validation")?;
    let mut gemini_config = GeminiConfig::new(gemini_key).with_timeout(config.ai.timeout());
    gemini_config = gemini_config.with_model(config.ai.model.clone());
    gemini_config.temperature = config.ai.temperature;
    gemini_config.max_output_tokens = config.ai.max_output_tokens;
    let responder: Arc<dyn Responder> = Arc::new(GeminiResponder::new(gemini_config)?);

    let manager = Arc::new(
        ConversationFlowManager::new(flow_store, session_store, lead_store, responder.clone())
            .with_cache_ttl(config.firestore.flow_cache_ttl()),
    );

    let whatsapp = if config.gateway.is_enabled() {
        let api_key = config
            .gateway
            .api_key
            .clone()
            .ok_or("gateway enabled without API key")?;
        let mut evolution_config = EvolutionConfig::new(api_key)
            .with_base_url(config.gateway.base_url.clone())
            .with_instance_name(config.gateway.instance_name.clone())
            .with_country_code(config.gateway.default_country_code.clone())
            .with_timeout(config.gateway.timeout());
        if let Some(url) = &config.gateway.webhook_url {
            evolution_config = evolution_config.with_webhook_url(url.clone());
        }
        let gateway = Arc::new(EvolutionGateway::new(evolution_config)?);

        Some(WhatsAppState {
            manager: manager.clone(),
            gateway,
            verify_token: config.gateway.verify_token.clone(),
        })
    } else {
        warn!("WhatsApp gateway not configured; only web endpoints are mounted");
        None
    };

    let app = app_router(
        manager,
        responder,
        whatsapp,
        config.server.cors_origins_list(),
    );

    let addr = config.server.socket_addr()?;
    info!(%addr, environment = ?config.server.environment, "starting intake-relay");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
