//! Evolution API client - WhatsApp bridging.
//!
//! Handles instance management (create, connection state, QR code) and
//! outbound text messages. Instance responses are vendor blobs passed
//! through to operators unchanged.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::ports::{GatewayError, MessageGateway};

/// Configuration for the Evolution API gateway.
#[derive(Debug, Clone)]
pub struct EvolutionConfig {
    pub base_url: String,
    api_key: Secret<String>,
    pub instance_name: String,
    /// URL Evolution delivers webhook events to (this backend's
    /// `/api/v1/whatsapp/webhook`).
    pub webhook_url: String,
    /// Country code prepended to numbers that lack one.
    pub default_country_code: String,
    pub timeout: Duration,
}

impl EvolutionConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            api_key: Secret::new(api_key.into()),
            instance_name: "lawfirm_bot".to_string(),
            webhook_url: String::new(),
            default_country_code: "55".to_string(),
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_instance_name(mut self, name: impl Into<String>) -> Self {
        self.instance_name = name.into();
        self
    }

    pub fn with_webhook_url(mut self, url: impl Into<String>) -> Self {
        self.webhook_url = url.into();
        self
    }

    pub fn with_country_code(mut self, code: impl Into<String>) -> Self {
        self.default_country_code = code.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }
}

/// Evolution API implementation of the MessageGateway port.
pub struct EvolutionGateway {
    config: EvolutionConfig,
    client: Client,
}

impl EvolutionGateway {
    pub fn new(config: EvolutionConfig) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| GatewayError::Unreachable(e.to_string()))?;
        Ok(Self { config, client })
    }

    /// Keeps digits only and prepends the default country code when the
    /// number does not already start with it.
    fn normalize_phone(&self, phone: &str) -> String {
        let digits: String = phone.chars().filter(char::is_ascii_digit).collect();
        if digits.starts_with(&self.config.default_country_code) {
            digits
        } else {
            format!("{}{digits}", self.config.default_country_code)
        }
    }

    async fn get_json(&self, path: &str) -> Result<Value, GatewayError> {
        let response = self
            .client
            .get(format!("{}/{path}", self.config.base_url))
            .header("apikey", self.config.api_key())
            .send()
            .await
            .map_err(|e| GatewayError::Unreachable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Rejected {
                status: status.as_u16(),
                body,
            });
        }
        response
            .json()
            .await
            .map_err(|e| GatewayError::Unreachable(e.to_string()))
    }

    async fn post_json(&self, path: &str, payload: &Value) -> Result<Value, GatewayError> {
        let response = self
            .client
            .post(format!("{}/{path}", self.config.base_url))
            .header("apikey", self.config.api_key())
            .json(payload)
            .send()
            .await
            .map_err(|e| GatewayError::Unreachable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Rejected {
                status: status.as_u16(),
                body,
            });
        }
        response
            .json()
            .await
            .map_err(|e| GatewayError::Unreachable(e.to_string()))
    }

    async fn create_instance(&self) -> Result<Value, GatewayError> {
        info!(instance = %self.config.instance_name, "creating Evolution instance");
        let payload = json!({
            "instanceName": self.config.instance_name,
            "qrcode": true,
            "webhook": self.config.webhook_url,
            "webhook_by_events": false,
            "events": [
                "APPLICATION_STARTUP",
                "QRCODE_UPDATED",
                "CONNECTION_UPDATE",
                "MESSAGES_UPSERT",
                "SEND_MESSAGE"
            ]
        });
        self.post_json("instance/create", &payload).await
    }
}

#[async_trait]
impl MessageGateway for EvolutionGateway {
    async fn send_text(&self, phone: &str, text: &str) -> Result<(), GatewayError> {
        let number = self.normalize_phone(phone);
        let payload = json!({
            "number": number,
            "options": { "delay": 1200, "presence": "composing" },
            "textMessage": { "text": text }
        });

        let path = format!("message/sendText/{}", self.config.instance_name);
        self.post_json(&path, &payload).await?;
        info!(%number, "WhatsApp message sent");
        Ok(())
    }

    async fn initialize(&self) -> Result<Value, GatewayError> {
        // Create the instance when it is missing or closed; otherwise the
        // operator just needs the current QR / connection info.
        let state = self.connection_state().await.ok();
        let connected = state
            .as_ref()
            .and_then(|v| v.pointer("/instance/state").or_else(|| v.get("state")))
            .and_then(Value::as_str)
            == Some("open");

        if connected {
            return Ok(json!({
                "action": "already_connected",
                "status": "connected"
            }));
        }

        let instance = match self.create_instance().await {
            Ok(instance) => Some(instance),
            Err(err) => {
                // Creation fails when the instance already exists; the QR
                // fetch below still works in that case.
                warn!(%err, "instance creation failed, fetching QR anyway");
                None
            }
        };

        let action = if instance.is_some() {
            "created"
        } else {
            "reconnecting"
        };
        let qr = self.qr_code().await?;
        Ok(json!({
            "action": action,
            "status": "needs_authentication",
            "instance": instance,
            "qr_code": qr
        }))
    }

    async fn qr_code(&self) -> Result<Value, GatewayError> {
        let path = format!("instance/connect/{}", self.config.instance_name);
        self.get_json(&path).await
    }

    async fn connection_state(&self) -> Result<Value, GatewayError> {
        let path = format!("instance/connectionState/{}", self.config.instance_name);
        self.get_json(&path).await
    }
}
