//! WhatsApp gateway (Evolution API) configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use super::server::Environment;

/// Evolution API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    /// Evolution API base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Evolution API key (`apikey` header)
    pub api_key: Option<String>,

    /// Instance name
    #[serde(default = "default_instance_name")]
    pub instance_name: String,

    /// Public URL Evolution delivers webhook events to
    pub webhook_url: Option<String>,

    /// Token checked on webhook verification requests
    pub verify_token: Option<String>,

    /// Country code prepended to local numbers
    #[serde(default = "default_country_code")]
    pub default_country_code: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl GatewayConfig {
    /// Get timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Check if the gateway is configured at all. WhatsApp is optional;
    /// web chat works without it.
    pub fn is_enabled(&self) -> bool {
        self.api_key.as_ref().is_some_and(|k| !k.is_empty())
    }

    /// Validate gateway configuration
    pub fn validate(&self, environment: &Environment) -> Result<(), ValidationError> {
        if !self.is_enabled() {
            return Ok(());
        }
        if let Some(url) = &self.webhook_url {
            if *environment == Environment::Production && !url.starts_with("https://") {
                return Err(ValidationError::WebhookMustBeHttps);
            }
        }
        Ok(())
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            instance_name: default_instance_name(),
            webhook_url: None,
            verify_token: None,
            default_country_code: default_country_code(),
            timeout_secs: default_timeout(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_instance_name() -> String {
    "lawfirm_bot".to_string()
}

fn default_country_code() -> String {
    "55".to_string()
}

fn default_timeout() -> u64 {
    30
}
