//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid port number")]
    InvalidPort,

    #[error("Invalid Firestore project id")]
    InvalidProjectId,

    #[error("Flow document path must be `collection/document`")]
    InvalidFlowDocumentPath,

    #[error("Gateway webhook URL must use HTTPS in production")]
    WebhookMustBeHttps,

    #[error("Invalid flow cache TTL")]
    InvalidCacheTtl,
}
