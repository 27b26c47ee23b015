//! Responder port - the external text-generation provider.

use async_trait::async_trait;

use crate::domain::foundation::SessionId;

/// Failures from the generation provider.
///
/// Timeouts, auth failures and rate limits are all one kind from the
/// manager's perspective; the variants exist for operator logs.
#[derive(Debug, Clone, thiserror::Error)]
pub enum GenerationError {
    #[error("generation provider unavailable: {0}")]
    Unavailable(String),

    #[error("generation request timed out")]
    Timeout,

    #[error("provider returned no usable text: {0}")]
    InvalidResponse(String),

    #[error("provider not configured: {0}")]
    NotConfigured(String),
}

/// Given free text, returns a generated reply.
#[async_trait]
pub trait Responder: Send + Sync {
    /// Generates a reply. Tried once per turn; the manager's fallback
    /// transition is the only second attempt.
    async fn generate(
        &self,
        text: &str,
        session_id: Option<&SessionId>,
    ) -> Result<String, GenerationError>;

    /// Drops any in-process conversation history.
    ///
    /// With `None`, clears history for all sessions.
    async fn clear_history(&self, session_id: Option<&SessionId>);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn responder_is_object_safe() {
        fn _accepts_dyn(_: &dyn Responder) {}
    }

    #[test]
    fn errors_render_with_context() {
        let err = GenerationError::Unavailable("503 from upstream".to_string());
        assert!(err.to_string().contains("503"));
    }
}
