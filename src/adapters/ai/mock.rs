//! Mock Responder for testing.
//!
//! Scripted replies are consumed in order; once the script is exhausted the
//! mock echoes the input, so most tests need no setup at all. A failure
//! toggle exercises the fallback paths.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::domain::foundation::SessionId;
use crate::ports::{GenerationError, Responder};

/// Configurable mock implementation of the Responder port.
#[derive(Clone)]
pub struct MockResponder {
    script: Arc<Mutex<VecDeque<Result<String, GenerationError>>>>,
    calls: Arc<Mutex<Vec<(String, Option<SessionId>)>>>,
    failing: Arc<AtomicBool>,
    cleared: Arc<Mutex<Vec<Option<SessionId>>>>,
}

impl MockResponder {
    pub fn new() -> Self {
        Self {
            script: Arc::new(Mutex::new(VecDeque::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
            failing: Arc::new(AtomicBool::new(false)),
            cleared: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Queues a scripted reply.
    pub fn with_reply(self, reply: impl Into<String>) -> Self {
        self.script.lock().unwrap().push_back(Ok(reply.into()));
        self
    }

    /// Queues a scripted failure.
    pub fn with_error(self, error: GenerationError) -> Self {
        self.script.lock().unwrap().push_back(Err(error));
        self
    }

    /// Makes every call fail until switched off.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Inputs the mock has seen, in order.
    pub fn calls(&self) -> Vec<(String, Option<SessionId>)> {
        self.calls.lock().unwrap().clone()
    }

    /// Sessions for which history was cleared.
    pub fn cleared(&self) -> Vec<Option<SessionId>> {
        self.cleared.lock().unwrap().clone()
    }
}

impl Default for MockResponder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Responder for MockResponder {
    async fn generate(
        &self,
        text: &str,
        session_id: Option<&SessionId>,
    ) -> Result<String, GenerationError> {
        self.calls
            .lock()
            .unwrap()
            .push((text.to_string(), session_id.copied()));

        if self.failing.load(Ordering::SeqCst) {
            return Err(GenerationError::Unavailable(
                "mock responder failing by request".to_string(),
            ));
        }

        if let Some(scripted) = self.script.lock().unwrap().pop_front() {
            return scripted;
        }

        Ok(format!("AI Response: {text}"))
    }

    async fn clear_history(&self, session_id: Option<&SessionId>) {
        self.cleared.lock().unwrap().push(session_id.copied());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn scripted_replies_are_consumed_in_order() {
        let mock = MockResponder::new()
            .with_reply("first")
            .with_error(GenerationError::Timeout);

        assert_eq!(mock.generate("a", None).await.unwrap(), "first");
        assert!(matches!(
            mock.generate("b", None).await,
            Err(GenerationError::Timeout)
        ));
        // Script exhausted: echo.
        assert_eq!(mock.generate("c", None).await.unwrap(), "AI Response: c");
        assert_eq!(mock.calls().len(), 3);
    }

    #[tokio::test]
    async fn clear_history_is_recorded() {
        let mock = MockResponder::new();
        let id = SessionId::new();
        mock.clear_history(Some(&id)).await;
        mock.clear_history(None).await;
        assert_eq!(mock.cleared(), vec![Some(id), None]);
    }
}
