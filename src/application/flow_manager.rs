//! Conversation Flow Manager - the guided-intake state machine.
//!
//! Decides, for each incoming user message, whether to advance the guided
//! questionnaire, complete it and persist a lead, or forward the message to
//! the Responder. Constructed once at process start with injected
//! collaborator handles; request handlers share it through an `Arc`.
//!
//! # Error policy
//!
//! `start_conversation` is the only operation that surfaces an error (an
//! empty or unreachable flow definition). `process_response` never errors:
//! every internal fault is absorbed by the fallback transition so a broken
//! backend integration never manifests as a dead chat.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;
use tracing::{error, info, warn};

use crate::domain::foundation::SessionId;
use crate::domain::intake::{
    ConversationResult, ConversationStatus, FlowDefinition, IntakeSession, Lead, StatusSnapshot,
};
use crate::ports::{FlowStore, GenerationError, LeadStore, Responder, SessionStore, StoreError};

/// How long a fetched flow definition is served from cache. An
/// administrator edit may take this long to take effect.
const FLOW_CACHE_TTL: Duration = Duration::from_secs(300);

/// Reply of last resort when the Responder itself fails.
const APOLOGY: &str = "I'm here to help with any questions you have about our legal services.";

/// Input handed to the fallback transition when the lead could not be
/// saved; the user already answered the final question.
const LEAD_FAILURE_ACK: &str = "Thank you for your information.";

/// Errors surfaced by `start_conversation`.
///
/// A questionnaire that cannot be loaded or has no steps is a genuine
/// configuration defect, not something to fall back from.
#[derive(Debug, thiserror::Error)]
pub enum FlowDefinitionError {
    #[error("conversation flow has no steps")]
    Empty,

    #[error("conversation flow unavailable: {0}")]
    Unavailable(#[from] StoreError),
}

/// Internal fault during a conversational turn. Never escapes
/// `process_response`; the fallback transition maps every variant into an
/// AI-mode result.
#[derive(Debug, thiserror::Error)]
enum TurnError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error("step {0} no longer exists in the flow definition")]
    MissingStep(u32),

    #[error(transparent)]
    Restart(FlowDefinitionError),
}

struct CachedFlow {
    flow: FlowDefinition,
    fetched_at: Instant,
}

/// The core state machine: session lifecycle, step advancement, lead
/// completion and the fallback-to-AI-mode error policy.
pub struct ConversationFlowManager {
    flow_store: Arc<dyn FlowStore>,
    session_store: Arc<dyn SessionStore>,
    lead_store: Arc<dyn LeadStore>,
    responder: Arc<dyn Responder>,
    flow_cache: RwLock<Option<CachedFlow>>,
    cache_ttl: Duration,
}

impl ConversationFlowManager {
    pub fn new(
        flow_store: Arc<dyn FlowStore>,
        session_store: Arc<dyn SessionStore>,
        lead_store: Arc<dyn LeadStore>,
        responder: Arc<dyn Responder>,
    ) -> Self {
        Self {
            flow_store,
            session_store,
            lead_store,
            responder,
            flow_cache: RwLock::new(None),
            cache_ttl: FLOW_CACHE_TTL,
        }
    }

    /// Overrides the flow-cache TTL (tests and local development).
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// Starts a new guided conversation and returns the first question.
    ///
    /// Generates a random session id when none is supplied. The session is
    /// persisted before returning; a session-write failure is logged and
    /// tolerated because a later turn restarts the missing session anyway.
    ///
    /// # Errors
    ///
    /// `FlowDefinitionError` when the questionnaire is empty or cannot be
    /// loaded. This is the only error the manager surfaces.
    pub async fn start_conversation(
        &self,
        session_id: Option<SessionId>,
    ) -> Result<ConversationResult, FlowDefinitionError> {
        let session_id = session_id.unwrap_or_default();
        let flow = self.flow().await?;
        let first = flow.first_step().ok_or(FlowDefinitionError::Empty)?;

        let session = IntakeSession::new(session_id, first.id);
        if let Err(err) = self.session_store.put(&session).await {
            warn!(%session_id, %err, "failed to persist new session");
        }

        info!(%session_id, step_id = first.id, "started conversation");

        Ok(ConversationResult::NextQuestion {
            session_id,
            question: first.question.clone(),
            step_id: first.id,
            is_final_step: Some(first.id) == flow.max_step_id(),
        })
    }

    /// Processes one user turn: next question, completion, or AI reply.
    ///
    /// Infallible by contract - any internal fault takes the fallback
    /// transition, so the user always gets a reply.
    pub async fn process_response(
        &self,
        session_id: SessionId,
        user_text: &str,
    ) -> ConversationResult {
        match self.try_process(session_id, user_text).await {
            Ok(result) => result,
            Err(err) => {
                error!(%session_id, %err, "turn failed, falling back to AI mode");
                self.fallback_to_ai_mode(session_id, user_text).await
            }
        }
    }

    async fn try_process(
        &self,
        session_id: SessionId,
        user_text: &str,
    ) -> Result<ConversationResult, TurnError> {
        let mut session = match self.session_store.get(&session_id).await? {
            Some(session) => session,
            // Missing or expired session: restart rather than erroring the
            // user-facing turn.
            None => {
                return self
                    .start_conversation(Some(session_id))
                    .await
                    .map_err(TurnError::Restart)
            }
        };

        if session.ai_mode {
            let response = self.responder.generate(user_text, Some(&session_id)).await?;
            return Ok(ConversationResult::AiReply {
                session_id,
                response,
            });
        }

        let flow = self.flow().await?;
        let step = match flow.step(session.current_step) {
            Some(step) => step,
            // Flow-integrity fault: the step was removed by an
            // administrator mid-session.
            None => {
                warn!(
                    %session_id,
                    step_id = session.current_step,
                    "current step vanished from flow definition"
                );
                return Err(TurnError::MissingStep(session.current_step));
            }
        };

        session.record_response(step.field_name(), user_text);

        // Exact-id lookup: flows with gaps in ids terminate early instead
        // of skip-searching for the next larger id.
        let next_id = session.current_step + 1;
        match flow.step(next_id) {
            Some(next) => {
                session.advance_to(next.id);
                self.session_store.put(&session).await?;
                Ok(ConversationResult::NextQuestion {
                    session_id,
                    question: next.question.clone(),
                    step_id: next.id,
                    is_final_step: Some(next.id) == flow.max_step_id(),
                })
            }
            None => Ok(self.complete_flow(session, &flow).await),
        }
    }

    /// Completion transition: persist the lead, flip the session to AI
    /// mode, return the completion message.
    async fn complete_flow(
        &self,
        mut session: IntakeSession,
        flow: &FlowDefinition,
    ) -> ConversationResult {
        let session_id = session.session_id;
        let lead = Lead::from_responses(&session.responses, session_id);

        match self.lead_store.save(&lead).await {
            Ok(lead_id) => {
                session.complete(Some(lead_id.clone()));
                if let Err(err) = self.session_store.put(&session).await {
                    // The lead exists; losing the session flip only costs a
                    // restarted flow on the next turn.
                    warn!(%session_id, %err, "failed to persist completed session");
                }
                info!(%session_id, %lead_id, "flow completed, lead saved");
                ConversationResult::FlowCompleted {
                    session_id,
                    response: flow.completion_message.clone(),
                    lead_id,
                }
            }
            Err(err) => {
                error!(%session_id, %err, "failed to save lead, falling back to AI mode");
                self.fallback_to_ai_mode(session_id, LEAD_FAILURE_ACK).await
            }
        }
    }

    /// Fallback transition: best-effort flip to AI mode, then answer the
    /// triggering text. If the Responder also fails, return the fixed
    /// apology. Every path terminates in a `ConversationResult`.
    async fn fallback_to_ai_mode(
        &self,
        session_id: SessionId,
        trigger_text: &str,
    ) -> ConversationResult {
        match self.session_store.get(&session_id).await {
            Ok(Some(mut session)) => {
                session.switch_to_ai_mode();
                if let Err(err) = self.session_store.put(&session).await {
                    warn!(%session_id, %err, "failed to persist AI-mode switch");
                }
            }
            Ok(None) => {
                let mut session = IntakeSession::new(session_id, 1);
                session.switch_to_ai_mode();
                if let Err(err) = self.session_store.put(&session).await {
                    warn!(%session_id, %err, "failed to persist AI-mode session");
                }
            }
            Err(err) => warn!(%session_id, %err, "could not load session for AI-mode switch"),
        }

        let response = match self.responder.generate(trigger_text, Some(&session_id)).await {
            Ok(response) => response,
            Err(err) => {
                error!(%session_id, %err, "responder failed in fallback, using apology");
                APOLOGY.to_string()
            }
        };

        ConversationResult::AiReply {
            session_id,
            response,
        }
    }

    /// Read-only progress snapshot. A missing session (or an unreadable
    /// store) reports `Missing` rather than erroring.
    pub async fn conversation_status(&self, session_id: SessionId) -> ConversationStatus {
        let session = match self.session_store.get(&session_id).await {
            Ok(Some(session)) => session,
            Ok(None) => return ConversationStatus::Missing,
            Err(err) => {
                warn!(%session_id, %err, "status lookup failed");
                return ConversationStatus::Missing;
            }
        };

        let total_steps = match self.flow().await {
            Ok(flow) => flow.total_steps(),
            Err(err) => {
                warn!(%session_id, %err, "flow unavailable for status");
                return ConversationStatus::Missing;
            }
        };

        ConversationStatus::Active(StatusSnapshot {
            session_id,
            current_step: session.current_step,
            total_steps,
            flow_completed: session.flow_completed,
            ai_mode: session.ai_mode,
            responses_collected: session.responses.len(),
            started_at: session.started_at,
            last_updated: session.last_updated,
        })
    }

    /// The flow definition currently in effect (admin/debug visibility).
    pub async fn current_flow(&self) -> Result<FlowDefinition, FlowDefinitionError> {
        Ok(self.flow().await?)
    }

    /// Check-then-refresh flow cache with a wall-clock TTL.
    async fn flow(&self) -> Result<FlowDefinition, StoreError> {
        {
            let cache = self.flow_cache.read().await;
            if let Some(cached) = cache.as_ref() {
                if cached.fetched_at.elapsed() < self.cache_ttl {
                    return Ok(cached.flow.clone());
                }
            }
        }

        let flow = self.flow_store.get_flow().await?;
        *self.flow_cache.write().await = Some(CachedFlow {
            flow: flow.clone(),
            fetched_at: Instant::now(),
        });
        Ok(flow)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::MockResponder;
    use crate::adapters::memory::{InMemoryFlowStore, InMemoryLeadStore, InMemorySessionStore};
    use crate::domain::intake::Step;

    struct Harness {
        manager: ConversationFlowManager,
        flow_store: Arc<InMemoryFlowStore>,
        session_store: Arc<InMemorySessionStore>,
        lead_store: Arc<InMemoryLeadStore>,
        responder: Arc<MockResponder>,
    }

    fn two_step_flow() -> FlowDefinition {
        FlowDefinition {
            steps: vec![
                Step {
                    id: 1,
                    question: "Name?".to_string(),
                    field: Some("name".to_string()),
                    required: true,
                },
                Step {
                    id: 2,
                    question: "Legal area?".to_string(),
                    field: Some("area_of_law".to_string()),
                    required: true,
                },
            ],
            completion_message: "All set!".to_string(),
        }
    }

    fn harness(flow: FlowDefinition) -> Harness {
        let flow_store = Arc::new(InMemoryFlowStore::new(flow));
        let session_store = Arc::new(InMemorySessionStore::new());
        let lead_store = Arc::new(InMemoryLeadStore::new());
        let responder = Arc::new(MockResponder::new());
        let manager = ConversationFlowManager::new(
            flow_store.clone(),
            session_store.clone(),
            lead_store.clone(),
            responder.clone(),
        )
        .with_cache_ttl(Duration::ZERO);
        Harness {
            manager,
            flow_store,
            session_store,
            lead_store,
            responder,
        }
    }

    fn question_of(result: &ConversationResult) -> (&str, u32, bool) {
        match result {
            ConversationResult::NextQuestion {
                question,
                step_id,
                is_final_step,
                ..
            } => (question, *step_id, *is_final_step),
            other => panic!("expected NextQuestion, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn start_returns_lowest_step_id() {
        let mut flow = two_step_flow();
        flow.steps.reverse();
        let h = harness(flow);

        let result = h.manager.start_conversation(None).await.unwrap();
        let (question, step_id, is_final) = question_of(&result);
        assert_eq!(question, "Name?");
        assert_eq!(step_id, 1);
        assert!(!is_final);

        let stored = h.session_store.get_session(&result.session_id()).await.unwrap();
        assert_eq!(stored.current_step, 1);
    }

    #[tokio::test]
    async fn start_fails_on_empty_flow() {
        let h = harness(FlowDefinition {
            steps: vec![],
            completion_message: String::new(),
        });
        let result = h.manager.start_conversation(None).await;
        assert!(matches!(result, Err(FlowDefinitionError::Empty)));
    }

    #[tokio::test]
    async fn single_step_flow_starts_on_final_step() {
        let mut flow = two_step_flow();
        flow.steps.truncate(1);
        let h = harness(flow);
        let result = h.manager.start_conversation(None).await.unwrap();
        assert!(question_of(&result).2);
    }

    #[tokio::test]
    async fn response_advances_and_stores_trimmed_answer() {
        let h = harness(two_step_flow());
        let started = h.manager.start_conversation(None).await.unwrap();
        let id = started.session_id();

        let result = h.manager.process_response(id, "  Ana  ").await;
        let (question, step_id, is_final) = question_of(&result);
        assert_eq!(question, "Legal area?");
        assert_eq!(step_id, 2);
        assert!(is_final);

        let session = h.session_store.get_session(&id).await.unwrap();
        assert_eq!(session.responses["name"], "Ana");
        assert_eq!(session.current_step, 2);
    }

    #[tokio::test]
    async fn final_answer_completes_flow_and_saves_lead() {
        let h = harness(two_step_flow());
        let id = h.manager.start_conversation(None).await.unwrap().session_id();
        h.manager.process_response(id, "Ana").await;

        let result = h.manager.process_response(id, "Civil").await;
        match result {
            ConversationResult::FlowCompleted {
                response, lead_id, ..
            } => {
                assert_eq!(response, "All set!");
                assert_eq!(lead_id.as_str(), "lead-1");
            }
            other => panic!("expected FlowCompleted, got {other:?}"),
        }

        let leads = h.lead_store.leads().await;
        assert_eq!(leads.len(), 1);
        assert_eq!(leads[0].name, "Ana");
        assert_eq!(leads[0].area_of_law, "Civil");
        assert_eq!(leads[0].session_id, id);

        let session = h.session_store.get_session(&id).await.unwrap();
        assert!(session.flow_completed);
        assert!(session.ai_mode);
        assert!(session.lead_id.is_some());
    }

    #[tokio::test]
    async fn gap_in_step_ids_terminates_flow_early() {
        // Steps 1 and 3: the literal current_step + 1 lookup finds no step
        // 2, so the flow completes after the first answer.
        let flow = FlowDefinition {
            steps: vec![
                Step {
                    id: 1,
                    question: "Name?".to_string(),
                    field: Some("name".to_string()),
                    required: true,
                },
                Step {
                    id: 3,
                    question: "Never asked?".to_string(),
                    field: None,
                    required: true,
                },
            ],
            completion_message: "Done.".to_string(),
        };
        let h = harness(flow);
        let id = h.manager.start_conversation(None).await.unwrap().session_id();

        let result = h.manager.process_response(id, "Ana").await;
        assert!(matches!(result, ConversationResult::FlowCompleted { .. }));
        assert_eq!(h.lead_store.leads().await.len(), 1);
    }

    #[tokio::test]
    async fn ai_mode_never_reenters_questionnaire() {
        let h = harness(two_step_flow());
        let id = h.manager.start_conversation(None).await.unwrap().session_id();
        h.manager.process_response(id, "Ana").await;
        h.manager.process_response(id, "Civil").await;

        for text in ["Name?", "1", "anything at all"] {
            let result = h.manager.process_response(id, text).await;
            assert!(matches!(result, ConversationResult::AiReply { .. }));
        }

        // Still exactly one lead, and the session never left step 2.
        assert_eq!(h.lead_store.leads().await.len(), 1);
        let session = h.session_store.get_session(&id).await.unwrap();
        assert!(session.ai_mode);
    }

    #[tokio::test]
    async fn missing_session_restarts_instead_of_failing() {
        let h = harness(two_step_flow());
        let unknown = SessionId::new();

        let result = h.manager.process_response(unknown, "hello").await;
        let (question, step_id, _) = question_of(&result);
        assert_eq!(question, "Name?");
        assert_eq!(step_id, 1);
        assert_eq!(result.session_id(), unknown);
    }

    #[tokio::test]
    async fn session_get_failure_falls_back_to_ai_mode() {
        let h = harness(two_step_flow());
        let id = h.manager.start_conversation(None).await.unwrap().session_id();
        h.session_store.fail_gets(true);

        let result = h.manager.process_response(id, "hello").await;
        match result {
            ConversationResult::AiReply { response, .. } => {
                assert_eq!(response, "AI Response: hello");
            }
            other => panic!("expected AiReply, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn session_put_failure_during_advance_falls_back() {
        let h = harness(two_step_flow());
        let id = h.manager.start_conversation(None).await.unwrap().session_id();
        h.session_store.fail_puts(true);

        let result = h.manager.process_response(id, "Ana").await;
        assert!(matches!(result, ConversationResult::AiReply { .. }));
    }

    #[tokio::test]
    async fn vanished_step_takes_fallback_transition() {
        let h = harness(two_step_flow());
        let id = h.manager.start_conversation(None).await.unwrap().session_id();

        // Administrator deletes step 1 mid-session; the zero TTL makes the
        // edit visible immediately.
        let mut edited = two_step_flow();
        edited.steps.retain(|s| s.id != 1);
        h.flow_store.set_flow(edited).await;

        let result = h.manager.process_response(id, "Ana").await;
        match result {
            ConversationResult::AiReply { response, .. } => {
                assert_eq!(response, "AI Response: Ana");
            }
            other => panic!("expected AiReply, got {other:?}"),
        }
        let session = h.session_store.get_session(&id).await.unwrap();
        assert!(session.ai_mode);
    }

    #[tokio::test]
    async fn responder_failure_in_fallback_returns_apology() {
        let h = harness(two_step_flow());
        let id = h.manager.start_conversation(None).await.unwrap().session_id();
        h.session_store.fail_gets(true);
        h.responder.set_failing(true);

        let result = h.manager.process_response(id, "hello").await;
        match result {
            ConversationResult::AiReply { response, .. } => assert_eq!(response, APOLOGY),
            other => panic!("expected AiReply, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn lead_save_failure_still_replies_in_ai_mode() {
        let h = harness(two_step_flow());
        let id = h.manager.start_conversation(None).await.unwrap().session_id();
        h.manager.process_response(id, "Ana").await;
        h.lead_store.set_failing(true);

        let result = h.manager.process_response(id, "Civil").await;
        match result {
            ConversationResult::AiReply { response, .. } => {
                assert_eq!(response, format!("AI Response: {LEAD_FAILURE_ACK}"));
            }
            other => panic!("expected AiReply, got {other:?}"),
        }

        assert!(h.lead_store.leads().await.is_empty());
        let session = h.session_store.get_session(&id).await.unwrap();
        assert!(session.ai_mode);
        assert!(session.lead_id.is_none());
    }

    #[tokio::test]
    async fn status_is_idempotent_and_reports_progress() {
        let h = harness(two_step_flow());
        let id = h.manager.start_conversation(None).await.unwrap().session_id();
        h.manager.process_response(id, "Ana").await;

        let first = h.manager.conversation_status(id).await;
        let second = h.manager.conversation_status(id).await;
        assert_eq!(first, second);

        match first {
            ConversationStatus::Active(snapshot) => {
                assert_eq!(snapshot.current_step, 2);
                assert_eq!(snapshot.total_steps, 2);
                assert_eq!(snapshot.responses_collected, 1);
                assert!(!snapshot.ai_mode);
            }
            ConversationStatus::Missing => panic!("expected active status"),
        }
    }

    #[tokio::test]
    async fn status_for_unknown_session_is_missing() {
        let h = harness(two_step_flow());
        let status = h.manager.conversation_status(SessionId::new()).await;
        assert_eq!(status, ConversationStatus::Missing);
    }

    #[tokio::test]
    async fn flow_cache_serves_stale_definition_until_ttl() {
        let flow_store = Arc::new(InMemoryFlowStore::new(two_step_flow()));
        let manager = ConversationFlowManager::new(
            flow_store.clone(),
            Arc::new(InMemorySessionStore::new()),
            Arc::new(InMemoryLeadStore::new()),
            Arc::new(MockResponder::new()),
        )
        .with_cache_ttl(Duration::from_secs(300));

        let before = manager.current_flow().await.unwrap();
        assert_eq!(before.total_steps(), 2);

        let mut edited = two_step_flow();
        edited.steps.truncate(1);
        flow_store.set_flow(edited).await;

        // Within the TTL the cached copy is still served.
        let cached = manager.current_flow().await.unwrap();
        assert_eq!(cached.total_steps(), 2);
    }
}
