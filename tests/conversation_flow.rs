//! End-to-end conversation journeys against in-memory adapters.

use std::sync::Arc;

use intake_relay::adapters::ai::MockResponder;
use intake_relay::adapters::memory::{InMemoryFlowStore, InMemoryLeadStore, InMemorySessionStore};
use intake_relay::application::ConversationFlowManager;
use intake_relay::domain::intake::{default_flow, ConversationResult};

struct Harness {
    manager: ConversationFlowManager,
    sessions: InMemorySessionStore,
    leads: InMemoryLeadStore,
    responder: Arc<MockResponder>,
}

fn harness() -> Harness {
    let flows = InMemoryFlowStore::new(default_flow());
    let sessions = InMemorySessionStore::new();
    let leads = InMemoryLeadStore::new();
    let responder = Arc::new(MockResponder::new());

    let manager = ConversationFlowManager::new(
        Arc::new(flows),
        Arc::new(sessions.clone()),
        Arc::new(leads.clone()),
        responder.clone(),
    );

    Harness {
        manager,
        sessions,
        leads,
        responder,
    }
}

#[tokio::test]
async fn full_intake_journey_collects_a_lead_and_hands_off_to_ai() {
    let h = harness();

    // Start: the greeting question of the default flow.
    let start = h.manager.start_conversation(None).await.unwrap();
    let ConversationResult::NextQuestion {
        session_id,
        question,
        step_id,
        is_final_step,
    } = start
    else {
        panic!("expected a question to start the flow");
    };
    assert_eq!(step_id, 1);
    assert!(!is_final_step);
    assert!(question.contains("full name"));

    // Answer all four questions in order.
    let second = h.manager.process_response(session_id, "Ana Souza").await;
    let ConversationResult::NextQuestion { step_id, .. } = &second else {
        panic!("expected the second question");
    };
    assert_eq!(*step_id, 2);

    let third = h.manager.process_response(session_id, "Civil Law").await;
    assert!(matches!(
        third,
        ConversationResult::NextQuestion { step_id: 3, .. }
    ));

    let fourth = h
        .manager
        .process_response(session_id, "Contract dispute with my landlord")
        .await;
    let ConversationResult::NextQuestion {
        step_id,
        is_final_step,
        ..
    } = fourth
    else {
        panic!("expected the final question");
    };
    assert_eq!(step_id, 4);
    assert!(is_final_step);

    // The last answer completes the flow and saves a lead.
    let done = h.manager.process_response(session_id, "Yes").await;
    let ConversationResult::FlowCompleted {
        response, lead_id, ..
    } = done
    else {
        panic!("expected flow completion");
    };
    assert_eq!(lead_id.as_str(), "lead-1");
    assert!(response.contains("recorded"));

    let leads = h.leads.leads().await;
    assert_eq!(leads.len(), 1);
    assert_eq!(leads[0].name, "Ana Souza");
    assert_eq!(leads[0].area_of_law, "Civil Law");
    assert_eq!(leads[0].wants_meeting, "Yes");
    assert_eq!(leads[0].source, "chatbot_intake");
    assert_eq!(leads[0].status, "new");

    // The session is now in AI mode; further messages go to the responder.
    let chat = h.manager.process_response(session_id, "How much is it?").await;
    let ConversationResult::AiReply { response, .. } = chat else {
        panic!("expected an AI reply after completion");
    };
    assert_eq!(response, "AI Response: How much is it?");

    // The persisted session reflects completion.
    let stored = h.sessions.get_session(&session_id).await.unwrap();
    assert!(stored.flow_completed);
    assert!(stored.ai_mode);
    assert!(stored.completed_at.is_some());
    assert!(stored.lead_id.is_some());
}

#[tokio::test]
async fn unknown_session_restarts_the_flow() {
    let h = harness();

    let start = h.manager.start_conversation(None).await.unwrap();
    let session_id = start.session_id();

    // A message from a session the store has never seen restarts the flow
    // under that same id.
    let other = h
        .manager
        .start_conversation(Some(session_id))
        .await
        .unwrap();
    assert_eq!(other.session_id(), session_id);
    assert_eq!(h.sessions.session_count().await, 1);
}

#[tokio::test]
async fn lead_save_failure_degrades_to_ai_mode_without_losing_the_user() {
    let h = harness();

    let start = h.manager.start_conversation(None).await.unwrap();
    let session_id = start.session_id();
    h.manager.process_response(session_id, "Ana").await;
    h.manager.process_response(session_id, "Civil").await;
    h.manager.process_response(session_id, "Dispute").await;

    h.leads.set_failing(true);
    let result = h.manager.process_response(session_id, "Yes").await;

    // The user still gets a coherent reply and lands in AI mode.
    let ConversationResult::AiReply { response, .. } = result else {
        panic!("expected fallback AI reply");
    };
    assert_eq!(response, "AI Response: Thank you for your information.");
    assert!(h.leads.leads().await.is_empty());

    let stored = h.sessions.get_session(&session_id).await.unwrap();
    assert!(stored.ai_mode);

    // Lead data was not silently retried later.
    h.leads.set_failing(false);
    h.manager.process_response(session_id, "hello again").await;
    assert!(h.leads.leads().await.is_empty());
}

#[tokio::test]
async fn responder_outage_yields_the_fixed_apology() {
    let h = harness();

    let start = h.manager.start_conversation(None).await.unwrap();
    let session_id = start.session_id();
    h.manager.process_response(session_id, "Ana").await;
    h.manager.process_response(session_id, "Civil").await;
    h.manager.process_response(session_id, "Dispute").await;
    h.manager.process_response(session_id, "Yes").await;

    h.responder.set_failing(true);
    let result = h.manager.process_response(session_id, "anyone there?").await;
    assert_eq!(
        result.reply_text(),
        "I'm here to help with any questions you have about our legal services."
    );
}
