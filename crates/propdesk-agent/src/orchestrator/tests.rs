// crates/propdesk-agent/src/orchestrator/tests.rs
// ============================================================================
// Module: Orchestrator Unit Tests
// Description: Scripted-provider tests for the triage turn loop.
// Purpose: Validate loop termination, creation verification, and event order.
// Dependencies: propdesk-agent, propdesk-core, tokio
// ============================================================================

//! ## Overview
//! Drives the session loop with a scripted reasoning provider and in-memory
//! collaborators: happy path, follow-up compensation, contract-violation
//! retry, the round cap, read-after-write verification failure, and the
//! unconditional end-of-stream marker.

// ============================================================================
// SECTION: Lint Configuration
// ============================================================================

#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::panic,
    reason = "Test-only assertions favor direct unwrap/expect for clarity."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::PoisonError;

use async_trait::async_trait;
use serde_json::json;

use propdesk_core::ChatMessage;
use propdesk_core::FixedClock;
use propdesk_core::InMemoryTicketStore;
use propdesk_core::IssueType;
use propdesk_core::Property;
use propdesk_core::PropertyId;
use propdesk_core::SpeakerRole;
use propdesk_core::StoreError;
use propdesk_core::Tenant;
use propdesk_core::TenantId;
use propdesk_core::Ticket;
use propdesk_core::TicketFilter;
use propdesk_core::TicketId;
use propdesk_core::TicketStatus;
use propdesk_core::TicketStore;
use propdesk_core::TicketUpdate;
use propdesk_core::Timestamp;
use propdesk_core::Urgency;
use propdesk_core::Vendor;
use propdesk_core::VendorDirectory;
use propdesk_core::VendorId;

use super::*;
use crate::contract::ToolCatalog;
use crate::contract::ToolSpec;
use crate::events::EventEmitter;
use crate::events::TriageEvent;
use crate::provider::ModelTurn;
use crate::provider::ProviderError;
use crate::provider::ReasoningProvider;
use crate::provider::ToolInvocation;
use crate::provider::Turn;

// ============================================================================
// SECTION: Test Fixtures
// ============================================================================

const CLOCK_NOW: Timestamp = Timestamp::from_unix_millis(1_700_000_000_000);

/// Provider replaying a scripted sequence of model turns.
struct ScriptedProvider {
    /// Remaining scripted responses.
    script: Mutex<VecDeque<Result<ModelTurn, ProviderError>>>,
    /// Conversation snapshots received per call.
    calls: Mutex<Vec<Vec<Turn>>>,
}

impl ScriptedProvider {
    fn new(script: Vec<Result<ModelTurn, ProviderError>>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            calls: Mutex::new(Vec::new()),
        })
    }

    fn call_count(&self) -> usize {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    fn call_turns(&self, index: usize) -> Vec<Turn> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner)[index].clone()
    }
}

#[async_trait]
impl ReasoningProvider for ScriptedProvider {
    async fn complete(
        &self,
        _system: &str,
        turns: &[Turn],
        _tools: &[ToolSpec],
    ) -> Result<ModelTurn, ProviderError> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).push(turns.to_vec());
        self.script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .unwrap_or_else(|| Ok(ModelTurn::default()))
    }
}

/// Single-candidate vendor directory stub.
struct OneVendorDirectory;

impl VendorDirectory for OneVendorDirectory {
    fn search(&self, _issue_type: IssueType, _zip: &str) -> Vec<Vendor> {
        vec![Vendor {
            id: VendorId::new("v1"),
            name: "Mike's Plumbing".to_string(),
            rating: 4.8,
            review_count: 127,
            distance_miles: 0.8,
            estimated_cost_low: 150,
            estimated_cost_high: 250,
            available_slots: vec!["Tomorrow 9-11am".to_string()],
            phone: "(555) 010-0001".to_string(),
        }]
    }
}

/// Store whose reads always miss, to exercise write verification.
struct AmnesiacStore;

impl TicketStore for AmnesiacStore {
    fn create(&self, ticket: Ticket) -> Result<TicketId, StoreError> {
        Ok(ticket.id)
    }

    fn get(&self, id: &TicketId) -> Result<Ticket, StoreError> {
        Err(StoreError::NotFound(id.clone()))
    }

    fn update(&self, id: &TicketId, _update: TicketUpdate) -> Result<Ticket, StoreError> {
        Err(StoreError::NotFound(id.clone()))
    }

    fn list(&self, _filter: &TicketFilter) -> Vec<Ticket> {
        Vec::new()
    }
}

fn sample_context() -> SessionContext {
    SessionContext {
        property: Property {
            id: PropertyId::new("prop-1"),
            name: "123 Oak St".to_string(),
            address: "123 Oak Street".to_string(),
            city: "Portland".to_string(),
            state: "OR".to_string(),
            zip: "97201".to_string(),
            slug: "portland-oak-st".to_string(),
        },
        tenant: Some(Tenant {
            id: TenantId::new("tenant-1"),
            name: "Maria Lopez".to_string(),
            unit: "2B".to_string(),
            property_id: PropertyId::new("prop-1"),
        }),
    }
}

fn tenant_history(text: &str) -> Vec<ChatMessage> {
    vec![ChatMessage {
        role: SpeakerRole::Tenant,
        content: text.to_string(),
        timestamp: CLOCK_NOW,
    }]
}

fn classify_turn(needs_more_info: bool, question: Option<&str>) -> ModelTurn {
    let mut input = json!({
        "issue_type": "plumbing",
        "urgency": "medium",
        "summary": "Kitchen sink leaking under cabinet",
        "needs_more_info": needs_more_info,
    });
    if let Some(question) = question {
        input["follow_up_question"] = json!(question);
    }
    ModelTurn {
        prose: Vec::new(),
        tool: Some(ToolInvocation {
            id: "toolu_classify".to_string(),
            name: "classify_issue".to_string(),
            input,
        }),
    }
}

fn create_turn() -> ModelTurn {
    ModelTurn {
        prose: Vec::new(),
        tool: Some(ToolInvocation {
            id: "toolu_create".to_string(),
            name: "create_ticket".to_string(),
            input: json!({
                "issue_type": "plumbing",
                "urgency": "medium",
                "summary": "Kitchen sink leaking under cabinet",
                "raw_message": "leak under sink, still dripping",
                "property_id": "prop-999",
                "tenant_id": "tenant-999",
                "tenant_name": "Someone Else",
                "unit": "9Z",
            }),
        }),
    }
}

async fn run_session(
    provider: Arc<ScriptedProvider>,
    store: SharedTicketStore,
    history: Vec<ChatMessage>,
) -> Vec<TriageEvent> {
    let (emitter, mut rx) = EventEmitter::channel();
    let session = TriageSession::new(
        sample_context(),
        store,
        Arc::new(OneVendorDirectory),
        provider,
        Arc::new(ToolCatalog::standard().expect("catalog")),
        Arc::new(FixedClock::new(CLOCK_NOW)),
        emitter,
    );
    session.run(history).await;

    let mut events = Vec::new();
    while let Some(event) = rx.recv().await {
        events.push(event);
    }
    events
}

fn shared_store() -> Arc<InMemoryTicketStore> {
    Arc::new(InMemoryTicketStore::new(Arc::new(FixedClock::new(CLOCK_NOW))))
}

fn stored_ticket(id: &str) -> Ticket {
    Ticket {
        id: TicketId::new(id),
        property_id: PropertyId::new("prop-1"),
        tenant_id: TenantId::new("tenant-1"),
        tenant_name: "Maria Lopez".to_string(),
        unit: "2B".to_string(),
        issue_type: IssueType::Plumbing,
        urgency: Urgency::Medium,
        summary: "Kitchen sink leaking under cabinet".to_string(),
        raw_message: "leak under sink, still dripping".to_string(),
        status: TicketStatus::AwaitingApproval,
        messages: Vec::new(),
        vendors: OneVendorDirectory.search(IssueType::Plumbing, "97201"),
        selected_vendor: None,
        selected_slot: None,
        created_at: CLOCK_NOW,
        updated_at: CLOCK_NOW,
    }
}

// ============================================================================
// SECTION: Happy Path
// ============================================================================

#[tokio::test]
async fn classify_then_create_produces_one_verified_ticket() {
    let provider = ScriptedProvider::new(vec![
        Ok(ModelTurn {
            prose: vec!["Let me file that for you.".to_string()],
            ..classify_turn(false, None)
        }),
        Ok(create_turn()),
    ]);
    let store = shared_store();
    let events = run_session(
        provider.clone(),
        store.clone(),
        tenant_history("leak under sink, still dripping"),
    )
    .await;

    let tickets = store.list(&TicketFilter::default());
    assert_eq!(tickets.len(), 1);
    let ticket = &tickets[0];
    assert_eq!(ticket.status, TicketStatus::AwaitingApproval);
    assert_eq!(ticket.issue_type, IssueType::Plumbing);
    assert!(!ticket.vendors.is_empty());
    // Identity comes from the session context, not the advisory tool input.
    assert_eq!(ticket.tenant_id, TenantId::new("tenant-1"));
    assert_eq!(ticket.tenant_name, "Maria Lopez");
    assert_eq!(ticket.property_id, PropertyId::new("prop-1"));
    assert_eq!(ticket.messages.len(), 1);

    assert_eq!(provider.call_count(), 2);
    assert!(matches!(events.first(), Some(TriageEvent::Text { .. })));
    assert!(events.iter().any(|event| matches!(event, TriageEvent::TicketCreated { .. })));
    assert!(matches!(events.last(), Some(TriageEvent::Done)));
}

#[tokio::test]
async fn tool_free_turn_ends_the_session_without_a_ticket() {
    let provider = ScriptedProvider::new(vec![Ok(ModelTurn {
        prose: vec!["Happy to help with any maintenance issue!".to_string()],
        tool: None,
    })]);
    let store = shared_store();
    let events = run_session(provider.clone(), store.clone(), tenant_history("hello")).await;

    assert!(store.list(&TicketFilter::default()).is_empty());
    assert_eq!(provider.call_count(), 1);
    assert!(matches!(events.as_slice(), [TriageEvent::Text { .. }, TriageEvent::Done]));
}

// ============================================================================
// SECTION: Follow-Up Path
// ============================================================================

#[tokio::test]
async fn needs_more_info_spends_one_compensating_call_for_prose() {
    let provider = ScriptedProvider::new(vec![
        Ok(classify_turn(true, Some("What exactly is broken?"))),
        Ok(ModelTurn {
            prose: vec!["What exactly is broken, and where is it located?".to_string()],
            tool: None,
        }),
    ]);
    let store = shared_store();
    let events = run_session(provider.clone(), store.clone(), tenant_history("it's broken")).await;

    assert!(store.list(&TicketFilter::default()).is_empty());
    assert_eq!(provider.call_count(), 2);

    let status_index = events
        .iter()
        .position(|event| matches!(event, TriageEvent::Status { .. }))
        .expect("status event");
    let text_after_status = events[status_index..]
        .iter()
        .any(|event| matches!(event, TriageEvent::Text { .. }));
    assert!(text_after_status, "follow-up question must reach the tenant as prose");
    assert!(matches!(events.last(), Some(TriageEvent::Done)));

    // The pending tool result precedes the compensating call.
    let last_call = provider.call_turns(1);
    let has_pending_result = last_call.iter().any(|turn| {
        turn.content.iter().any(|block| {
            matches!(block, crate::provider::ContentBlock::ToolResult { is_error, .. } if !is_error)
        })
    });
    assert!(has_pending_result);
}

#[tokio::test]
async fn prose_free_compensating_turn_still_surfaces_the_question() {
    // The compensating turn answers with another tool invocation and no
    // prose; the validated question itself must still reach the tenant.
    let provider = ScriptedProvider::new(vec![
        Ok(classify_turn(true, Some("Which unit is the leak in?"))),
        Ok(classify_turn(true, Some("Which unit is the leak in?"))),
    ]);
    let store = shared_store();
    let events = run_session(provider.clone(), store.clone(), tenant_history("leak")).await;

    assert!(store.list(&TicketFilter::default()).is_empty());
    assert_eq!(provider.call_count(), 2);
    let question_reached_tenant = events.iter().any(|event| {
        matches!(event, TriageEvent::Text { content } if content == "Which unit is the leak in?")
    });
    assert!(question_reached_tenant, "follow-up question must surface as a text frame");
    assert!(matches!(events.last(), Some(TriageEvent::Done)));
}

// ============================================================================
// SECTION: Contract Violations
// ============================================================================

#[tokio::test]
async fn contract_violation_is_fed_back_and_retried() {
    let bad_classify = ModelTurn {
        prose: Vec::new(),
        tool: Some(ToolInvocation {
            id: "toolu_bad".to_string(),
            name: "classify_issue".to_string(),
            input: json!({
                "issue_type": "plumbing",
                "urgency": "urgent",
                "summary": "Sink leaking",
                "needs_more_info": false,
            }),
        }),
    };
    let provider = ScriptedProvider::new(vec![
        Ok(bad_classify),
        Ok(classify_turn(false, None)),
        Ok(create_turn()),
    ]);
    let store = shared_store();
    let events = run_session(provider.clone(), store.clone(), tenant_history("leak")).await;

    assert_eq!(store.list(&TicketFilter::default()).len(), 1);
    assert_eq!(provider.call_count(), 3);
    // The retry call saw the failed tool result.
    let retry_call = provider.call_turns(1);
    let has_error_result = retry_call.iter().any(|turn| {
        turn.content.iter().any(|block| {
            matches!(block, crate::provider::ContentBlock::ToolResult { is_error, .. } if *is_error)
        })
    });
    assert!(has_error_result);
    assert!(matches!(events.last(), Some(TriageEvent::Done)));
}

// ============================================================================
// SECTION: Round Cap
// ============================================================================

#[tokio::test]
async fn round_cap_bounds_the_loop_without_error() {
    let script: Vec<Result<ModelTurn, ProviderError>> =
        (0..10).map(|_| Ok(classify_turn(false, None))).collect();
    let provider = ScriptedProvider::new(script);
    let store = shared_store();
    let events = run_session(provider.clone(), store.clone(), tenant_history("leak")).await;

    assert_eq!(provider.call_count(), MAX_MODEL_ROUNDS);
    let tool_calls =
        events.iter().filter(|event| matches!(event, TriageEvent::ToolCall { .. })).count();
    assert_eq!(tool_calls, MAX_MODEL_ROUNDS);
    assert!(store.list(&TicketFilter::default()).is_empty());
    assert!(!events.iter().any(|event| matches!(event, TriageEvent::Error { .. })));
    assert!(matches!(events.last(), Some(TriageEvent::Done)));
}

// ============================================================================
// SECTION: Write Verification
// ============================================================================

#[tokio::test]
async fn unverified_write_never_emits_ticket_created() {
    let provider = ScriptedProvider::new(vec![
        Ok(classify_turn(false, None)),
        Ok(create_turn()),
    ]);
    let events =
        run_session(provider.clone(), Arc::new(AmnesiacStore), tenant_history("leak")).await;

    assert!(!events.iter().any(|event| matches!(event, TriageEvent::TicketCreated { .. })));
    assert!(matches!(events.last(), Some(TriageEvent::Done)));
    // The verification failure went back to the model as a tool result.
    assert!(provider.call_count() >= 3);
    let followup_call = provider.call_turns(2);
    let has_error_result = followup_call.iter().any(|turn| {
        turn.content.iter().any(|block| {
            matches!(block, crate::provider::ContentBlock::ToolResult { is_error, .. } if *is_error)
        })
    });
    assert!(has_error_result);
}

// ============================================================================
// SECTION: Session Idempotency
// ============================================================================

#[test]
fn repeated_create_returns_the_existing_ticket_without_a_second_write() {
    let store = shared_store();
    store.create(stored_ticket("ticket-existing")).expect("seed");
    let (emitter, mut rx) = EventEmitter::channel();
    let session = TriageSession::new(
        sample_context(),
        store.clone(),
        Arc::new(OneVendorDirectory),
        ScriptedProvider::new(Vec::new()),
        Arc::new(ToolCatalog::standard().expect("catalog")),
        Arc::new(FixedClock::new(CLOCK_NOW)),
        emitter,
    );

    let invocation = create_turn().tool.expect("tool invocation");
    let input = CreateTicketInput::from_value(&invocation.input).expect("input");
    let mut created = Some(TicketId::new("ticket-existing"));
    let outcome = session.create_ticket(&input, &[], &mut created);

    match outcome {
        ToolOutcome::Created {
            ticket,
        } => assert_eq!(ticket.id, TicketId::new("ticket-existing")),
        _ => panic!("repeated create must surface the existing ticket"),
    }
    assert_eq!(store.list(&TicketFilter::default()).len(), 1);
    // The guarded path performs no vendor search and emits no status frame.
    drop(session);
    assert!(rx.try_recv().is_err());
}

// ============================================================================
// SECTION: Failure Semantics
// ============================================================================

#[tokio::test]
async fn provider_failure_emits_single_error_then_done() {
    let provider = ScriptedProvider::new(vec![Err(ProviderError::Transport(
        "connection refused".to_string(),
    ))]);
    let store = shared_store();
    let events = run_session(provider, store.clone(), tenant_history("leak")).await;

    assert!(store.list(&TicketFilter::default()).is_empty());
    assert!(
        matches!(events.as_slice(), [TriageEvent::Error { message }, TriageEvent::Done]
            if message.contains("connection refused"))
    );
}
