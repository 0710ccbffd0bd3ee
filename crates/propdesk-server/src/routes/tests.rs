// crates/propdesk-server/src/routes/tests.rs
// ============================================================================
// Module: Route Handler Unit Tests
// Description: Handler-level tests over in-memory state.
// Purpose: Validate auth gating, ticket scoping, and update legality.
// Dependencies: propdesk-server, propdesk-core, tokio
// ============================================================================

//! ## Overview
//! Calls handlers directly with constructed state: login and session
//! introspection, role-scoped ticket reads, restricted-field updates with
//! lifecycle enforcement, vendor lookup, and chat session gating.

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

use async_trait::async_trait;

use propdesk_agent::ModelTurn;
use propdesk_agent::ProviderError;
use propdesk_agent::ReasoningProvider;
use propdesk_agent::contract::ToolSpec;
use propdesk_agent::provider::Turn;
use propdesk_core::FixedClock;
use propdesk_core::InMemoryTicketStore;
use propdesk_core::TicketStatus;
use propdesk_core::Timestamp;
use propdesk_core::Urgency;

use super::*;
use crate::auth::SESSION_COOKIE;
use crate::telemetry::NoopMetrics;
use crate::vendors::StaticVendorDirectory;

// ============================================================================
// SECTION: Test Fixtures
// ============================================================================

const NOW: Timestamp = Timestamp::from_unix_millis(1_700_000_000_000);

/// Provider stub answering every completion with an empty turn.
struct SilentProvider;

#[async_trait]
impl ReasoningProvider for SilentProvider {
    async fn complete(
        &self,
        _system: &str,
        _turns: &[Turn],
        _tools: &[ToolSpec],
    ) -> Result<ModelTurn, ProviderError> {
        Ok(ModelTurn::default())
    }
}

fn test_state() -> AppState {
    let clock: SharedClock = Arc::new(FixedClock::new(NOW));
    AppState {
        store: Arc::new(InMemoryTicketStore::with_seed(
            Arc::clone(&clock),
            seed::seed_tickets(NOW),
        )),
        directory: Arc::new(StaticVendorDirectory),
        provider: Arc::new(SilentProvider),
        catalog: Arc::new(ToolCatalog::standard().expect("catalog")),
        clock,
        metrics: Arc::new(NoopMetrics),
    }
}

fn cookie_headers_for(email: &str) -> HeaderMap {
    let session = auth::validate_credentials(email, "demo123").expect("demo user");
    let mut headers = HeaderMap::new();
    let value = format!("{SESSION_COOKIE}={}", auth::encode_session(&session));
    headers.insert(axum::http::header::COOKIE, value.parse().expect("header value"));
    headers
}

fn demo_vendor(state: &AppState) -> propdesk_core::Vendor {
    state
        .store
        .get(&TicketId::new("demo-ticket-1"))
        .expect("demo ticket")
        .vendors
        .first()
        .expect("vendor")
        .clone()
}

// ============================================================================
// SECTION: Auth Routes
// ============================================================================

#[tokio::test]
async fn login_returns_session_and_cookie() {
    let state = test_state();
    let response = login(
        State(state),
        Json(LoginRequest {
            email: "maria@demo.com".to_string(),
            password: "demo123".to_string(),
        }),
    )
    .await
    .expect("login ok");
    let (AppendHeaders([(name, cookie)]), Json(body)) = response;
    assert_eq!(name, SET_COOKIE);
    assert!(cookie.starts_with(SESSION_COOKIE));
    assert!(cookie.contains("HttpOnly"));
    assert_eq!(body.user.role, Role::Tenant);
    assert_eq!(body.user.property_slug.as_deref(), Some("portland-oak-st"));
}

#[tokio::test]
async fn login_rejects_bad_credentials_and_missing_fields() {
    let state = test_state();
    let bad = login(
        State(state.clone()),
        Json(LoginRequest {
            email: "maria@demo.com".to_string(),
            password: "wrong".to_string(),
        }),
    )
    .await;
    assert_eq!(bad.err(), Some(ApiError::Unauthorized));

    let missing = login(
        State(state),
        Json(LoginRequest {
            email: String::new(),
            password: String::new(),
        }),
    )
    .await;
    assert!(matches!(missing.err(), Some(ApiError::BadRequest(_))));
}

#[tokio::test]
async fn me_round_trips_the_session() {
    let state = test_state();
    let headers = cookie_headers_for("landlord@demo.com");
    let Json(body) = me(State(state.clone()), headers).await.expect("me ok");
    assert_eq!(body.user.role, Role::Landlord);

    let anonymous = me(State(state), HeaderMap::new()).await;
    assert_eq!(anonymous.err(), Some(ApiError::Unauthorized));
}

// ============================================================================
// SECTION: Ticket Routes
// ============================================================================

#[tokio::test]
async fn landlord_sees_all_tickets_awaiting_first() {
    let state = test_state();
    let headers = cookie_headers_for("landlord@demo.com");
    let Json(tickets) = list_tickets(State(state), headers).await.expect("list ok");
    assert_eq!(tickets.len(), 2);
    assert_eq!(tickets[0].id, TicketId::new("demo-ticket-1"));
    assert_eq!(tickets[0].status, TicketStatus::AwaitingApproval);
    assert_eq!(tickets[1].id, TicketId::new("ticket-seed-1"));
}

#[tokio::test]
async fn tenant_listing_is_scoped_to_their_property() {
    let state = test_state();
    let maria = cookie_headers_for("maria@demo.com");
    let Json(tickets) = list_tickets(State(state.clone()), maria).await.expect("list ok");
    assert_eq!(tickets.len(), 1);
    assert_eq!(tickets[0].id, TicketId::new("demo-ticket-1"));

    let james = cookie_headers_for("james@demo.com");
    let Json(tickets) = list_tickets(State(state), james).await.expect("list ok");
    assert!(tickets.is_empty());
}

#[tokio::test]
async fn ticket_reads_hide_out_of_scope_records() {
    let state = test_state();
    let landlord = cookie_headers_for("landlord@demo.com");
    let unknown =
        get_ticket(State(state.clone()), landlord, Path("ticket-missing".to_string())).await;
    assert!(matches!(unknown.err(), Some(ApiError::NotFound(_))));

    // ticket-seed-1 belongs to prop-2; maria is scoped to prop-1.
    let maria = cookie_headers_for("maria@demo.com");
    let hidden = get_ticket(State(state.clone()), maria, Path("ticket-seed-1".to_string())).await;
    assert!(matches!(hidden.err(), Some(ApiError::NotFound(_))));

    let maria = cookie_headers_for("maria@demo.com");
    let Json(ticket) = get_ticket(State(state), maria, Path("demo-ticket-1".to_string()))
        .await
        .expect("own ticket");
    assert_eq!(ticket.urgency, Urgency::Medium);
}

#[tokio::test]
async fn landlord_schedules_with_vendor_and_slot() {
    let state = test_state();
    let vendor = demo_vendor(&state);
    let slot = vendor.available_slots.first().expect("slot").clone();
    let headers = cookie_headers_for("landlord@demo.com");
    let Json(updated) = patch_ticket(
        State(state),
        headers,
        Path("demo-ticket-1".to_string()),
        Json(TicketUpdate {
            status: Some(TicketStatus::Scheduled),
            selected_vendor: Some(vendor.clone()),
            selected_slot: Some(slot.clone()),
        }),
    )
    .await
    .expect("patch ok");
    assert_eq!(updated.status, TicketStatus::Scheduled);
    assert_eq!(updated.selected_vendor, Some(vendor));
    assert_eq!(updated.selected_slot, Some(slot));
    assert_eq!(updated.updated_at, NOW);
}

#[tokio::test]
async fn lifecycle_violations_are_unprocessable() {
    let state = test_state();

    // Skipping scheduled entirely is an illegal transition.
    let jump = patch_ticket(
        State(state.clone()),
        cookie_headers_for("landlord@demo.com"),
        Path("demo-ticket-1".to_string()),
        Json(TicketUpdate {
            status: Some(TicketStatus::Complete),
            selected_vendor: None,
            selected_slot: None,
        }),
    )
    .await;
    assert!(matches!(jump.err(), Some(ApiError::Unprocessable(_))));

    // Scheduling without a vendor selection is rejected.
    let unscheduled = patch_ticket(
        State(state.clone()),
        cookie_headers_for("landlord@demo.com"),
        Path("demo-ticket-1".to_string()),
        Json(TicketUpdate {
            status: Some(TicketStatus::Scheduled),
            selected_vendor: None,
            selected_slot: None,
        }),
    )
    .await;
    assert!(matches!(unscheduled.err(), Some(ApiError::Unprocessable(_))));

    // A vendor without its slot never lands, even with the right status.
    let vendor = demo_vendor(&state);
    let unpaired = patch_ticket(
        State(state),
        cookie_headers_for("landlord@demo.com"),
        Path("demo-ticket-1".to_string()),
        Json(TicketUpdate {
            status: Some(TicketStatus::Scheduled),
            selected_vendor: Some(vendor),
            selected_slot: None,
        }),
    )
    .await;
    assert!(matches!(unpaired.err(), Some(ApiError::Unprocessable(_))));
}

#[tokio::test]
async fn updates_are_landlord_only_and_non_empty() {
    let state = test_state();
    let forbidden = patch_ticket(
        State(state.clone()),
        cookie_headers_for("maria@demo.com"),
        Path("demo-ticket-1".to_string()),
        Json(TicketUpdate {
            status: Some(TicketStatus::Scheduled),
            selected_vendor: None,
            selected_slot: None,
        }),
    )
    .await;
    assert_eq!(forbidden.err(), Some(ApiError::Forbidden));

    let empty = patch_ticket(
        State(state),
        cookie_headers_for("landlord@demo.com"),
        Path("demo-ticket-1".to_string()),
        Json(TicketUpdate::default()),
    )
    .await;
    assert!(matches!(empty.err(), Some(ApiError::BadRequest(_))));
}

// ============================================================================
// SECTION: Vendor Route
// ============================================================================

#[tokio::test]
async fn vendor_lookup_parses_and_defaults() {
    let state = test_state();
    let Json(plumbers) = list_vendors(
        State(state.clone()),
        Query(VendorQuery {
            issue_type: Some("plumbing".to_string()),
            zip: Some("97201".to_string()),
        }),
    )
    .await;
    assert_eq!(plumbers[0].name, "Mike's Plumbing");

    let Json(fallback) = list_vendors(
        State(state),
        Query(VendorQuery {
            issue_type: Some("landscaping".to_string()),
            zip: None,
        }),
    )
    .await;
    assert_eq!(fallback[0].name, "HandyPro Services");
}

// ============================================================================
// SECTION: Chat Route
// ============================================================================

#[tokio::test]
async fn chat_requires_a_matching_tenant_session() {
    let state = test_state();
    let request = || ChatRequest {
        messages: Vec::new(),
        property_slug: "portland-oak-st".to_string(),
        tenant_id: None,
    };

    let landlord = cookie_headers_for("landlord@demo.com");
    assert_eq!(chat_session(&state, &landlord, request()).err(), Some(ApiError::Forbidden));

    // James is scoped to chicago-pine-rd and may not chat against Portland.
    let james = cookie_headers_for("james@demo.com");
    assert_eq!(chat_session(&state, &james, request()).err(), Some(ApiError::Forbidden));

    assert_eq!(chat_session(&state, &HeaderMap::new(), request()).err(), Some(ApiError::Unauthorized));
}

#[tokio::test]
async fn chat_stream_ends_with_the_done_marker() {
    let state = test_state();
    let maria = cookie_headers_for("maria@demo.com");
    let mut rx = chat_session(
        &state,
        &maria,
        ChatRequest {
            messages: Vec::new(),
            property_slug: "portland-oak-st".to_string(),
            tenant_id: Some(TenantId::new("tenant-1")),
        },
    )
    .expect("session spawned");

    let mut events = Vec::new();
    while let Some(event) = rx.recv().await {
        events.push(event);
    }
    assert!(matches!(events.last(), Some(TriageEvent::Done)));
}
