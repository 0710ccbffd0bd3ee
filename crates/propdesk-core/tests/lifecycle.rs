// crates/propdesk-core/tests/lifecycle.rs
// ============================================================================
// Module: Lifecycle Unit Tests
// Description: Unit tests for ticket status transition legality.
// Purpose: Validate forward-only transitions and scheduling selection rules.
// Dependencies: propdesk-core
// ============================================================================

//! ## Overview
//! Exercises the transition table and restricted-field update validation.

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

use propdesk_core::LifecycleError;
use propdesk_core::TicketStatus;
use propdesk_core::TicketUpdate;
use propdesk_core::Vendor;
use propdesk_core::VendorId;
use propdesk_core::core::lifecycle::can_transition;
use propdesk_core::validate_update;

// ============================================================================
// SECTION: Fixtures
// ============================================================================

fn sample_vendor() -> Vendor {
    Vendor {
        id: VendorId::new("v1"),
        name: "Fast Fix Plumbing".to_string(),
        rating: 4.5,
        review_count: 89,
        distance_miles: 1.4,
        estimated_cost_low: 180,
        estimated_cost_high: 300,
        available_slots: vec!["Tomorrow 1-3pm".to_string()],
        phone: "(555) 010-0002".to_string(),
    }
}

// ============================================================================
// SECTION: Transition Table
// ============================================================================

#[test]
fn forward_steps_are_legal() {
    let order = [
        TicketStatus::New,
        TicketStatus::GatheringInfo,
        TicketStatus::Triaged,
        TicketStatus::FindingVendors,
        TicketStatus::AwaitingApproval,
        TicketStatus::Scheduled,
        TicketStatus::Complete,
    ];
    for pair in order.windows(2) {
        assert!(can_transition(pair[0], pair[1]), "{} -> {}", pair[0].as_str(), pair[1].as_str());
    }
}

#[test]
fn backward_and_skipping_moves_are_rejected() {
    assert!(!can_transition(TicketStatus::Scheduled, TicketStatus::AwaitingApproval));
    assert!(!can_transition(TicketStatus::Complete, TicketStatus::Scheduled));
    assert!(!can_transition(TicketStatus::AwaitingApproval, TicketStatus::Complete));
    assert!(!can_transition(TicketStatus::New, TicketStatus::Triaged));
}

#[test]
fn complete_is_terminal() {
    assert!(TicketStatus::Complete.successor().is_none());
}

// ============================================================================
// SECTION: Update Validation
// ============================================================================

#[test]
fn scheduling_requires_vendor_and_slot_together() {
    let vendor_only = TicketUpdate {
        status: Some(TicketStatus::Scheduled),
        selected_vendor: Some(sample_vendor()),
        selected_slot: None,
    };
    assert_eq!(
        validate_update(TicketStatus::AwaitingApproval, &vendor_only),
        Err(LifecycleError::SelectionPairRequired)
    );

    let neither = TicketUpdate {
        status: Some(TicketStatus::Scheduled),
        selected_vendor: None,
        selected_slot: None,
    };
    assert_eq!(
        validate_update(TicketStatus::AwaitingApproval, &neither),
        Err(LifecycleError::ScheduleRequiresSelection)
    );

    let both = TicketUpdate {
        status: Some(TicketStatus::Scheduled),
        selected_vendor: Some(sample_vendor()),
        selected_slot: Some("Tomorrow 1-3pm".to_string()),
    };
    assert_eq!(validate_update(TicketStatus::AwaitingApproval, &both), Ok(()));
}

#[test]
fn selection_outside_scheduling_is_rejected() {
    let update = TicketUpdate {
        status: None,
        selected_vendor: Some(sample_vendor()),
        selected_slot: Some("Tomorrow 1-3pm".to_string()),
    };
    assert_eq!(
        validate_update(TicketStatus::AwaitingApproval, &update),
        Err(LifecycleError::SelectionRequiresScheduling)
    );
}

#[test]
fn completion_is_unconditional_from_scheduled() {
    let update = TicketUpdate {
        status: Some(TicketStatus::Complete),
        selected_vendor: None,
        selected_slot: None,
    };
    assert_eq!(validate_update(TicketStatus::Scheduled, &update), Ok(()));
}

#[test]
fn backward_update_is_rejected_not_clamped() {
    let update = TicketUpdate {
        status: Some(TicketStatus::AwaitingApproval),
        selected_vendor: None,
        selected_slot: None,
    };
    assert_eq!(
        validate_update(TicketStatus::Scheduled, &update),
        Err(LifecycleError::IllegalTransition {
            from: "scheduled",
            to: "awaiting_approval",
        })
    );
}
