// crates/propdesk-core/src/core/lifecycle.rs
// ============================================================================
// Module: PropDesk Ticket Lifecycle
// Description: Transition legality rules for ticket statuses and updates.
// Purpose: Reject illegal status moves at the mutation entry point, never clamp.
// Dependencies: crate::core::{store, ticket}, thiserror
// ============================================================================

//! ## Overview
//! The lifecycle is a fixed forward-only sequence:
//! `new -> gathering_info -> triaged -> finding_vendors -> awaiting_approval
//! -> scheduled -> complete`. A transition is legal only to the immediate
//! successor. Moving to `scheduled` additionally requires a vendor and a time
//! slot supplied in the same mutation. There is no reopen path from
//! `scheduled` back to `awaiting_approval`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::core::store::TicketUpdate;
use crate::core::ticket::TicketStatus;

// ============================================================================
// SECTION: Lifecycle Errors
// ============================================================================

/// Errors raised when an update violates lifecycle rules.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LifecycleError {
    /// Target status is not reachable from the current status.
    #[error("illegal transition: {from} -> {to}")]
    IllegalTransition {
        /// Current status label.
        from: &'static str,
        /// Requested status label.
        to: &'static str,
    },
    /// A vendor or slot was supplied without its counterpart.
    #[error("selected_vendor and selected_slot must be supplied together")]
    SelectionPairRequired,
    /// Vendor/slot selection is only legal while moving to `scheduled`.
    #[error("vendor selection is only legal when moving to scheduled")]
    SelectionRequiresScheduling,
    /// Moving to `scheduled` requires both a vendor and a slot.
    #[error("transition to scheduled requires a vendor and a time slot")]
    ScheduleRequiresSelection,
}

// ============================================================================
// SECTION: Transition Legality
// ============================================================================

/// Returns true when `to` is a legal transition target from `from`.
///
/// Legal moves are exactly the immediate-successor steps of the lifecycle
/// ordering; backward moves and skips are rejected.
#[must_use]
pub fn can_transition(from: TicketStatus, to: TicketStatus) -> bool {
    from.successor() == Some(to)
}

/// Validates a restricted-field update against the current status.
///
/// The update is checked as a whole: status legality, the vendor/slot
/// pairing invariant, and the `scheduled` selection requirement must all
/// hold before the store commits anything.
///
/// # Errors
///
/// Returns [`LifecycleError`] when the update would violate lifecycle rules.
pub fn validate_update(current: TicketStatus, update: &TicketUpdate) -> Result<(), LifecycleError> {
    if let Some(target) = update.status
        && !can_transition(current, target)
    {
        return Err(LifecycleError::IllegalTransition {
            from: current.as_str(),
            to: target.as_str(),
        });
    }
    if update.selected_vendor.is_some() != update.selected_slot.is_some() {
        return Err(LifecycleError::SelectionPairRequired);
    }
    if update.selected_vendor.is_some() && update.status != Some(TicketStatus::Scheduled) {
        return Err(LifecycleError::SelectionRequiresScheduling);
    }
    if update.status == Some(TicketStatus::Scheduled) && update.selected_vendor.is_none() {
        return Err(LifecycleError::ScheduleRequiresSelection);
    }
    Ok(())
}
