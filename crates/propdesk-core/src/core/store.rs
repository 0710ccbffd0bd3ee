// crates/propdesk-core/src/core/store.rs
// ============================================================================
// Module: PropDesk Ticket Store
// Description: Concurrency-safe keyed ticket collection and update merging.
// Purpose: Provide the single source of truth shared by triage and approval paths.
// Dependencies: crate::core::{identifiers, lifecycle, ticket, time}, serde, thiserror
// ============================================================================

//! ## Overview
//! The ticket store is the only shared mutable resource in PropDesk. All
//! operations are atomic at single-record granularity: a concurrent read
//! during an update observes either the pre- or post-image, never a torn
//! write. Updates merge only the fields present in the partial, stamp
//! `updated_at` from the injected clock, and re-validate lifecycle legality
//! before committing.
//!
//! The store is an explicit object constructed once at process start and
//! passed by handle to every consumer; there is no ambient global map.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::cmp::Reverse;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::PoisonError;
use std::sync::RwLock;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::identifiers::PropertyId;
use crate::core::identifiers::TenantId;
use crate::core::identifiers::TicketId;
use crate::core::lifecycle::LifecycleError;
use crate::core::lifecycle::validate_update;
use crate::core::ticket::Ticket;
use crate::core::ticket::TicketStatus;
use crate::core::ticket::Vendor;
use crate::core::time::SharedClock;

// ============================================================================
// SECTION: Store Errors
// ============================================================================

/// Errors returned by ticket store operations.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// A ticket with the same identifier already exists.
    #[error("ticket already exists: {0}")]
    Duplicate(TicketId),
    /// No ticket exists for the identifier.
    #[error("ticket not found: {0}")]
    NotFound(TicketId),
    /// The update violates lifecycle rules.
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),
}

// ============================================================================
// SECTION: Update & Filter Types
// ============================================================================

/// Restricted-field partial update applied by the approval workflow.
///
/// # Invariants
/// - Only `status`, `selected_vendor`, and `selected_slot` are externally
///   mutable; every other ticket field is orchestrator-owned.
/// - Absent fields leave the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TicketUpdate {
    /// Target lifecycle status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TicketStatus>,
    /// Approved vendor; must be paired with `selected_slot`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_vendor: Option<Vendor>,
    /// Approved time slot; must be paired with `selected_vendor`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_slot: Option<String>,
}

impl TicketUpdate {
    /// Returns true when the update carries no fields.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.status.is_none() && self.selected_vendor.is_none() && self.selected_slot.is_none()
    }
}

/// Read-time filter for ticket listings.
///
/// # Invariants
/// - Absent fields match every ticket.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TicketFilter {
    /// Restrict to tickets of one property.
    pub property_id: Option<PropertyId>,
    /// Restrict to tickets of one tenant.
    pub tenant_id: Option<TenantId>,
}

impl TicketFilter {
    /// Returns true when the ticket matches every present field.
    #[must_use]
    pub fn matches(&self, ticket: &Ticket) -> bool {
        self.property_id.as_ref().is_none_or(|id| &ticket.property_id == id)
            && self.tenant_id.as_ref().is_none_or(|id| &ticket.tenant_id == id)
    }
}

// ============================================================================
// SECTION: Store Interface
// ============================================================================

/// Concurrency-safe keyed ticket store.
pub trait TicketStore: Send + Sync {
    /// Inserts a new ticket under its own identifier.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Duplicate`] when the identifier is already
    /// present. Identifier generation should make this unreachable; the
    /// check exists so a collision can never overwrite a record.
    fn create(&self, ticket: Ticket) -> Result<TicketId, StoreError>;

    /// Returns a snapshot of the ticket for the identifier.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] for unknown identifiers.
    fn get(&self, id: &TicketId) -> Result<Ticket, StoreError>;

    /// Merges the partial update into the stored ticket.
    ///
    /// Lifecycle legality is re-validated against the stored status before
    /// committing; `updated_at` is stamped from the store clock.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] for unknown identifiers and
    /// [`StoreError::Lifecycle`] when the update is illegal.
    fn update(&self, id: &TicketId, update: TicketUpdate) -> Result<Ticket, StoreError>;

    /// Returns tickets matching the filter in presentation order.
    ///
    /// Ordering is a read-time projection: `awaiting_approval` first, then
    /// severity (emergency, medium, low), then descending creation time.
    fn list(&self, filter: &TicketFilter) -> Vec<Ticket>;
}

/// Shared ticket store handle.
pub type SharedTicketStore = Arc<dyn TicketStore>;

// ============================================================================
// SECTION: In-Memory Store
// ============================================================================

/// In-memory ticket store keyed by ticket identifier.
///
/// # Invariants
/// - The map lock is held only for map operations, never across awaits.
/// - Records are never deleted during the process lifetime.
pub struct InMemoryTicketStore {
    /// Ticket records keyed by identifier.
    tickets: RwLock<BTreeMap<TicketId, Ticket>>,
    /// Clock used to stamp `updated_at` on mutation.
    clock: SharedClock,
}

impl InMemoryTicketStore {
    /// Creates an empty store stamping mutations with the given clock.
    #[must_use]
    pub fn new(clock: SharedClock) -> Self {
        Self {
            tickets: RwLock::new(BTreeMap::new()),
            clock,
        }
    }

    /// Creates a store pre-populated with seed tickets.
    ///
    /// Seeds with duplicate identifiers are ignored after the first.
    #[must_use]
    pub fn with_seed(clock: SharedClock, seed: Vec<Ticket>) -> Self {
        let store = Self::new(clock);
        {
            let mut tickets = store.tickets.write().unwrap_or_else(PoisonError::into_inner);
            for ticket in seed {
                tickets.entry(ticket.id.clone()).or_insert(ticket);
            }
        }
        store
    }
}

impl TicketStore for InMemoryTicketStore {
    fn create(&self, ticket: Ticket) -> Result<TicketId, StoreError> {
        let mut tickets = self.tickets.write().unwrap_or_else(PoisonError::into_inner);
        if tickets.contains_key(&ticket.id) {
            return Err(StoreError::Duplicate(ticket.id));
        }
        let id = ticket.id.clone();
        tickets.insert(id.clone(), ticket);
        Ok(id)
    }

    fn get(&self, id: &TicketId) -> Result<Ticket, StoreError> {
        let tickets = self.tickets.read().unwrap_or_else(PoisonError::into_inner);
        tickets.get(id).cloned().ok_or_else(|| StoreError::NotFound(id.clone()))
    }

    fn update(&self, id: &TicketId, update: TicketUpdate) -> Result<Ticket, StoreError> {
        let stamp = self.clock.now();
        let mut tickets = self.tickets.write().unwrap_or_else(PoisonError::into_inner);
        let ticket = tickets.get_mut(id).ok_or_else(|| StoreError::NotFound(id.clone()))?;
        validate_update(ticket.status, &update)?;
        if let Some(status) = update.status {
            ticket.status = status;
        }
        if let Some(vendor) = update.selected_vendor {
            ticket.selected_vendor = Some(vendor);
        }
        if let Some(slot) = update.selected_slot {
            ticket.selected_slot = Some(slot);
        }
        ticket.updated_at = stamp;
        Ok(ticket.clone())
    }

    fn list(&self, filter: &TicketFilter) -> Vec<Ticket> {
        let tickets = self.tickets.read().unwrap_or_else(PoisonError::into_inner);
        let mut matched: Vec<Ticket> =
            tickets.values().filter(|ticket| filter.matches(ticket)).cloned().collect();
        matched.sort_by_key(|ticket| {
            (
                ticket.status != TicketStatus::AwaitingApproval,
                ticket.urgency.rank(),
                Reverse(ticket.created_at),
            )
        });
        matched
    }
}
