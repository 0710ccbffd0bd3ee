// crates/propdesk-core/src/lib.rs
// ============================================================================
// Module: PropDesk Core
// Description: Data model, lifecycle state machine, and ticket store.
// Purpose: Provide the single source of truth shared by the triage agent and server.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! PropDesk Core defines the maintenance-ticket data model, the forward-only
//! ticket lifecycle, and the concurrency-safe ticket store consumed by both
//! the triage orchestrator and the approval workflow. The core holds no I/O:
//! timestamps are supplied by an injected [`Clock`] and vendor lookup is an
//! interface implemented by hosts.
//!
//! Invariants:
//! - Ticket identifiers are unique for the process lifetime.
//! - Status transitions are forward-only; illegal targets are rejected, never clamped.
//! - `selected_vendor` and `selected_slot` are set together or not at all.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;

// ============================================================================
// SECTION: Re-exports
// ============================================================================

pub use crate::core::identifiers::PropertyId;
pub use crate::core::identifiers::TenantId;
pub use crate::core::identifiers::TicketId;
pub use crate::core::identifiers::VendorId;
pub use crate::core::lifecycle::LifecycleError;
pub use crate::core::lifecycle::validate_update;
pub use crate::core::store::InMemoryTicketStore;
pub use crate::core::store::SharedTicketStore;
pub use crate::core::store::StoreError;
pub use crate::core::store::TicketFilter;
pub use crate::core::store::TicketStore;
pub use crate::core::store::TicketUpdate;
pub use crate::core::ticket::ChatMessage;
pub use crate::core::ticket::IssueType;
pub use crate::core::ticket::Property;
pub use crate::core::ticket::SpeakerRole;
pub use crate::core::ticket::Tenant;
pub use crate::core::ticket::Ticket;
pub use crate::core::ticket::TicketStatus;
pub use crate::core::ticket::Urgency;
pub use crate::core::ticket::Vendor;
pub use crate::core::time::Clock;
pub use crate::core::time::FixedClock;
pub use crate::core::time::SharedClock;
pub use crate::core::time::SystemClock;
pub use crate::core::time::Timestamp;
pub use crate::interfaces::SharedVendorDirectory;
pub use crate::interfaces::VendorDirectory;
