// crates/propdesk-core/src/core/mod.rs
// ============================================================================
// Module: PropDesk Core Model
// Description: Identifiers, time, ticket records, lifecycle, and store.
// Purpose: Group the canonical data model modules of PropDesk.
// Dependencies: crate submodules
// ============================================================================

//! ## Overview
//! The core model is split into focused modules: opaque identifiers,
//! caller-supplied timestamps, ticket records and enumerations, lifecycle
//! transition legality, and the keyed ticket store.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod identifiers;
pub mod lifecycle;
pub mod store;
pub mod ticket;
pub mod time;
