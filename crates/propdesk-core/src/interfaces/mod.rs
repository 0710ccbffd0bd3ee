// crates/propdesk-core/src/interfaces/mod.rs
// ============================================================================
// Module: PropDesk Interfaces
// Description: Backend-agnostic interfaces for external collaborators.
// Purpose: Define the contract surfaces the core consumes without backend detail.
// Dependencies: crate::core
// ============================================================================

//! ## Overview
//! Interfaces define how PropDesk integrates with external collaborators
//! without embedding backend-specific details. Vendor lookup is modeled as a
//! pure function from issue category and location to a ranked candidate
//! list; implementations always return a non-empty list.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use crate::core::ticket::IssueType;
use crate::core::ticket::Vendor;

// ============================================================================
// SECTION: Vendor Directory
// ============================================================================

/// Vendor lookup collaborator.
///
/// Implementations are pure and synchronous with no modeled failure mode;
/// a lookup always yields at least one candidate.
pub trait VendorDirectory: Send + Sync {
    /// Returns ranked vendor candidates for the issue category near the
    /// given postal code.
    fn search(&self, issue_type: IssueType, zip: &str) -> Vec<Vendor>;
}

/// Shared vendor directory handle.
pub type SharedVendorDirectory = Arc<dyn VendorDirectory>;
