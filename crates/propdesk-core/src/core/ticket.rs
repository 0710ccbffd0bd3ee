// crates/propdesk-core/src/core/ticket.rs
// ============================================================================
// Module: PropDesk Ticket Records
// Description: Maintenance ticket records, enumerations, and party directory types.
// Purpose: Define the central WorkRecord entity and its classification model.
// Dependencies: crate::core::{identifiers, time}, serde
// ============================================================================

//! ## Overview
//! The [`Ticket`] record is the structured unit of work produced by a triage
//! conversation. Classification enumerations are closed; unknown wire values
//! are rejected at deserialization. Conversation history is append-only and
//! never reordered.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::PropertyId;
use crate::core::identifiers::TenantId;
use crate::core::identifiers::TicketId;
use crate::core::identifiers::VendorId;
use crate::core::time::Timestamp;

// ============================================================================
// SECTION: Classification Enumerations
// ============================================================================

/// Closed enumeration of maintenance issue categories.
///
/// # Invariants
/// - Variants are stable for serialization and tool-contract matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueType {
    /// Water supply, drains, and fixtures.
    Plumbing,
    /// Wiring, outlets, and lighting.
    Electrical,
    /// Heating, ventilation, and air conditioning.
    Hvac,
    /// In-unit appliances.
    Appliance,
    /// Walls, floors, roofs, and foundations.
    Structural,
    /// Insect or rodent infestations.
    Pest,
    /// Anything that fits no other category.
    Other,
}

impl IssueType {
    /// Returns the stable wire label for the issue type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Plumbing => "plumbing",
            Self::Electrical => "electrical",
            Self::Hvac => "hvac",
            Self::Appliance => "appliance",
            Self::Structural => "structural",
            Self::Pest => "pest",
            Self::Other => "other",
        }
    }

    /// Parses a wire label, returning `None` for unknown values.
    #[must_use]
    pub fn parse(label: &str) -> Option<Self> {
        match label {
            "plumbing" => Some(Self::Plumbing),
            "electrical" => Some(Self::Electrical),
            "hvac" => Some(Self::Hvac),
            "appliance" => Some(Self::Appliance),
            "structural" => Some(Self::Structural),
            "pest" => Some(Self::Pest),
            "other" => Some(Self::Other),
            _ => None,
        }
    }
}

/// Closed enumeration of issue severity.
///
/// # Invariants
/// - Variants are stable for serialization and tool-contract matching.
/// - [`Urgency::rank`] orders emergency before medium before low.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    /// Flooding, gas smell, no heat in winter; act immediately.
    Emergency,
    /// Active leaks or broken appliances; within 48 hours.
    Medium,
    /// Cosmetic or minor issues; within a week.
    Low,
}

impl Urgency {
    /// Returns the stable wire label for the urgency.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Emergency => "emergency",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }

    /// Returns the sort rank; lower ranks sort first in ticket lists.
    #[must_use]
    pub const fn rank(self) -> u8 {
        match self {
            Self::Emergency => 0,
            Self::Medium => 1,
            Self::Low => 2,
        }
    }
}

// ============================================================================
// SECTION: Lifecycle Status
// ============================================================================

/// Ticket lifecycle status, ordered from creation to completion.
///
/// # Invariants
/// - Variants are stable for serialization and contract matching.
/// - The first four statuses are pre-creation conversation phases; persisted
///   tickets are born at `awaiting_approval`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    /// Report received, nothing classified yet.
    New,
    /// Agent is asking follow-up questions.
    GatheringInfo,
    /// Issue classified with type and urgency.
    Triaged,
    /// Vendor candidates are being collected.
    FindingVendors,
    /// Ticket persisted; landlord must pick a vendor and slot.
    AwaitingApproval,
    /// Vendor and time slot confirmed.
    Scheduled,
    /// Work declared finished by the landlord.
    Complete,
}

impl TicketStatus {
    /// Returns the stable wire label for the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::GatheringInfo => "gathering_info",
            Self::Triaged => "triaged",
            Self::FindingVendors => "finding_vendors",
            Self::AwaitingApproval => "awaiting_approval",
            Self::Scheduled => "scheduled",
            Self::Complete => "complete",
        }
    }

    /// Returns the immediate successor status, or `None` at the terminal state.
    #[must_use]
    pub const fn successor(self) -> Option<Self> {
        match self {
            Self::New => Some(Self::GatheringInfo),
            Self::GatheringInfo => Some(Self::Triaged),
            Self::Triaged => Some(Self::FindingVendors),
            Self::FindingVendors => Some(Self::AwaitingApproval),
            Self::AwaitingApproval => Some(Self::Scheduled),
            Self::Scheduled => Some(Self::Complete),
            Self::Complete => None,
        }
    }
}

// ============================================================================
// SECTION: Conversation History
// ============================================================================

/// Speaker role within a ticket conversation.
///
/// # Invariants
/// - Variants are stable for serialization; `ai` is accepted as a legacy
///   alias for the agent role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpeakerRole {
    /// The reporting tenant.
    Tenant,
    /// The automated triage agent.
    #[serde(alias = "ai")]
    Agent,
}

/// One conversation entry attached to a ticket.
///
/// # Invariants
/// - History is append-only; entries are never reordered or removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Speaker role for this entry.
    pub role: SpeakerRole,
    /// Message text.
    pub content: String,
    /// Time the message was recorded.
    pub timestamp: Timestamp,
}

// ============================================================================
// SECTION: Vendor Candidates
// ============================================================================

/// Ranked service-provider candidate attached to a ticket.
///
/// # Invariants
/// - Immutable once attached to a ticket; re-search is out of scope.
/// - `rating` is bounded 0..=5 with one decimal of precision.
/// - `estimated_cost_low <= estimated_cost_high`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vendor {
    /// Vendor identifier.
    pub id: VendorId,
    /// Display name.
    pub name: String,
    /// Review rating, 0..=5 with one decimal.
    pub rating: f64,
    /// Number of reviews backing the rating.
    pub review_count: u32,
    /// Distance from the property in miles.
    pub distance_miles: f64,
    /// Low end of the estimated cost range.
    pub estimated_cost_low: u32,
    /// High end of the estimated cost range.
    pub estimated_cost_high: u32,
    /// Offered time slots as human-readable labels, ordered.
    pub available_slots: Vec<String>,
    /// Contact phone string.
    pub phone: String,
}

// ============================================================================
// SECTION: Ticket Record
// ============================================================================

/// The central maintenance work record.
///
/// # Invariants
/// - `id` is unique across the store and immutable.
/// - `status` only moves forward through the lifecycle ordering.
/// - `selected_vendor` and `selected_slot` are present together from
///   `scheduled` onward, or absent together.
/// - `messages` length only grows; `vendors` is immutable once populated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    /// Ticket identifier.
    pub id: TicketId,
    /// Originating property.
    pub property_id: PropertyId,
    /// Reporting tenant.
    pub tenant_id: TenantId,
    /// Reporter display name.
    pub tenant_name: String,
    /// Unit or location label.
    pub unit: String,
    /// Classified issue category.
    pub issue_type: IssueType,
    /// Classified severity.
    pub urgency: Urgency,
    /// One-line agent-written summary for the landlord.
    pub summary: String,
    /// Tenant's original report text, verbatim.
    pub raw_message: String,
    /// Current lifecycle status.
    pub status: TicketStatus,
    /// Conversation history, append-only.
    pub messages: Vec<ChatMessage>,
    /// Ranked vendor candidates, populated at creation.
    pub vendors: Vec<Vendor>,
    /// Approved vendor, present from `scheduled` onward.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_vendor: Option<Vendor>,
    /// Approved time slot, present from `scheduled` onward.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_slot: Option<String>,
    /// Creation time, set once.
    pub created_at: Timestamp,
    /// Last mutation time, stamped by the store.
    pub updated_at: Timestamp,
}

// ============================================================================
// SECTION: Party Directory
// ============================================================================

/// Property directory record.
///
/// # Invariants
/// - `slug` is unique across the directory and used in tenant-facing URLs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    /// Property identifier.
    pub id: PropertyId,
    /// Short display name.
    pub name: String,
    /// Street address.
    pub address: String,
    /// City.
    pub city: String,
    /// State or region code.
    pub state: String,
    /// Postal code.
    pub zip: String,
    /// URL slug for tenant chat routing.
    pub slug: String,
}

/// Tenant directory record.
///
/// # Invariants
/// - `property_id` refers to an existing property in the directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tenant {
    /// Tenant identifier.
    pub id: TenantId,
    /// Display name.
    pub name: String,
    /// Unit label within the property.
    pub unit: String,
    /// Property the tenant occupies.
    pub property_id: PropertyId,
}
