// crates/propdesk-server/src/seed.rs
// ============================================================================
// Module: Demo Seed Data
// Description: Fixed property and tenant directory plus starter tickets.
// Purpose: Populate the store so the dashboard is never empty on first run.
// Dependencies: propdesk-core
// ============================================================================

//! ## Overview
//! The demo deployment ships a fixed directory of three properties and two
//! tenants, one completed historical ticket, and one walkthrough ticket
//! parked at `awaiting_approval` with vendor candidates attached. Seed
//! timestamps are offsets from process start so relative ages stay
//! plausible.

// ============================================================================
// SECTION: Imports
// ============================================================================

use propdesk_core::ChatMessage;
use propdesk_core::IssueType;
use propdesk_core::Property;
use propdesk_core::PropertyId;
use propdesk_core::SpeakerRole;
use propdesk_core::Tenant;
use propdesk_core::TenantId;
use propdesk_core::Ticket;
use propdesk_core::TicketId;
use propdesk_core::TicketStatus;
use propdesk_core::Timestamp;
use propdesk_core::Urgency;
use propdesk_core::Vendor;
use propdesk_core::VendorId;

// ============================================================================
// SECTION: Time Offsets
// ============================================================================

/// One minute in milliseconds.
const MINUTE_MS: i64 = 60 * 1_000;

/// One day in milliseconds.
const DAY_MS: i64 = 24 * 60 * MINUTE_MS;

// ============================================================================
// SECTION: Directory
// ============================================================================

/// Returns the fixed property directory.
#[must_use]
pub fn properties() -> Vec<Property> {
    vec![
        Property {
            id: PropertyId::new("prop-1"),
            name: "123 Oak St".to_string(),
            address: "123 Oak Street".to_string(),
            city: "Portland".to_string(),
            state: "OR".to_string(),
            zip: "97201".to_string(),
            slug: "portland-oak-st".to_string(),
        },
        Property {
            id: PropertyId::new("prop-2"),
            name: "456 Maple Ave".to_string(),
            address: "456 Maple Avenue".to_string(),
            city: "Austin".to_string(),
            state: "TX".to_string(),
            zip: "78701".to_string(),
            slug: "austin-maple-ave".to_string(),
        },
        Property {
            id: PropertyId::new("prop-3"),
            name: "789 Pine Rd".to_string(),
            address: "789 Pine Road".to_string(),
            city: "Chicago".to_string(),
            state: "IL".to_string(),
            zip: "60601".to_string(),
            slug: "chicago-pine-rd".to_string(),
        },
    ]
}

/// Returns the fixed tenant directory.
#[must_use]
pub fn tenants() -> Vec<Tenant> {
    vec![
        Tenant {
            id: TenantId::new("tenant-1"),
            name: "Maria Lopez".to_string(),
            unit: "2B".to_string(),
            property_id: PropertyId::new("prop-1"),
        },
        Tenant {
            id: TenantId::new("tenant-2"),
            name: "James Kim".to_string(),
            unit: "3C".to_string(),
            property_id: PropertyId::new("prop-3"),
        },
    ]
}

/// Looks up a property by its slug.
#[must_use]
pub fn property_by_slug(slug: &str) -> Option<Property> {
    properties().into_iter().find(|property| property.slug == slug)
}

/// Looks up the resident tenant for a property.
#[must_use]
pub fn tenant_for_property(property_id: &PropertyId) -> Option<Tenant> {
    tenants().into_iter().find(|tenant| &tenant.property_id == property_id)
}

// ============================================================================
// SECTION: Seed Tickets
// ============================================================================

/// Returns the starter tickets, stamped relative to `now`.
#[must_use]
pub fn seed_tickets(now: Timestamp) -> Vec<Ticket> {
    vec![completed_hvac_ticket(now), awaiting_approval_demo_ticket(now)]
}

/// Historical completed ticket so the dashboard shows a finished repair.
fn completed_hvac_ticket(now: Timestamp) -> Ticket {
    Ticket {
        id: TicketId::new("ticket-seed-1"),
        property_id: PropertyId::new("prop-2"),
        tenant_id: TenantId::new("tenant-seed"),
        tenant_name: "Derek Walsh".to_string(),
        unit: "1B".to_string(),
        issue_type: IssueType::Hvac,
        urgency: Urgency::Low,
        summary: "AC filter replacement requested".to_string(),
        raw_message: "Can someone replace the AC filter? It looks really dirty.".to_string(),
        status: TicketStatus::Complete,
        messages: Vec::new(),
        vendors: Vec::new(),
        selected_vendor: None,
        selected_slot: None,
        created_at: now.offset_millis(-3 * DAY_MS),
        updated_at: now.offset_millis(-DAY_MS),
    }
}

/// Walkthrough ticket parked at `awaiting_approval` with three plumbers.
fn awaiting_approval_demo_ticket(now: Timestamp) -> Ticket {
    let messages = vec![
        ChatMessage {
            role: SpeakerRole::Tenant,
            content: "My kitchen sink is leaking under the cabinet. Water is pooling.".to_string(),
            timestamp: now.offset_millis(-25 * MINUTE_MS),
        },
        ChatMessage {
            role: SpeakerRole::Agent,
            content: "I'm sorry to hear that. Is water actively dripping right now, or has it \
                      pooled and stopped?"
                .to_string(),
            timestamp: now.offset_millis(-24 * MINUTE_MS),
        },
        ChatMessage {
            role: SpeakerRole::Tenant,
            content: "It's still dripping slowly. I put a bucket under it.".to_string(),
            timestamp: now.offset_millis(-22 * MINUTE_MS),
        },
        ChatMessage {
            role: SpeakerRole::Agent,
            content: "Got it. I've created a repair ticket and found 3 plumbers available \
                      nearby. Your landlord is reviewing the options now."
                .to_string(),
            timestamp: now.offset_millis(-21 * MINUTE_MS),
        },
    ];
    Ticket {
        id: TicketId::new("demo-ticket-1"),
        property_id: PropertyId::new("prop-1"),
        tenant_id: TenantId::new("tenant-1"),
        tenant_name: "Maria Lopez".to_string(),
        unit: "2B".to_string(),
        issue_type: IssueType::Plumbing,
        urgency: Urgency::Medium,
        summary: "Kitchen sink leaking under cabinet. Water dripping, bucket in place."
            .to_string(),
        raw_message: "My kitchen sink is leaking under the cabinet. Water is pooling.".to_string(),
        status: TicketStatus::AwaitingApproval,
        messages,
        vendors: demo_plumbers(),
        selected_vendor: None,
        selected_slot: None,
        created_at: now.offset_millis(-25 * MINUTE_MS),
        updated_at: now.offset_millis(-21 * MINUTE_MS),
    }
}

/// The three plumber candidates attached to the walkthrough ticket.
fn demo_plumbers() -> Vec<Vendor> {
    vec![
        Vendor {
            id: VendorId::new("v1"),
            name: "Mike's Plumbing".to_string(),
            rating: 4.8,
            review_count: 127,
            distance_miles: 0.8,
            estimated_cost_low: 150,
            estimated_cost_high: 250,
            available_slots: vec![
                "Tomorrow 9-11am".to_string(),
                "Tomorrow 2-4pm".to_string(),
                "Wednesday 10am-12pm".to_string(),
            ],
            phone: "(503) 555-0101".to_string(),
        },
        Vendor {
            id: VendorId::new("v2"),
            name: "Fast Fix Plumbing".to_string(),
            rating: 4.5,
            review_count: 89,
            distance_miles: 1.4,
            estimated_cost_low: 180,
            estimated_cost_high: 300,
            available_slots: vec!["Tomorrow 1-3pm".to_string(), "Thursday 9-11am".to_string()],
            phone: "(503) 555-0202".to_string(),
        },
        Vendor {
            id: VendorId::new("v3"),
            name: "Portland Pro Services".to_string(),
            rating: 4.3,
            review_count: 44,
            distance_miles: 2.1,
            estimated_cost_low: 120,
            estimated_cost_high: 200,
            available_slots: vec!["Wednesday 2-4pm".to_string(), "Friday 9-11am".to_string()],
            phone: "(503) 555-0303".to_string(),
        },
    ]
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::expect_used,
        clippy::unwrap_used,
        clippy::panic,
        reason = "Test-only assertions favor direct unwrap/expect for clarity."
    )]

    use super::*;

    const NOW: Timestamp = Timestamp::from_unix_millis(1_700_000_000_000);

    #[test]
    fn directory_slugs_resolve() {
        assert_eq!(property_by_slug("portland-oak-st").expect("prop").id, PropertyId::new("prop-1"));
        assert_eq!(property_by_slug("chicago-pine-rd").expect("prop").id, PropertyId::new("prop-3"));
        assert!(property_by_slug("nowhere").is_none());
    }

    #[test]
    fn tenants_map_to_their_properties() {
        let maria = tenant_for_property(&PropertyId::new("prop-1")).expect("tenant");
        assert_eq!(maria.id, TenantId::new("tenant-1"));
        assert!(tenant_for_property(&PropertyId::new("prop-2")).is_none());
    }

    #[test]
    fn demo_ticket_is_ready_for_approval() {
        let tickets = seed_tickets(NOW);
        let demo = tickets
            .iter()
            .find(|ticket| ticket.id == TicketId::new("demo-ticket-1"))
            .expect("demo ticket");
        assert_eq!(demo.status, TicketStatus::AwaitingApproval);
        assert_eq!(demo.vendors.len(), 3);
        assert_eq!(demo.messages.len(), 4);
        assert!(demo.created_at < NOW);
        assert!(demo.created_at < demo.updated_at);
    }

    #[test]
    fn seed_ids_are_unique() {
        let tickets = seed_tickets(NOW);
        assert_eq!(tickets.len(), 2);
        assert_ne!(tickets[0].id, tickets[1].id);
    }
}
