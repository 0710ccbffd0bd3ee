// crates/propdesk-server/src/vendors.rs
// ============================================================================
// Module: Static Vendor Directory
// Description: Deterministic per-trade vendor candidate tables.
// Purpose: Provide pure vendor lookups for triage and the vendors route.
// Dependencies: propdesk-core
// ============================================================================

//! ## Overview
//! The demo vendor directory is a pure function of issue type: each trade
//! maps to three named candidates with fixed ratings, distances, cost
//! ranges, and slot lists. The zip argument is accepted for interface
//! stability but does not influence results. Lookups never return an empty
//! list, so a created ticket always carries candidates for approval.

// ============================================================================
// SECTION: Imports
// ============================================================================

use propdesk_core::IssueType;
use propdesk_core::Vendor;
use propdesk_core::VendorDirectory;
use propdesk_core::VendorId;

// ============================================================================
// SECTION: Candidate Tables
// ============================================================================

/// Vendor names per trade, best-ranked first.
const fn names_for(issue_type: IssueType) -> [&'static str; 3] {
    match issue_type {
        IssueType::Plumbing => ["Mike's Plumbing", "Fast Fix Plumbing", "Pro Pipe Services"],
        IssueType::Electrical => ["Spark Electric Co", "BrightWire Electrical", "PowerUp Electric"],
        IssueType::Hvac => ["CoolBreeze HVAC", "AirFlow Solutions", "TempRight Heating & Air"],
        IssueType::Appliance => ["AppliancePro Repair", "FixIt Appliances", "HomeServe Appliance"],
        IssueType::Structural => ["SolidWall Contractors", "FoundationFirst", "BuildRight Repairs"],
        IssueType::Pest => {
            ["BugBusters Pest Control", "SafeHome Exterminators", "GreenShield Pest"]
        }
        IssueType::Other => ["HandyPro Services", "AllFix Maintenance", "QuickRepair Co"],
    }
}

/// Ratings by rank.
const RATINGS: [f64; 3] = [4.8, 4.5, 4.2];

/// Review counts by rank.
const REVIEW_COUNTS: [u32; 3] = [127, 89, 44];

/// Distances in miles by rank.
const DISTANCES_MILES: [f64; 3] = [0.8, 1.4, 2.0];

/// Low cost estimates by rank.
const COSTS_LOW: [u32; 3] = [120, 150, 180];

/// High cost estimates by rank.
const COSTS_HIGH: [u32; 3] = [200, 250, 300];

/// Available slot lists by rank.
const SLOTS: [&[&str]; 3] = [
    &["Tomorrow 9-11am", "Tomorrow 2-4pm", "Wednesday 10am-12pm"],
    &["Tomorrow 1-3pm", "Thursday 9-11am"],
    &["Wednesday 2-4pm", "Friday 9-11am"],
];

/// Phone numbers by rank.
const PHONES: [&str; 3] = ["(555) 010-0001", "(555) 010-0002", "(555) 010-0003"];

// ============================================================================
// SECTION: Directory
// ============================================================================

/// Pure, deterministic vendor directory for the demo deployment.
///
/// # Invariants
/// - `search` always returns exactly three candidates.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticVendorDirectory;

impl VendorDirectory for StaticVendorDirectory {
    fn search(&self, issue_type: IssueType, _zip: &str) -> Vec<Vendor> {
        let names = names_for(issue_type);
        (0..3)
            .map(|rank| Vendor {
                id: VendorId::new(format!("v{}", rank + 1)),
                name: names[rank].to_string(),
                rating: RATINGS[rank],
                review_count: REVIEW_COUNTS[rank],
                distance_miles: DISTANCES_MILES[rank],
                estimated_cost_low: COSTS_LOW[rank],
                estimated_cost_high: COSTS_HIGH[rank],
                available_slots: SLOTS[rank].iter().map(|slot| (*slot).to_string()).collect(),
                phone: PHONES[rank].to_string(),
            })
            .collect()
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
