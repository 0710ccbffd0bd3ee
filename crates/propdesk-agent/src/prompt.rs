// crates/propdesk-agent/src/prompt.rs
// ============================================================================
// Module: System Prompt Builder
// Description: Mandatory-workflow system instructions for the triage agent.
// Purpose: Bind the reasoning service to the classify-then-create workflow.
// Dependencies: propdesk-core
// ============================================================================

//! ## Overview
//! The system prompt carries the property and reporter context plus the
//! workflow contract: classify before creating, never stop after
//! classification alone, and keep following up until a ticket is created or
//! the turn legitimately ends.

// ============================================================================
// SECTION: Imports
// ============================================================================

use propdesk_core::Property;
use propdesk_core::Tenant;

// ============================================================================
// SECTION: Prompt Builder
// ============================================================================

/// Builds the system instructions for one triage session.
///
/// When the tenant could not be resolved from the session, placeholder
/// context is emitted and the model's advisory identity fields are used at
/// creation instead.
#[must_use]
pub fn build_system_prompt(property: &Property, tenant: Option<&Tenant>) -> String {
    let (tenant_name, tenant_unit, tenant_id) = tenant.map_or(
        ("unknown tenant".to_string(), "unknown".to_string(), "unknown".to_string()),
        |tenant| (tenant.name.clone(), tenant.unit.clone(), tenant.id.to_string()),
    );
    format!(
        "You are PropDesk, an AI property manager assistant helping tenants at {name} in {city}, {state}.\n\
         You are speaking with: {tenant_name}, Unit {tenant_unit}.\n\
         \n\
         YOUR WORKFLOW - follow this exactly:\n\
         1. Read the tenant's message\n\
         2. If you are missing critical info to classify the issue, call classify_issue with needs_more_info: true and follow_up_question set\n\
         3. If you have enough info, call classify_issue with needs_more_info: false, then immediately call create_ticket\n\
         4. After create_ticket succeeds, tell the tenant their request was received and a repair will be scheduled\n\
         \n\
         COMPLETION REQUIREMENT: The job is NOT done until create_ticket has been called and returned a ticket id.\n\
         Do NOT stop after classify_issue. Do NOT stop after asking a follow-up question without calling the tool.\n\
         \n\
         URGENCY RULES:\n\
         - emergency: flooding, gas smell, no heat (winter), security breach -> act immediately\n\
         - medium: active leaks, broken HVAC, broken appliance -> within 48 hours\n\
         - low: cosmetic damage, minor issues -> within 1 week\n\
         \n\
         CONTEXT for create_ticket:\n\
         - property_id: {property_id}\n\
         - tenant_id: {tenant_id}\n\
         - tenant_name: {tenant_name}\n\
         - unit: {tenant_unit}\n\
         \n\
         TONE: Warm, concise, professional. Max 2 sentences per response to the tenant.",
        name = property.name,
        city = property.city,
        state = property.state,
        property_id = property.id,
    )
}
