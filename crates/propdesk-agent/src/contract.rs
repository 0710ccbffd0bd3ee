// crates/propdesk-agent/src/contract.rs
// ============================================================================
// Module: Triage Tool Catalog & Contract
// Description: Callable tool definitions with strict input validation.
// Purpose: Publish tool schemas to the reasoning service and validate inputs.
// Dependencies: propdesk-core, jsonschema, serde, serde_json
// ============================================================================

//! ## Overview
//! Two tools are exposed to the reasoning service: `classify_issue` (a pure
//! classification signal) and `create_ticket` (the record-creation trigger).
//! Raw tool input is validated against the published JSON Schema before
//! typed deserialization, so a malformed invocation is reported as a
//! recoverable contract violation and fed back into the conversation rather
//! than aborting the session.

// ============================================================================
// SECTION: Imports
// ============================================================================

use jsonschema::Validator;
use serde::Deserialize;
use serde_json::Value;
use serde_json::json;
use thiserror::Error;

use propdesk_core::IssueType;
use propdesk_core::Urgency;

// ============================================================================
// SECTION: Tool Names
// ============================================================================

/// Cataloged tool operations the reasoning service may invoke.
///
/// # Invariants
/// - Variants are stable for wire matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolName {
    /// Pure classification signal, no store mutation.
    ClassifyIssue,
    /// Record-creation trigger.
    CreateTicket,
}

impl ToolName {
    /// Returns the stable wire name for the tool.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ClassifyIssue => "classify_issue",
            Self::CreateTicket => "create_ticket",
        }
    }

    /// Parses a wire name, returning `None` for uncataloged tools.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "classify_issue" => Some(Self::ClassifyIssue),
            "create_ticket" => Some(Self::CreateTicket),
            _ => None,
        }
    }
}

// ============================================================================
// SECTION: Tool Errors
// ============================================================================

/// Errors raised while validating or executing a tool invocation.
///
/// # Invariants
/// - Every variant is recoverable: it is fed back to the reasoning service
///   as a failed tool result, never raised as a fatal session error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ToolError {
    /// Input violates the tool's contract.
    #[error("contract violation: {0}")]
    Contract(String),
    /// The reasoning service requested a tool outside the catalog.
    #[error("unknown tool: {0}")]
    UnknownTool(String),
    /// Ticket creation could not be independently verified.
    #[error("ticket write could not be verified: {0}")]
    StoreWrite(String),
}

// ============================================================================
// SECTION: Typed Inputs
// ============================================================================

/// Validated input for `classify_issue`.
///
/// # Invariants
/// - `needs_more_info == true` implies `follow_up_question` is present and
///   non-empty (enforced by [`ClassifyIssueInput::from_value`]).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClassifyIssueInput {
    /// Classified issue category.
    pub issue_type: IssueType,
    /// Classified severity.
    pub urgency: Urgency,
    /// One-sentence summary for the landlord.
    pub summary: String,
    /// True when critical information is still missing.
    pub needs_more_info: bool,
    /// The single most important question to ask, when more info is needed.
    #[serde(default)]
    pub follow_up_question: Option<String>,
}

impl ClassifyIssueInput {
    /// Parses and semantically validates a raw tool input value.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::Contract`] when deserialization fails or a
    /// follow-up is requested without a question.
    pub fn from_value(input: &Value) -> Result<Self, ToolError> {
        let parsed: Self = serde_json::from_value(input.clone())
            .map_err(|err| ToolError::Contract(format!("classify_issue: {err}")))?;
        if parsed.needs_more_info
            && parsed.follow_up_question.as_deref().is_none_or(|question| question.trim().is_empty())
        {
            return Err(ToolError::Contract(
                "classify_issue: needs_more_info=true requires follow_up_question".to_string(),
            ));
        }
        Ok(parsed)
    }
}

/// Validated input for `create_ticket`.
///
/// # Invariants
/// - `property_id`/`tenant_id` are advisory; the orchestrator re-derives
///   identity from the session context and falls back to these values only
///   when context is absent.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreateTicketInput {
    /// Classified issue category.
    pub issue_type: IssueType,
    /// Classified severity.
    pub urgency: Urgency,
    /// One-sentence summary for the landlord.
    pub summary: String,
    /// The tenant's original message, verbatim.
    pub raw_message: String,
    /// Advisory originating property.
    pub property_id: String,
    /// Advisory reporting tenant.
    pub tenant_id: String,
    /// Reporter display name.
    pub tenant_name: String,
    /// Unit or location label.
    pub unit: String,
}

impl CreateTicketInput {
    /// Parses a raw tool input value.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::Contract`] when deserialization fails.
    pub fn from_value(input: &Value) -> Result<Self, ToolError> {
        serde_json::from_value(input.clone())
            .map_err(|err| ToolError::Contract(format!("create_ticket: {err}")))
    }
}

// ============================================================================
// SECTION: Tool Specifications
// ============================================================================

/// Published tool definition: name, description, and input schema.
///
/// # Invariants
/// - `input_schema` is the exact schema sent to the reasoning service and
///   used for pre-deserialization validation.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ToolSpec {
    /// Wire name of the tool.
    pub name: &'static str,
    /// Model-facing description of when to call the tool.
    pub description: &'static str,
    /// JSON Schema for the tool input.
    pub input_schema: Value,
}

/// One catalog entry pairing a spec with its compiled validator.
struct ToolEntry {
    /// Cataloged tool name.
    name: ToolName,
    /// Published specification.
    spec: ToolSpec,
    /// Compiled schema validator.
    validator: Validator,
}

/// Fixed catalog of callable operations.
///
/// # Invariants
/// - The catalog is immutable after construction; validators are compiled
///   once and reused for every invocation.
pub struct ToolCatalog {
    /// Catalog entries in publication order.
    entries: Vec<ToolEntry>,
}

/// Errors raised while building the catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// A built-in schema failed to compile.
    #[error("tool schema failed to compile: {0}")]
    Schema(String),
}

impl ToolCatalog {
    /// Builds the standard two-tool triage catalog.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Schema`] when a built-in schema fails to
    /// compile; this indicates a programming error, not bad runtime input.
    pub fn standard() -> Result<Self, CatalogError> {
        let entries = vec![
            Self::entry(ToolName::ClassifyIssue, CLASSIFY_ISSUE_DESCRIPTION, classify_issue_schema())?,
            Self::entry(ToolName::CreateTicket, CREATE_TICKET_DESCRIPTION, create_ticket_schema())?,
        ];
        Ok(Self {
            entries,
        })
    }

    /// Builds one catalog entry with a compiled validator.
    fn entry(
        name: ToolName,
        description: &'static str,
        schema: Value,
    ) -> Result<ToolEntry, CatalogError> {
        let validator = jsonschema::validator_for(&schema)
            .map_err(|err| CatalogError::Schema(err.to_string()))?;
        Ok(ToolEntry {
            name,
            spec: ToolSpec {
                name: name.as_str(),
                description,
                input_schema: schema,
            },
            validator,
        })
    }

    /// Returns the published tool specifications in catalog order.
    #[must_use]
    pub fn specs(&self) -> Vec<ToolSpec> {
        self.entries.iter().map(|entry| entry.spec.clone()).collect()
    }

    /// Validates raw input against the named tool's schema.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::UnknownTool`] for uncataloged names and
    /// [`ToolError::Contract`] when the input fails schema validation.
    pub fn validate(&self, name: &str, input: &Value) -> Result<ToolName, ToolError> {
        let tool = ToolName::parse(name).ok_or_else(|| ToolError::UnknownTool(name.to_string()))?;
        let entry = self
            .entries
            .iter()
            .find(|entry| entry.name == tool)
            .ok_or_else(|| ToolError::UnknownTool(name.to_string()))?;
        entry
            .validator
            .validate(input)
            .map_err(|err| ToolError::Contract(format!("{name}: {err}")))?;
        Ok(entry.name)
    }
}

// ============================================================================
// SECTION: Schemas
// ============================================================================

/// Model-facing description for `classify_issue`.
const CLASSIFY_ISSUE_DESCRIPTION: &str =
    "Classify the maintenance issue type and urgency. Call this once you understand the problem.";

/// Model-facing description for `create_ticket`.
const CREATE_TICKET_DESCRIPTION: &str =
    "Create a maintenance ticket in the system. Call this after classify_issue when needs_more_info is false.";

/// Returns the JSON Schema for `classify_issue` input.
fn classify_issue_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "issue_type": {
                "type": "string",
                "enum": ["plumbing", "electrical", "hvac", "appliance", "structural", "pest", "other"],
            },
            "urgency": {
                "type": "string",
                "enum": ["emergency", "medium", "low"],
                "description": "emergency=flooding/no heat in winter/gas smell, medium=leaks/broken appliances/AC out, low=cosmetic/minor",
            },
            "summary": {
                "type": "string",
                "description": "One-sentence plain English summary of the issue for the landlord",
            },
            "needs_more_info": {
                "type": "boolean",
                "description": "Set true ONLY if you are missing critical info needed to classify. If you have enough to classify, set false.",
            },
            "follow_up_question": {
                "type": "string",
                "description": "If needs_more_info is true: the single most important question to ask. Must be one question only.",
            },
        },
        "required": ["issue_type", "urgency", "summary", "needs_more_info"],
    })
}

/// Returns the JSON Schema for `create_ticket` input.
fn create_ticket_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "issue_type": {
                "type": "string",
                "enum": ["plumbing", "electrical", "hvac", "appliance", "structural", "pest", "other"],
            },
            "urgency": {
                "type": "string",
                "enum": ["emergency", "medium", "low"],
            },
            "summary": { "type": "string" },
            "raw_message": {
                "type": "string",
                "description": "The tenant's original message verbatim",
            },
            "property_id": { "type": "string" },
            "tenant_id": { "type": "string" },
            "tenant_name": { "type": "string" },
            "unit": { "type": "string" },
        },
        "required": [
            "issue_type",
            "urgency",
            "summary",
            "raw_message",
            "property_id",
            "tenant_id",
            "tenant_name",
            "unit",
        ],
    })
}

// ============================================================================
// SECTION: Tests
// ============================================================================
