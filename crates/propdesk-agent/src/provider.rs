// crates/propdesk-agent/src/provider.rs
// ============================================================================
// Module: Reasoning Provider Interface
// Description: Tagged model-turn types and the async provider contract.
// Purpose: Isolate the orchestrator from reasoning-service wire details.
// Dependencies: async-trait, serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! A reasoning-service response is modeled as a tagged [`ModelTurn`]: zero or
//! more prose fragments plus at most one tool invocation. The orchestrator
//! branches on this shape only and never inspects a generic content list.
//! Conversation history is carried as [`Turn`] values in the messages-API
//! wire form (text, tool_use, and tool_result blocks).

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod http;

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::contract::ToolSpec;

// ============================================================================
// SECTION: Conversation Wire Types
// ============================================================================

/// Conversation role in the reasoning-service convention.
///
/// # Invariants
/// - Variants are stable for serialization (`user`/`assistant`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    /// The reporting party (tenant messages map here).
    User,
    /// The triage agent.
    Assistant,
}

/// One content block inside a conversation turn.
///
/// # Invariants
/// - Shapes follow the messages-API wire form exactly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    /// Natural-language text.
    Text {
        /// Text content.
        text: String,
    },
    /// Tool invocation requested by the model.
    ToolUse {
        /// Invocation identifier issued by the model.
        id: String,
        /// Tool wire name.
        name: String,
        /// Raw tool input.
        input: Value,
    },
    /// Tool execution result fed back to the model.
    ToolResult {
        /// Identifier of the invocation this result answers.
        tool_use_id: String,
        /// Result content, human-readable.
        content: String,
        /// True when the tool execution failed.
        #[serde(default, skip_serializing_if = "std::ops::Not::not")]
        is_error: bool,
    },
}

/// One conversation turn sent to the reasoning service.
///
/// # Invariants
/// - `content` is non-empty and ordered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    /// Speaker role.
    pub role: TurnRole,
    /// Ordered content blocks.
    pub content: Vec<ContentBlock>,
}

impl Turn {
    /// Builds a single-text turn.
    #[must_use]
    pub fn text(role: TurnRole, text: impl Into<String>) -> Self {
        Self {
            role,
            content: vec![ContentBlock::Text {
                text: text.into(),
            }],
        }
    }
}

// ============================================================================
// SECTION: Model Turn
// ============================================================================

/// Tool invocation requested by the reasoning service.
///
/// # Invariants
/// - `input` is raw and unvalidated; the contract layer validates it.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolInvocation {
    /// Invocation identifier issued by the model.
    pub id: String,
    /// Tool wire name.
    pub name: String,
    /// Raw tool input.
    pub input: Value,
}

/// Tagged result of one reasoning-service round trip.
///
/// # Invariants
/// - `prose` fragments are ordered as produced by the model.
/// - At most one tool invocation is surfaced per turn; tool invocation and
///   further prose are mutually exclusive within the same turn for the
///   underlying service.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ModelTurn {
    /// Prose fragments in production order.
    pub prose: Vec<String>,
    /// Requested tool invocation, when present.
    pub tool: Option<ToolInvocation>,
}

// ============================================================================
// SECTION: Provider Contract
// ============================================================================

/// Errors raised while invoking the reasoning service.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
/// - Every variant aborts the session with a single error event.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Transport-level failure reaching the service.
    #[error("reasoning service unreachable: {0}")]
    Transport(String),
    /// Service answered with a non-success status.
    #[error("reasoning service returned status {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body excerpt.
        body: String,
    },
    /// Response body could not be decoded.
    #[error("reasoning service response malformed: {0}")]
    Decode(String),
    /// Required API key environment variable is unset.
    #[error("missing API key environment variable: {0}")]
    MissingApiKey(String),
    /// Requested provider name is not registered.
    #[error("unknown reasoning provider: {0}")]
    UnknownProvider(String),
}

/// Async reasoning-service client.
#[async_trait]
pub trait ReasoningProvider: Send + Sync {
    /// Performs one completion round trip.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] when the service cannot be reached or its
    /// response cannot be decoded.
    async fn complete(
        &self,
        system: &str,
        turns: &[Turn],
        tools: &[ToolSpec],
    ) -> Result<ModelTurn, ProviderError>;
}

/// Shared reasoning-provider handle.
pub type SharedReasoningProvider = Arc<dyn ReasoningProvider>;
