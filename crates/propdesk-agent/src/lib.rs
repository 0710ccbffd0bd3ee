// crates/propdesk-agent/src/lib.rs
// ============================================================================
// Module: PropDesk Agent
// Description: Tool-calling triage orchestrator and reasoning-service client.
// Purpose: Drive the tenant conversation loop that converges on a ticket.
// Dependencies: propdesk-core, async-trait, jsonschema, reqwest, serde, tokio
// ============================================================================

//! ## Overview
//! The agent crate owns the triage conversation: the tool catalog published
//! to the reasoning service, the provider abstraction that turns a model
//! response into a tagged [`provider::ModelTurn`], the ordered event channel
//! consumed by the transport layer, and the orchestrator loop that applies
//! tool invocations to the ticket store.
//!
//! Invariants:
//! - At most [`orchestrator::MAX_MODEL_ROUNDS`] model round-trips per session,
//!   plus one compensating call on the follow-up path.
//! - Exactly one ticket is created per session that reaches `create_ticket`.
//! - The end-of-stream marker is emitted unconditionally.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod contract;
pub mod events;
pub mod orchestrator;
pub mod prompt;
pub mod provider;

// ============================================================================
// SECTION: Re-exports
// ============================================================================

pub use contract::ToolCatalog;
pub use contract::ToolError;
pub use contract::ToolName;
pub use events::EventEmitter;
pub use events::TriageEvent;
pub use events::TriagePhase;
pub use orchestrator::MAX_MODEL_ROUNDS;
pub use orchestrator::SessionContext;
pub use orchestrator::TriageSession;
pub use provider::ModelTurn;
pub use provider::ProviderError;
pub use provider::ReasoningProvider;
pub use provider::SharedReasoningProvider;
pub use provider::ToolInvocation;
pub use provider::http::HttpReasoningProvider;
pub use provider::http::PROVIDER_ENV;
pub use provider::http::ProviderSettings;
