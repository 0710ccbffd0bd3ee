// crates/propdesk-server/src/lib.rs
// ============================================================================
// Module: PropDesk Server Library
// Description: HTTP surface for triage chat, tickets, vendors, and demo auth.
// Purpose: Wire the orchestrator and store into an axum application.
// Dependencies: propdesk-agent, propdesk-core, axum, tokio
// ============================================================================

//! ## Overview
//! The server crate hosts the PropDesk HTTP API. `POST /api/chat` spawns one
//! triage session per request and streams its events over SSE; ticket,
//! vendor, and auth routes are thin handlers over the shared in-memory store
//! and static collaborators. Sessions are ephemeral; the ticket store is the
//! only cross-request mutable state.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod auth;
pub mod config;
pub mod routes;
pub mod seed;
pub mod telemetry;
pub mod vendors;

// ============================================================================
// SECTION: Re-exports
// ============================================================================

pub use auth::Role;
pub use auth::Session;
pub use auth::SESSION_COOKIE;
pub use config::ConfigError;
pub use config::ServerConfig;
pub use routes::AppState;
pub use routes::router;
pub use telemetry::NoopMetrics;
pub use telemetry::RequestMetrics;
pub use telemetry::RequestMetricEvent;
pub use vendors::StaticVendorDirectory;
