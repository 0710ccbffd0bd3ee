// crates/propdesk-server/src/telemetry.rs
// ============================================================================
// Module: Server Telemetry
// Description: Observability hooks for HTTP request handling.
// Purpose: Provide metric events and latency buckets without hard deps.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! A thin metrics interface for request counters and latency histograms,
//! dependency-light so deployments can plug in Prometheus or OpenTelemetry
//! without redesign. Labels must never carry tenant message content or
//! credentials.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default latency buckets in milliseconds for request histograms.
pub const REQUEST_LATENCY_BUCKETS_MS: &[u64] =
    &[1, 2, 5, 10, 25, 50, 100, 250, 500, 1_000, 2_500, 5_000, 10_000, 30_000];

// ============================================================================
// SECTION: Metric Labels
// ============================================================================

/// API route classification for metric labels.
///
/// # Invariants
/// - Variants are stable for telemetry labeling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum ApiRoute {
    /// POST /api/chat.
    Chat,
    /// GET /api/tickets and GET /api/tickets/{id}.
    Tickets,
    /// PATCH /api/tickets/{id}.
    TicketUpdate,
    /// GET /api/vendors.
    Vendors,
    /// POST /api/auth/login and GET /api/auth/me.
    Auth,
    /// GET /healthz.
    Health,
}

impl ApiRoute {
    /// Returns a stable label for the route.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Chat => "chat",
            Self::Tickets => "tickets",
            Self::TicketUpdate => "ticket_update",
            Self::Vendors => "vendors",
            Self::Auth => "auth",
            Self::Health => "health",
        }
    }
}

/// Request outcome classification.
///
/// # Invariants
/// - Variants are stable for telemetry labeling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum RequestOutcome {
    /// Successful request.
    Ok,
    /// Failed request.
    Error,
}

impl RequestOutcome {
    /// Returns a stable label for the outcome.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Error => "error",
        }
    }
}

/// Request metric event payload.
#[derive(Debug, Clone)]
pub struct RequestMetricEvent {
    /// Route classification.
    pub route: ApiRoute,
    /// Request outcome.
    pub outcome: RequestOutcome,
    /// HTTP status code when known.
    pub status: Option<u16>,
}

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Metrics sink for API requests and latencies.
pub trait RequestMetrics: Send + Sync {
    /// Records a request counter event.
    fn record_request(&self, event: RequestMetricEvent);
    /// Records a latency observation for the request.
    fn record_latency(&self, event: RequestMetricEvent, latency: Duration);
}

/// No-op metrics sink.
///
/// # Invariants
/// - Metrics are intentionally discarded.
pub struct NoopMetrics;

impl RequestMetrics for NoopMetrics {
    fn record_request(&self, _event: RequestMetricEvent) {}

    fn record_latency(&self, _event: RequestMetricEvent, _latency: Duration) {}
}
