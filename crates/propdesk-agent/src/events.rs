// crates/propdesk-agent/src/events.rs
// ============================================================================
// Module: Incremental Event Emitter
// Description: Ordered per-session event channel for triage output.
// Purpose: Interleave prose fragments and structured events without blocking the loop.
// Dependencies: propdesk-core, serde, tokio
// ============================================================================

//! ## Overview
//! Each triage session owns a single ordered channel carrying prose
//! fragments, phase signals, tool-invocation records, the terminal
//! ticket-created confirmation, and errors. Emission is fire-and-forget
//! relative to loop progression: sends never block and never fail the
//! orchestrator, even after the consumer disconnects. The [`TriageEvent::Done`]
//! marker is always the last frame, letting a consumer distinguish a normal
//! end of stream from a dropped connection.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Serialize;
use serde_json::Value;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::mpsc::unbounded_channel;

use propdesk_core::Ticket;

// ============================================================================
// SECTION: Event Frames
// ============================================================================

/// Conversation phase reported through status events.
///
/// # Invariants
/// - Variants are stable for serialization; names match the pre-creation
///   lifecycle phases shown to the reporter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TriagePhase {
    /// Agent needs more information from the tenant.
    GatheringInfo,
    /// Issue classified with type and urgency.
    Triaged,
    /// Vendor candidates are being collected.
    FindingVendors,
}

/// One frame on the session event channel.
///
/// # Invariants
/// - Frames are delivered in emission order.
/// - `Done` is always the final frame of a session.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TriageEvent {
    /// Prose fragment with append semantics.
    Text {
        /// Fragment content.
        content: String,
    },
    /// Classification or phase signal.
    Status {
        /// Conversation phase.
        phase: TriagePhase,
        /// Optional human-readable detail.
        #[serde(skip_serializing_if = "Option::is_none")]
        detail: Option<String>,
    },
    /// Raw tool invocation, recorded for observability.
    ToolCall {
        /// Tool wire name.
        name: String,
        /// Raw tool input.
        input: Value,
    },
    /// Terminal success carrying the full created ticket.
    TicketCreated {
        /// The created ticket, as independently re-read from the store.
        ticket: Ticket,
    },
    /// Terminal failure with a human-readable message.
    Error {
        /// Failure description.
        message: String,
    },
    /// End-of-stream marker, always emitted last.
    Done,
}

// ============================================================================
// SECTION: Emitter
// ============================================================================

/// Ordered, non-blocking event emitter for one triage session.
///
/// # Invariants
/// - Sends preserve FIFO order and never block the orchestrator.
/// - Sends after the consumer disconnects are silently dropped; committed
///   store writes are unaffected.
#[derive(Clone)]
pub struct EventEmitter {
    /// Underlying unbounded channel sender.
    tx: UnboundedSender<TriageEvent>,
}

impl EventEmitter {
    /// Creates an emitter and its consuming receiver.
    #[must_use]
    pub fn channel() -> (Self, UnboundedReceiver<TriageEvent>) {
        let (tx, rx) = unbounded_channel();
        (
            Self {
                tx,
            },
            rx,
        )
    }

    /// Emits one event; silently drops the frame if the consumer is gone.
    pub fn emit(&self, event: TriageEvent) {
        let _ = self.tx.send(event);
    }

    /// Emits a prose fragment.
    pub fn emit_text(&self, content: impl Into<String>) {
        self.emit(TriageEvent::Text {
            content: content.into(),
        });
    }

    /// Emits a phase signal.
    pub fn emit_status(&self, phase: TriagePhase, detail: Option<String>) {
        self.emit(TriageEvent::Status {
            phase,
            detail,
        });
    }
}
