// crates/propdesk-core/src/core/time.rs
// ============================================================================
// Module: PropDesk Time Model
// Description: Canonical timestamp representation and clock interface.
// Purpose: Keep the core free of wall-clock reads while stamping mutations.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! PropDesk records creation and mutation times as unix-epoch milliseconds.
//! The core never reads wall-clock time directly; hosts inject a [`Clock`]
//! into the store, and tests substitute [`FixedClock`] for deterministic
//! timestamps.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Timestamp
// ============================================================================

/// Canonical timestamp in unix-epoch milliseconds.
///
/// # Invariants
/// - Values are explicitly provided by callers; monotonicity is a caller
///   responsibility.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    /// Creates a timestamp from unix-epoch milliseconds.
    #[must_use]
    pub const fn from_unix_millis(millis: i64) -> Self {
        Self(millis)
    }

    /// Returns the timestamp as unix-epoch milliseconds.
    #[must_use]
    pub const fn as_unix_millis(self) -> i64 {
        self.0
    }

    /// Returns a timestamp shifted by the given number of milliseconds.
    #[must_use]
    pub const fn offset_millis(self, delta: i64) -> Self {
        Self(self.0.saturating_add(delta))
    }
}

// ============================================================================
// SECTION: Clock Interface
// ============================================================================

/// Source of the current time for mutation stamping.
pub trait Clock: Send + Sync {
    /// Returns the current timestamp.
    fn now(&self) -> Timestamp;
}

/// Shared clock handle passed to stores and sessions.
pub type SharedClock = Arc<dyn Clock>;

/// Wall-clock implementation backed by [`SystemTime`].
///
/// # Invariants
/// - Times before the unix epoch saturate to zero.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX));
        Timestamp::from_unix_millis(millis)
    }
}

/// Deterministic clock returning a fixed timestamp, for tests.
///
/// # Invariants
/// - Always returns the timestamp supplied at construction.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(Timestamp);

impl FixedClock {
    /// Creates a fixed clock pinned at the given timestamp.
    #[must_use]
    pub const fn new(at: Timestamp) -> Self {
        Self(at)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> Timestamp {
        self.0
    }
}
