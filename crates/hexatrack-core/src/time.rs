// crates/hexatrack-core/src/time.rs
// ============================================================================
// Module: Hexatrack Clock
// Description: Wall-clock source for hop timestamps.
// Purpose: Allow deterministic timestamps in tests.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Hop timestamps are wall-clock microseconds since the Unix epoch, so that
//! stages on different hosts can be compared. Services take a [`Clock`]
//! rather than reading the system time directly.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::atomic::AtomicI64;
use std::sync::atomic::Ordering;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

// ============================================================================
// SECTION: Clock Trait
// ============================================================================

/// Wall-clock source.
pub trait Clock: Send + Sync {
    /// Returns microseconds since the Unix epoch.
    fn now_micros(&self) -> i64;

    /// Returns milliseconds since the Unix epoch.
    fn now_millis(&self) -> i64 {
        self.now_micros() / 1_000
    }
}

// ============================================================================
// SECTION: System Clock
// ============================================================================

/// Clock backed by [`SystemTime`].
///
/// # Invariants
/// - Returns 0 if the system time is before the epoch.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_micros(&self) -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |elapsed| i64::try_from(elapsed.as_micros()).unwrap_or(i64::MAX))
    }
}

// ============================================================================
// SECTION: Manual Clock
// ============================================================================

/// Settable clock for deterministic tests and replays.
#[derive(Debug, Default)]
pub struct ManualClock {
    /// Current time in microseconds.
    micros: AtomicI64,
}

impl ManualClock {
    /// Creates a clock reading `micros`.
    #[must_use]
    pub const fn new(micros: i64) -> Self {
        Self {
            micros: AtomicI64::new(micros),
        }
    }

    /// Sets the current time.
    pub fn set(&self, micros: i64) {
        self.micros.store(micros, Ordering::SeqCst);
    }

    /// Moves the clock forward by `micros`.
    pub fn advance(&self, micros: i64) {
        self.micros.fetch_add(micros, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_micros(&self) -> i64 {
        self.micros.load(Ordering::SeqCst)
    }
}
