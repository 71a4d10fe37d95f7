// crates/hexatrack-core/tests/common/mod.rs
// ============================================================================
// Module: Common Test Utilities
// Description: Shared helpers for hexatrack-core tests.
// Purpose: Provide sample track builders and recording ports.
// Dependencies: hexatrack-core, async-trait
// ============================================================================

//! ## Overview
//! Provides sample messages and an outgoing port that records what the
//! services under test emit.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use std::sync::Mutex;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::time::Duration;

use async_trait::async_trait;
use hexatrack_core::DelayCalcTrackData;
use hexatrack_core::Ecef;
use hexatrack_core::ExtrapTrackData;
use hexatrack_core::OutgoingPort;
use hexatrack_core::PortError;
use hexatrack_core::TrackData;

// ============================================================================
// SECTION: Sample Builders
// ============================================================================

/// Report time used by sample tracks, in milliseconds.
pub const SAMPLE_REPORT_MS: i64 = 1_700_000_000_000;

/// Creates a valid sample track report.
pub fn sample_track(track_id: i32) -> TrackData {
    TrackData::new(
        track_id,
        Ecef::new(100.0, -50.0, 10.0),
        Ecef::new(10_000.0, 20_000.0, 5_000.0),
        SAMPLE_REPORT_MS,
    )
}

/// Creates a valid sample extrapolated track sent at `sent_us`.
pub fn sample_extrap(track_id: i32, sent_us: i64) -> ExtrapTrackData {
    ExtrapTrackData::from_track(
        &sample_track(track_id),
        Ecef::new(10_001.0, 19_999.5, 5_000.1),
        SAMPLE_REPORT_MS * 1_000 + 10_000,
        sent_us,
    )
}

/// Creates a valid sample delay-calculated track.
pub fn sample_delay_calc(track_id: i32, hop1_us: i64, second_sent_us: i64) -> DelayCalcTrackData {
    DelayCalcTrackData::from_extrap(&sample_extrap(track_id, second_sent_us - hop1_us), hop1_us, second_sent_us)
}

// ============================================================================
// SECTION: Recording Port
// ============================================================================

/// Outgoing port that records every message it accepts.
pub struct RecordingPort<M> {
    /// Accepted messages in arrival order.
    messages: Mutex<Vec<M>>,
    /// Readiness reported to callers.
    ready: AtomicBool,
    /// When set, every send fails.
    failing: AtomicBool,
    /// When set, sends are rejected as not running.
    stopped: AtomicBool,
}

impl<M: Clone> RecordingPort<M> {
    /// Creates a ready, non-failing port.
    pub fn new() -> Self {
        Self {
            messages: Mutex::new(Vec::new()),
            ready: AtomicBool::new(true),
            failing: AtomicBool::new(false),
            stopped: AtomicBool::new(false),
        }
    }

    /// Creates a port that reports not ready.
    pub fn not_ready() -> Self {
        let port = Self::new();
        port.ready.store(false, Ordering::SeqCst);
        port
    }

    /// Creates a port that is not ready and rejects sends like a stopped
    /// adapter.
    pub fn stopped() -> Self {
        let port = Self::not_ready();
        port.stopped.store(true, Ordering::SeqCst);
        port
    }

    /// Creates a port whose sends always fail.
    pub fn failing() -> Self {
        let port = Self::new();
        port.failing.store(true, Ordering::SeqCst);
        port
    }

    /// Returns a copy of the recorded messages.
    pub fn messages(&self) -> Vec<M> {
        self.messages.lock().unwrap().clone()
    }

    /// Returns the number of recorded messages.
    pub fn count(&self) -> usize {
        self.messages.lock().unwrap().len()
    }
}

#[async_trait]
impl<M: Clone + Send + Sync + 'static> OutgoingPort<M> for RecordingPort<M> {
    async fn send(&self, message: &M) -> Result<(), PortError> {
        if self.stopped.load(Ordering::SeqCst) {
            return Err(PortError::NotRunning);
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(PortError::Transport("injected failure".to_string()));
        }
        self.messages.lock().unwrap().push(message.clone());
        Ok(())
    }

    fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }
}

// ============================================================================
// SECTION: Async Helpers
// ============================================================================

/// Polls `condition` every few milliseconds until it holds or `timeout` ends.
pub async fn wait_until(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = tokio::time::Instant::now() + timeout;
    while tokio::time::Instant::now() < deadline {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    condition()
}
