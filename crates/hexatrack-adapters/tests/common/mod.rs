// crates/hexatrack-adapters/tests/common/mod.rs
// ============================================================================
// Module: Common Test Utilities
// Description: Shared helpers for hexatrack-adapters tests.
// Purpose: Provide sample tracks, recording ports, and scripted adapters.
// Dependencies: hexatrack-adapters, hexatrack-core, async-trait
// ============================================================================

//! ## Overview
//! Provides sample messages, an incoming port that records submissions, a
//! shared writer buffer, and an adapter whose start result is scripted.

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

use std::io::Write;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::time::Duration;

use async_trait::async_trait;
use hexatrack_adapters::Adapter;
use hexatrack_adapters::AdapterError;
use hexatrack_core::DelayCalcTrackData;
use hexatrack_core::Ecef;
use hexatrack_core::ExtrapTrackData;
use hexatrack_core::FinalCalcTrackData;
use hexatrack_core::IncomingPort;
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

/// Creates a valid sample extrapolated track.
pub fn sample_extrap(track_id: i32) -> ExtrapTrackData {
    ExtrapTrackData::from_track(
        &sample_track(track_id),
        Ecef::new(10_001.0, 19_999.5, 5_000.1),
        SAMPLE_REPORT_MS * 1_000 + 10_000,
        SAMPLE_REPORT_MS * 1_000 + 12_000,
    )
}

/// Creates a valid sample delay-calculated track with first-hop `hop1_us`.
pub fn sample_delay_calc(track_id: i32, hop1_us: i64) -> DelayCalcTrackData {
    let extrap = sample_extrap(track_id);
    DelayCalcTrackData::from_extrap(&extrap, hop1_us, extrap.first_hop_sent_time + hop1_us)
}

/// Creates a valid sample final track.
pub fn sample_final(track_id: i32) -> FinalCalcTrackData {
    let delay = sample_delay_calc(track_id, 400);
    FinalCalcTrackData::from_delay_calc(&delay, 600, delay.second_hop_sent_time + 600)
}

// ============================================================================
// SECTION: Recording Incoming Port
// ============================================================================

/// Incoming port that records every submitted message.
pub struct RecordingIncoming<M> {
    /// Submitted messages in arrival order.
    messages: Mutex<Vec<M>>,
}

impl<M: Clone> RecordingIncoming<M> {
    /// Creates an empty recorder.
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            messages: Mutex::new(Vec::new()),
        })
    }

    /// Returns a copy of the submitted messages.
    pub fn messages(&self) -> Vec<M> {
        self.messages.lock().unwrap().clone()
    }

    /// Returns the number of submitted messages.
    pub fn count(&self) -> usize {
        self.messages.lock().unwrap().len()
    }
}

#[async_trait]
impl<M: Clone + Send + Sync + 'static> IncomingPort<M> for RecordingIncoming<M> {
    async fn submit(&self, message: M) {
        self.messages.lock().unwrap().push(message);
    }
}

// ============================================================================
// SECTION: Shared Buffer for Write Testing
// ============================================================================

/// A thread-safe buffer for testing Write implementations.
#[derive(Clone, Default)]
pub struct SharedBuffer {
    inner: Arc<Mutex<Vec<u8>>>,
}

impl SharedBuffer {
    /// Returns the contents as a string.
    pub fn to_string_lossy(&self) -> String {
        String::from_utf8_lossy(&self.inner.lock().expect("buffer lock")).to_string()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.inner.lock().expect("buffer lock").extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// A writer that always fails, for testing error paths.
pub struct FailingWriter;

impl Write for FailingWriter {
    fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
        Err(std::io::Error::other("simulated write failure"))
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

// ============================================================================
// SECTION: Scripted Adapter
// ============================================================================

/// Adapter recording lifecycle calls into a shared journal.
pub struct ScriptedAdapter {
    name: String,
    fail_start: bool,
    running: AtomicBool,
    journal: Arc<Mutex<Vec<String>>>,
}

impl ScriptedAdapter {
    /// Creates an adapter that starts successfully.
    pub fn ok(name: &str, journal: &Arc<Mutex<Vec<String>>>) -> Arc<Self> {
        Self::build(name, false, journal)
    }

    /// Creates an adapter whose start always fails.
    pub fn failing(name: &str, journal: &Arc<Mutex<Vec<String>>>) -> Arc<Self> {
        Self::build(name, true, journal)
    }

    fn build(name: &str, fail_start: bool, journal: &Arc<Mutex<Vec<String>>>) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            fail_start,
            running: AtomicBool::new(false),
            journal: Arc::clone(journal),
        })
    }
}

#[async_trait]
impl Adapter for ScriptedAdapter {
    fn name(&self) -> &str {
        &self.name
    }

    async fn start(&self) -> Result<(), AdapterError> {
        self.journal.lock().unwrap().push(format!("start {}", self.name));
        if self.fail_start {
            return Err(AdapterError::Start(format!("{} refused", self.name)));
        }
        self.running.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn stop(&self) {
        self.journal.lock().unwrap().push(format!("stop {}", self.name));
        self.running.store(false, Ordering::SeqCst);
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
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
