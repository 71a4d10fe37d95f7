// crates/hexatrack-cli/src/publisher.rs
// ============================================================================
// Module: Test Publisher
// Description: Simulated TrackData source flying a circular path.
// Purpose: Drive stage A without external sensors.
// Dependencies: hexatrack-core, tokio, tracing
// ============================================================================

//! ## Overview
//! The simulated aircraft circles the origin at a fixed altitude. Position
//! and velocity are evaluated at the wall-clock time since publishing began.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::future::Future;
use std::time::Duration;
use std::time::Instant;

use hexatrack_core::Clock;
use hexatrack_core::Ecef;
use hexatrack_core::OutgoingPort;
use hexatrack_core::TrackData;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default simulated track identifier.
pub(crate) const DEFAULT_TRACK_ID: i32 = 1001;
/// Default gap between reports (8 Hz).
pub(crate) const DEFAULT_INTERVAL_MS: u64 = 125;
/// Pause after connecting before the first report.
pub(crate) const CONNECT_SETTLE: Duration = Duration::from_millis(500);
/// Angular velocity in rad/s.
const ANGULAR_VELOCITY: f64 = 0.1;
/// Circle radius in meters.
const RADIUS_M: f64 = 10_000.0;
/// Constant altitude in meters.
const ALTITUDE_M: f64 = 5_000.0;
/// Reports between progress callbacks.
const PROGRESS_EVERY: u64 = 8;

// ============================================================================
// SECTION: Track Model
// ============================================================================

/// Returns the simulated report `elapsed_secs` into the flight.
pub(crate) fn circular_track(track_id: i32, elapsed_secs: f64, now_ms: i64) -> TrackData {
    let angle = ANGULAR_VELOCITY * elapsed_secs;
    let speed = ANGULAR_VELOCITY * RADIUS_M;
    TrackData::new(
        track_id,
        Ecef::new(-speed * angle.sin(), speed * angle.cos(), 0.0),
        Ecef::new(RADIUS_M * angle.cos(), RADIUS_M * angle.sin(), ALTITUDE_M),
        now_ms,
    )
}

// ============================================================================
// SECTION: Publish Loop
// ============================================================================

/// Publishing parameters.
#[derive(Debug, Clone, Copy)]
pub(crate) struct PublishOptions {
    /// Reports to send; zero runs until stopped.
    pub(crate) count: u64,
    /// Gap between reports.
    pub(crate) interval: Duration,
    /// Simulated track identifier.
    pub(crate) track_id: i32,
}

/// Outcome of a publishing run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct PublishSummary {
    /// Reports accepted by the port.
    pub(crate) sent: u64,
    /// Reports the port rejected.
    pub(crate) failed: u64,
    /// Wall time spent publishing.
    pub(crate) elapsed: Duration,
}

impl PublishSummary {
    /// Returns accepted reports per second.
    #[allow(clippy::cast_precision_loss, reason = "Report counts stay far below 2^52.")]
    pub(crate) fn rate_hz(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 { self.sent as f64 / secs } else { 0.0 }
    }
}

/// Sends simulated reports until `options.count` is reached or `stop`
/// resolves. `on_progress` sees the first report and every eighth.
pub(crate) async fn publish(
    port: &dyn OutgoingPort<TrackData>,
    clock: &dyn Clock,
    options: PublishOptions,
    stop: impl Future<Output = ()>,
    mut on_progress: impl FnMut(u64, f64),
) -> PublishSummary {
    tokio::pin!(stop);
    let started = Instant::now();
    let mut sent = 0_u64;
    let mut failed = 0_u64;
    while options.count == 0 || sent + failed < options.count {
        let elapsed = started.elapsed().as_secs_f64();
        let track = circular_track(options.track_id, elapsed, clock.now_millis());
        match port.send(&track).await {
            Ok(()) => sent += 1,
            Err(err) => {
                failed += 1;
                tracing::warn!(track_id = options.track_id, error = %err, "report not sent");
            }
        }
        let attempts = sent + failed;
        if attempts == 1 || attempts % PROGRESS_EVERY == 0 {
            on_progress(attempts, elapsed);
        }
        if options.count != 0 && attempts >= options.count {
            break;
        }
        tokio::select! {
            () = &mut stop => break,
            () = tokio::time::sleep(options.interval) => {}
        }
    }
    PublishSummary {
        sent,
        failed,
        elapsed: started.elapsed(),
    }
}
