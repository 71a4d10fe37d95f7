// crates/hexatrack-core/src/logic/extrapolator.rs
// ============================================================================
// Module: Track Extrapolator
// Description: Stage A upsampling of TrackData to ExtrapTrackData.
// Purpose: Fill the gap between 8 Hz reports with 100 Hz predicted states.
// Dependencies: async-trait, tokio, tracing
// ============================================================================

//! ## Overview
//! Each incoming report is projected forward with constant velocity at every
//! output tick that falls inside one input interval. With the default rates
//! (8 Hz in, 100 Hz out) one report yields 13 states at offsets
//! 0, 10, ..., 120 ms. Items are emitted with a fixed pacing gap so that the
//! downstream stream approximates the output rate.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::LogicError;
use crate::ports::ExtrapTrackData;
use crate::ports::ExtrapTrackDataOutgoingPort;
use crate::ports::IncomingPort;
use crate::ports::TrackData;
use crate::ports::WireMessage;
use crate::telemetry::DropReason;
use crate::telemetry::LatencyMetrics;
use crate::telemetry::NoopMetrics;
use crate::telemetry::Stage;
use crate::time::Clock;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default report rate in hertz.
pub const DEFAULT_INPUT_FREQUENCY_HZ: f64 = 8.0;
/// Default extrapolated output rate in hertz.
pub const DEFAULT_OUTPUT_FREQUENCY_HZ: f64 = 100.0;
/// Default gap between emitted items.
pub const DEFAULT_EMIT_INTERVAL: Duration = Duration::from_millis(10);
/// Upper bound on states produced from one report.
pub const MAX_EXTRAPOLATION_STEPS: usize = 10_000;

// ============================================================================
// SECTION: Schedule
// ============================================================================

/// Input/output rate pair defining extrapolation offsets.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtrapolationSchedule {
    /// Report rate in hertz.
    input_hz: f64,
    /// Output rate in hertz.
    output_hz: f64,
}

impl ExtrapolationSchedule {
    /// Creates a schedule.
    ///
    /// # Errors
    ///
    /// Returns [`LogicError::InvalidFrequency`] when a rate is not a positive
    /// finite number.
    pub fn new(input_hz: f64, output_hz: f64) -> Result<Self, LogicError> {
        for (name, value) in [("input_hz", input_hz), ("output_hz", output_hz)] {
            if !value.is_finite() || value <= 0.0 {
                return Err(LogicError::InvalidFrequency {
                    name,
                    value,
                });
            }
        }
        Ok(Self {
            input_hz,
            output_hz,
        })
    }

    /// Returns the offsets in seconds, `i / output_hz` for every `i` below
    /// one input interval. Always contains at least offset 0 and never more
    /// than [`MAX_EXTRAPOLATION_STEPS`] entries.
    #[must_use]
    pub fn offsets(&self) -> Vec<f64> {
        let input_interval = 1.0 / self.input_hz;
        let mut offsets = Vec::new();
        let mut step: u32 = 0;
        loop {
            let offset = f64::from(step) / self.output_hz;
            if offset >= input_interval || offsets.len() >= MAX_EXTRAPOLATION_STEPS {
                break;
            }
            offsets.push(offset);
            step += 1;
        }
        offsets
    }
}

impl Default for ExtrapolationSchedule {
    fn default() -> Self {
        Self {
            input_hz: DEFAULT_INPUT_FREQUENCY_HZ,
            output_hz: DEFAULT_OUTPUT_FREQUENCY_HZ,
        }
    }
}

/// Projects `track` forward by `offset` seconds.
#[must_use]
#[allow(clippy::cast_possible_truncation, reason = "Offsets are bounded by one input interval.")]
pub fn extrapolate_at(track: &TrackData, offset: f64, first_hop_sent_time: i64) -> ExtrapTrackData {
    let offset_us = (offset * 1_000_000.0).round() as i64;
    let update_time = track.original_update_time.saturating_mul(1_000).saturating_add(offset_us);
    ExtrapTrackData::from_track(
        track,
        track.position.advanced(&track.velocity, offset),
        update_time,
        first_hop_sent_time,
    )
}

// ============================================================================
// SECTION: Extrapolator
// ============================================================================

/// Stage A service: TrackData in, paced ExtrapTrackData out.
pub struct TrackDataExtrapolator {
    /// Destination for extrapolated states.
    outgoing: Arc<ExtrapTrackDataOutgoingPort>,
    /// Source of hop-1 send timestamps.
    clock: Arc<dyn Clock>,
    /// Extrapolation offsets.
    schedule: ExtrapolationSchedule,
    /// Gap between emitted items.
    emit_interval: Duration,
    /// Drop reporting.
    metrics: Arc<dyn LatencyMetrics>,
}

impl TrackDataExtrapolator {
    /// Creates an extrapolator with the default 8 Hz to 100 Hz schedule.
    #[must_use]
    pub fn new(outgoing: Arc<ExtrapTrackDataOutgoingPort>, clock: Arc<dyn Clock>) -> Self {
        Self {
            outgoing,
            clock,
            schedule: ExtrapolationSchedule::default(),
            emit_interval: DEFAULT_EMIT_INTERVAL,
            metrics: Arc::new(NoopMetrics),
        }
    }

    /// Replaces the extrapolation schedule.
    #[must_use]
    pub fn with_schedule(mut self, schedule: ExtrapolationSchedule) -> Self {
        self.schedule = schedule;
        self
    }

    /// Replaces the pacing gap; zero disables pacing.
    #[must_use]
    pub fn with_emit_interval(mut self, emit_interval: Duration) -> Self {
        self.emit_interval = emit_interval;
        self
    }

    /// Replaces the metrics sink.
    #[must_use]
    pub fn with_metrics(mut self, metrics: Arc<dyn LatencyMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    /// Extrapolates `track` and forwards every state. Returns the number of
    /// states the outgoing port accepted.
    pub async fn process_and_forward(&self, track: &TrackData) -> usize {
        let offsets = self.schedule.offsets();
        let last = offsets.len().saturating_sub(1);
        let mut sent = 0;
        for (index, offset) in offsets.into_iter().enumerate() {
            let extrap = extrapolate_at(track, offset, self.clock.now_micros());
            match self.outgoing.send(&extrap).await {
                Ok(()) => sent += 1,
                Err(err) => {
                    tracing::warn!(track_id = track.track_id, error = %err, "extrapolated state not sent");
                }
            }
            if index < last && !self.emit_interval.is_zero() {
                tokio::time::sleep(self.emit_interval).await;
            }
        }
        tracing::debug!(track_id = track.track_id, sent, "track extrapolated");
        sent
    }
}

#[async_trait]
impl IncomingPort<TrackData> for TrackDataExtrapolator {
    async fn submit(&self, message: TrackData) {
        if let Err(err) = message.validate() {
            tracing::warn!(track_id = message.track_id, error = %err, "invalid track data rejected");
            self.metrics.record_drop(Stage::Extrapolate, DropReason::Invalid);
            return;
        }
        self.process_and_forward(&message).await;
    }
}
