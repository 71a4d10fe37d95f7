// crates/hexatrack-core/src/logic/final_calc.rs
// ============================================================================
// Module: Final Calculation
// Description: Stage C second-hop and end-to-end latency computation.
// Purpose: Close the latency loop and report per-track hop figures.
// Dependencies: async-trait, tracing
// ============================================================================

//! ## Overview
//! [`FinalCalculationService`] processes each DelayCalcTrackData inline.
//! [`TargetStatisticService`] wraps the same calculation behind an
//! [`EventQueue`] so the receive loop never waits on the outgoing port.
//! Invariants:
//! - `total_delay_time == first_hop_delay_time + second_hop_delay_time`.
//! - Nothing is sent while the outgoing port reports not ready.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::LogicError;
use crate::logic::calculator::time_delta;
use crate::logic::queue::EventQueue;
use crate::logic::queue::MAX_QUEUE_SIZE;
use crate::logic::queue::PushOutcome;
use crate::logic::queue::QUEUE_WAIT_TIMEOUT;
use crate::logic::queue::QueueHandler;
use crate::ports::DelayCalcTrackData;
use crate::ports::FinalCalcTrackData;
use crate::ports::FinalTrackDataOutgoingPort;
use crate::ports::IncomingPort;
use crate::ports::WireMessage;
use crate::telemetry::DropReason;
use crate::telemetry::HopLatency;
use crate::telemetry::LatencyMetrics;
use crate::telemetry::NoopMetrics;
use crate::telemetry::Stage;
use crate::time::Clock;

// ============================================================================
// SECTION: Final Calculation
// ============================================================================

/// Stage C service processing each message inline.
pub struct FinalCalculationService {
    /// Destination for FinalCalcTrackData.
    outgoing: Arc<FinalTrackDataOutgoingPort>,
    /// Source of the hop-3 timestamp.
    clock: Arc<dyn Clock>,
    /// Latency reporting.
    metrics: Arc<dyn LatencyMetrics>,
}

impl FinalCalculationService {
    /// Creates a service emitting through `outgoing`.
    #[must_use]
    pub fn new(outgoing: Arc<FinalTrackDataOutgoingPort>, clock: Arc<dyn Clock>) -> Self {
        Self {
            outgoing,
            clock,
            metrics: Arc::new(NoopMetrics),
        }
    }

    /// Replaces the metrics sink.
    #[must_use]
    pub fn with_metrics(mut self, metrics: Arc<dyn LatencyMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    /// Builds the final record for `data` at the current clock reading.
    #[must_use]
    pub fn create_final_calc_track_data(&self, data: &DelayCalcTrackData) -> FinalCalcTrackData {
        let now = self.clock.now_micros();
        FinalCalcTrackData::from_delay_calc(data, time_delta(data.second_hop_sent_time, now), now)
    }

    /// Computes, reports, and forwards the final record. Returns the record
    /// whether or not it was sent.
    pub async fn process(&self, data: &DelayCalcTrackData) -> FinalCalcTrackData {
        let final_data = self.create_final_calc_track_data(data);
        tracing::info!(
            track_id = final_data.track_id,
            hop1_us = final_data.first_hop_delay_time,
            hop2_us = final_data.second_hop_delay_time,
            total_us = final_data.total_delay_time,
            "Track ID: {} | Hop1: {} μs | Hop2: {} μs | Total: {} μs",
            final_data.track_id,
            final_data.first_hop_delay_time,
            final_data.second_hop_delay_time,
            final_data.total_delay_time,
        );
        self.metrics.record_hops(HopLatency {
            track_id: final_data.track_id,
            hop1_us: final_data.first_hop_delay_time,
            hop2_us: final_data.second_hop_delay_time,
            total_us: final_data.total_delay_time,
        });
        if !self.outgoing.is_ready() {
            tracing::warn!(track_id = final_data.track_id, "outgoing adapter not ready");
            self.metrics.record_drop(Stage::FinalCalc, DropReason::NotReady);
            return final_data;
        }
        match self.outgoing.send(&final_data).await {
            Ok(()) => tracing::debug!(track_id = final_data.track_id, "final calc data sent"),
            Err(err) => {
                tracing::error!(track_id = final_data.track_id, error = %err, "final calc data not sent");
                self.metrics.record_drop(Stage::FinalCalc, DropReason::SendFailed);
            }
        }
        final_data
    }

    /// Validates `message`, recording a drop when it is rejected.
    fn accept(&self, message: &DelayCalcTrackData) -> bool {
        match message.validate() {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(track_id = message.track_id, error = %err, "invalid delay calc data rejected");
                self.metrics.record_drop(Stage::FinalCalc, DropReason::Invalid);
                false
            }
        }
    }
}

#[async_trait]
impl IncomingPort<DelayCalcTrackData> for FinalCalculationService {
    async fn submit(&self, message: DelayCalcTrackData) {
        if self.accept(&message) {
            self.process(&message).await;
        }
    }
}

#[async_trait]
impl QueueHandler<DelayCalcTrackData> for FinalCalculationService {
    async fn handle(&self, message: DelayCalcTrackData) {
        self.process(&message).await;
    }
}

// ============================================================================
// SECTION: Target Statistic Service
// ============================================================================

/// Stage C service with a dedicated processing worker.
pub struct TargetStatisticService {
    /// Pending input.
    queue: EventQueue<DelayCalcTrackData>,
    /// Worker-side calculation.
    calculation: Arc<FinalCalculationService>,
}

impl TargetStatisticService {
    /// Creates a stopped service with the default queue settings.
    ///
    /// # Errors
    ///
    /// Returns [`LogicError`] only if the default queue settings are invalid.
    pub fn new(calculation: FinalCalculationService) -> Result<Self, LogicError> {
        Self::with_queue(calculation, MAX_QUEUE_SIZE, QUEUE_WAIT_TIMEOUT)
    }

    /// Creates a stopped service with explicit queue settings.
    ///
    /// # Errors
    ///
    /// Returns [`LogicError::InvalidCapacity`] when `capacity` is zero.
    pub fn with_queue(
        calculation: FinalCalculationService,
        capacity: usize,
        wait: Duration,
    ) -> Result<Self, LogicError> {
        Ok(Self {
            queue: EventQueue::new("target-statistic", capacity, wait)?,
            calculation: Arc::new(calculation),
        })
    }

    /// Starts the processing worker. Idempotent.
    pub fn start(&self) {
        let handler: Arc<dyn QueueHandler<DelayCalcTrackData>> = self.calculation.clone();
        self.queue.start(handler);
    }

    /// Stops the processing worker. Idempotent.
    pub async fn stop(&self) {
        self.queue.stop().await;
    }

    /// Returns true while the worker is running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.queue.is_running()
    }

    /// Returns the number of queued messages.
    #[must_use]
    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }
}

#[async_trait]
impl IncomingPort<DelayCalcTrackData> for TargetStatisticService {
    async fn submit(&self, message: DelayCalcTrackData) {
        let metrics = &self.calculation.metrics;
        if !self.queue.is_running() {
            tracing::warn!(track_id = message.track_id, "target statistic service not running, dropping");
            metrics.record_drop(Stage::FinalCalc, DropReason::NotRunning);
            return;
        }
        if !self.calculation.accept(&message) {
            return;
        }
        match self.queue.push(message) {
            PushOutcome::Enqueued => {}
            PushOutcome::EvictedOldest => {
                tracing::warn!(track_id = message.track_id, "event queue full, dropped oldest message");
                metrics.record_drop(Stage::FinalCalc, DropReason::QueueFull);
            }
            PushOutcome::Stopped => metrics.record_drop(Stage::FinalCalc, DropReason::NotRunning),
        }
    }
}
