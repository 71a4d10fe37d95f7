// crates/hexatrack-core/src/logic/process_track.rs
// ============================================================================
// Module: Process Track Use Case
// Description: Stage B queued service computing first-hop delay.
// Purpose: Accept ExtrapTrackData without blocking the receive loop.
// Dependencies: async-trait, tokio, tracing
// ============================================================================

//! ## Overview
//! Incoming ExtrapTrackData is validated and pushed onto an [`EventQueue`].
//! The queue worker runs the [`CalculatorService`] and forwards the
//! resulting DelayCalcTrackData through the outgoing port.
//! Invariants:
//! - Messages submitted while stopped are dropped, never queued.
//! - Invalid messages never reach the calculator.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::LogicError;
use crate::logic::calculator::CalculatorService;
use crate::logic::queue::EventQueue;
use crate::logic::queue::MAX_QUEUE_SIZE;
use crate::logic::queue::PushOutcome;
use crate::logic::queue::QUEUE_WAIT_TIMEOUT;
use crate::logic::queue::QueueHandler;
use crate::ports::DelayCalcTrackDataOutgoingPort;
use crate::ports::ExtrapTrackData;
use crate::ports::IncomingPort;
use crate::ports::WireMessage;
use crate::telemetry::DropReason;
use crate::telemetry::LatencyMetrics;
use crate::telemetry::NoopMetrics;
use crate::telemetry::Stage;

// ============================================================================
// SECTION: Processor
// ============================================================================

/// Worker-side half of the use case.
struct DelayProcessor {
    /// Delay calculation.
    calculator: Arc<dyn CalculatorService>,
    /// Destination for DelayCalcTrackData.
    outgoing: Arc<DelayCalcTrackDataOutgoingPort>,
    /// Failed-send reporting.
    metrics: Arc<dyn LatencyMetrics>,
}

#[async_trait]
impl QueueHandler<ExtrapTrackData> for DelayProcessor {
    async fn handle(&self, message: ExtrapTrackData) {
        tracing::debug!(
            track_id = message.track_id,
            position = ?message.position,
            velocity = ?message.velocity,
            update_time = message.update_time,
            "processing extrapolated track"
        );
        let processed = self.calculator.calculate_delay(&message);
        tracing::info!(
            track_id = processed.track_id,
            hop1_us = processed.first_hop_delay_time,
            "first hop delay calculated"
        );
        if let Err(err) = self.outgoing.send(&processed).await {
            tracing::error!(track_id = processed.track_id, error = %err, "delay calc data not sent");
            self.metrics.record_drop(Stage::DelayCalc, DropReason::SendFailed);
        }
    }
}

// ============================================================================
// SECTION: Use Case
// ============================================================================

/// Stage B service: ExtrapTrackData in, DelayCalcTrackData out.
pub struct ProcessTrackUseCase {
    /// Pending input.
    queue: EventQueue<ExtrapTrackData>,
    /// Worker-side processing.
    processor: Arc<DelayProcessor>,
    /// Drop reporting.
    metrics: Arc<dyn LatencyMetrics>,
}

impl ProcessTrackUseCase {
    /// Creates a stopped use case with the default queue settings.
    ///
    /// # Errors
    ///
    /// Returns [`LogicError`] only if the default queue settings are invalid.
    pub fn new(
        calculator: Arc<dyn CalculatorService>,
        outgoing: Arc<DelayCalcTrackDataOutgoingPort>,
    ) -> Result<Self, LogicError> {
        Self::with_queue(calculator, outgoing, MAX_QUEUE_SIZE, QUEUE_WAIT_TIMEOUT)
    }

    /// Creates a stopped use case with explicit queue settings.
    ///
    /// # Errors
    ///
    /// Returns [`LogicError::InvalidCapacity`] when `capacity` is zero.
    pub fn with_queue(
        calculator: Arc<dyn CalculatorService>,
        outgoing: Arc<DelayCalcTrackDataOutgoingPort>,
        capacity: usize,
        wait: Duration,
    ) -> Result<Self, LogicError> {
        let metrics: Arc<dyn LatencyMetrics> = Arc::new(NoopMetrics);
        Ok(Self {
            queue: EventQueue::new("process-track", capacity, wait)?,
            processor: Arc::new(DelayProcessor {
                calculator,
                outgoing,
                metrics: Arc::clone(&metrics),
            }),
            metrics,
        })
    }

    /// Replaces the metrics sink.
    #[must_use]
    pub fn with_metrics(mut self, metrics: Arc<dyn LatencyMetrics>) -> Self {
        self.processor = Arc::new(DelayProcessor {
            calculator: Arc::clone(&self.processor.calculator),
            outgoing: Arc::clone(&self.processor.outgoing),
            metrics: Arc::clone(&metrics),
        });
        self.metrics = metrics;
        self
    }

    /// Starts the processing worker. Idempotent.
    pub fn start(&self) {
        let processor: Arc<dyn QueueHandler<ExtrapTrackData>> = self.processor.clone();
        self.queue.start(processor);
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
impl IncomingPort<ExtrapTrackData> for ProcessTrackUseCase {
    async fn submit(&self, message: ExtrapTrackData) {
        if !self.queue.is_running() {
            tracing::warn!(track_id = message.track_id, "process track use case not running, dropping");
            self.metrics.record_drop(Stage::DelayCalc, DropReason::NotRunning);
            return;
        }
        if let Err(err) = message.validate() {
            tracing::warn!(track_id = message.track_id, error = %err, "invalid extrapolated track rejected");
            self.metrics.record_drop(Stage::DelayCalc, DropReason::Invalid);
            return;
        }
        match self.queue.push(message) {
            PushOutcome::Enqueued => {}
            PushOutcome::EvictedOldest => {
                tracing::warn!(track_id = message.track_id, "event queue full, dropped oldest message");
                self.metrics.record_drop(Stage::DelayCalc, DropReason::QueueFull);
            }
            PushOutcome::Stopped => {
                self.metrics.record_drop(Stage::DelayCalc, DropReason::NotRunning);
            }
        }
    }
}
