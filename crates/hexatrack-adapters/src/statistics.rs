// crates/hexatrack-adapters/src/statistics.rs
// ============================================================================
// Module: Delay Statistics Adapter
// Description: Moving average of first-hop delay over recent samples.
// Purpose: Local outgoing sink that summarizes stage B output.
// Dependencies: hexatrack-core, tokio, tracing
// ============================================================================

//! ## Overview
//! [`DelayStatisticsAdapter`] queues DelayCalcTrackData on a bounded
//! drop-oldest [`EventQueue`] and folds each message's first-hop delay into a
//! [`MovingAverage`] on the queue worker.
//! Invariants:
//! - The window never holds more than its configured sample count.
//! - The adapter accepts messages only while running.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::PoisonError;
use std::time::Duration;

use async_trait::async_trait;
use hexatrack_core::DelayCalcTrackData;
use hexatrack_core::OutgoingPort;
use hexatrack_core::PortError;
use hexatrack_core::WireMessage;
use hexatrack_core::logic::EventQueue;
use hexatrack_core::logic::PushOutcome;
use hexatrack_core::logic::QUEUE_WAIT_TIMEOUT;
use hexatrack_core::logic::QueueHandler;

use crate::adapter::Adapter;
use crate::error::AdapterError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Adapter name.
pub const DELAY_STATISTICS_ADAPTER_NAME: &str = "DelayCalcTrackData-Custom-OutAdapter";
/// Default pending-message capacity.
pub const DEFAULT_STATISTICS_QUEUE_CAPACITY: usize = 200;
/// Default moving average window.
pub const DEFAULT_MOVING_AVERAGE_WINDOW: usize = 100;

// ============================================================================
// SECTION: Moving Average
// ============================================================================

/// Fixed-size window of samples with a running sum.
#[derive(Debug)]
pub struct MovingAverage {
    /// Maximum samples kept.
    window: usize,
    /// Samples, oldest first.
    samples: VecDeque<i64>,
    /// Sum of `samples`.
    sum: i128,
}

impl MovingAverage {
    /// Creates an empty window.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::Start`] when `window` is zero.
    pub fn new(window: usize) -> Result<Self, AdapterError> {
        if window == 0 {
            return Err(AdapterError::Start("moving average window must be greater than zero".to_string()));
        }
        Ok(Self {
            window,
            samples: VecDeque::with_capacity(window),
            sum: 0,
        })
    }

    /// Adds a sample, evicting the oldest when full, and returns the new mean.
    pub fn push(&mut self, sample: i64) -> f64 {
        if self.samples.len() == self.window {
            if let Some(oldest) = self.samples.pop_front() {
                self.sum -= i128::from(oldest);
            }
        }
        self.samples.push_back(sample);
        self.sum += i128::from(sample);
        self.average()
    }

    /// Returns the mean of the current samples, or 0 when empty.
    #[must_use]
    #[allow(clippy::cast_precision_loss, reason = "Latency means tolerate f64 rounding.")]
    pub fn average(&self) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        self.sum as f64 / self.samples.len() as f64
    }

    /// Returns the number of samples in the window.
    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Returns true when no samples have been added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Returns the window size.
    #[must_use]
    pub const fn window(&self) -> usize {
        self.window
    }
}

/// Queue worker folding delays into the shared window.
struct DelayAccumulator {
    /// Shared window.
    average: Arc<Mutex<MovingAverage>>,
}

#[async_trait]
impl QueueHandler<DelayCalcTrackData> for DelayAccumulator {
    async fn handle(&self, message: DelayCalcTrackData) {
        let (mean, samples) = {
            let mut average = self.average.lock().unwrap_or_else(PoisonError::into_inner);
            let mean = average.push(message.first_hop_delay_time);
            (mean, average.len())
        };
        tracing::debug!(
            adapter = DELAY_STATISTICS_ADAPTER_NAME,
            track_id = message.track_id,
            hop1_us = message.first_hop_delay_time,
            moving_average_us = mean,
            samples,
            "delay sample processed"
        );
    }
}

// ============================================================================
// SECTION: Adapter
// ============================================================================

/// Outgoing adapter keeping a moving average of first-hop delay.
pub struct DelayStatisticsAdapter {
    /// Pending messages.
    queue: EventQueue<DelayCalcTrackData>,
    /// Worker-side accumulator.
    accumulator: Arc<DelayAccumulator>,
}

impl DelayStatisticsAdapter {
    /// Creates a stopped adapter with the default queue and window sizes.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError`] only if the default sizes are invalid.
    pub fn new() -> Result<Self, AdapterError> {
        Self::with_limits(DEFAULT_STATISTICS_QUEUE_CAPACITY, DEFAULT_MOVING_AVERAGE_WINDOW, QUEUE_WAIT_TIMEOUT)
    }

    /// Creates a stopped adapter with explicit sizes.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::Start`] when `capacity` or `window` is zero.
    pub fn with_limits(capacity: usize, window: usize, wait: Duration) -> Result<Self, AdapterError> {
        let queue = EventQueue::new(DELAY_STATISTICS_ADAPTER_NAME, capacity, wait)
            .map_err(|err| AdapterError::Start(err.to_string()))?;
        Ok(Self {
            queue,
            accumulator: Arc::new(DelayAccumulator {
                average: Arc::new(Mutex::new(MovingAverage::new(window)?)),
            }),
        })
    }

    /// Returns the current moving average of first-hop delay in microseconds.
    #[must_use]
    pub fn moving_average(&self) -> f64 {
        self.accumulator.average.lock().unwrap_or_else(PoisonError::into_inner).average()
    }

    /// Returns the number of samples in the window.
    #[must_use]
    pub fn sample_count(&self) -> usize {
        self.accumulator.average.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Returns the number of queued messages.
    #[must_use]
    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }
}

#[async_trait]
impl Adapter for DelayStatisticsAdapter {
    fn name(&self) -> &str {
        DELAY_STATISTICS_ADAPTER_NAME
    }

    async fn start(&self) -> Result<(), AdapterError> {
        let handler: Arc<dyn QueueHandler<DelayCalcTrackData>> = self.accumulator.clone();
        self.queue.start(handler);
        Ok(())
    }

    async fn stop(&self) {
        self.queue.stop().await;
    }

    fn is_running(&self) -> bool {
        self.queue.is_running()
    }
}

#[async_trait]
impl OutgoingPort<DelayCalcTrackData> for DelayStatisticsAdapter {
    async fn send(&self, message: &DelayCalcTrackData) -> Result<(), PortError> {
        if !self.queue.is_running() {
            return Err(PortError::NotRunning);
        }
        message.validate()?;
        match self.queue.push(*message) {
            PushOutcome::Enqueued => Ok(()),
            PushOutcome::EvictedOldest => {
                tracing::warn!(
                    adapter = DELAY_STATISTICS_ADAPTER_NAME,
                    track_id = message.track_id,
                    "message queue full, dropped oldest message"
                );
                Ok(())
            }
            PushOutcome::Stopped => Err(PortError::NotRunning),
        }
    }

    fn is_ready(&self) -> bool {
        self.queue.is_running()
    }
}
