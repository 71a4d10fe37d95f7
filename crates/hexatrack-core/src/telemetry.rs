// crates/hexatrack-core/src/telemetry.rs
// ============================================================================
// Module: Hexatrack Telemetry
// Description: Observability hooks for hop latency and dropped messages.
// Purpose: Provide latency events without hard deps on a metrics backend.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Services report per-track hop latencies and queue drops through
//! [`LatencyMetrics`]. Deployments can plug in an exporter; the built-in
//! [`LatencySummary`] keeps running min/max/mean figures in memory.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Mutex;
use std::sync::PoisonError;

use serde::Serialize;

// ============================================================================
// SECTION: Metric Labels
// ============================================================================

/// Pipeline stage classification.
///
/// # Invariants
/// - Variants are stable for telemetry labeling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Stage {
    /// Stage A: extrapolation.
    Extrapolate,
    /// Stage B: first-hop delay calculation.
    DelayCalc,
    /// Stage C: final latency calculation.
    FinalCalc,
}

impl Stage {
    /// Returns a stable label for the stage.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Extrapolate => "extrapolate",
            Self::DelayCalc => "delay_calc",
            Self::FinalCalc => "final_calc",
        }
    }
}

/// Reason a message was dropped.
///
/// # Invariants
/// - Variants are stable for telemetry labeling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DropReason {
    /// Service was not running.
    NotRunning,
    /// Message failed validation.
    Invalid,
    /// Queue was full and the oldest message was evicted.
    QueueFull,
    /// Outgoing port was not ready.
    NotReady,
    /// Outgoing port rejected the processed message.
    SendFailed,
}

impl DropReason {
    /// Returns a stable label for the reason.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotRunning => "not_running",
            Self::Invalid => "invalid",
            Self::QueueFull => "queue_full",
            Self::NotReady => "not_ready",
            Self::SendFailed => "send_failed",
        }
    }
}

/// Hop latency observation for one track message, in microseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HopLatency {
    /// Track identifier.
    pub track_id: i32,
    /// A to B latency.
    pub hop1_us: i64,
    /// B to C latency.
    pub hop2_us: i64,
    /// End-to-end latency.
    pub total_us: i64,
}

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Metrics sink for hop latencies and drops.
pub trait LatencyMetrics: Send + Sync {
    /// Records a latency observation.
    fn record_hops(&self, latency: HopLatency);
    /// Records a dropped message.
    fn record_drop(&self, stage: Stage, reason: DropReason);
}

/// No-op metrics sink.
///
/// # Invariants
/// - Metrics are intentionally discarded.
pub struct NoopMetrics;

impl LatencyMetrics for NoopMetrics {
    fn record_hops(&self, _latency: HopLatency) {}

    fn record_drop(&self, _stage: Stage, _reason: DropReason) {}
}

// ============================================================================
// SECTION: In-Memory Summary
// ============================================================================

/// Running statistics for one latency series.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SeriesStats {
    /// Number of samples.
    pub count: u64,
    /// Smallest sample.
    pub min_us: i64,
    /// Largest sample.
    pub max_us: i64,
    /// Arithmetic mean of all samples.
    pub mean_us: f64,
}

impl SeriesStats {
    /// Folds one sample into the series.
    #[allow(clippy::cast_precision_loss, reason = "Latency means tolerate f64 rounding.")]
    fn observe(&mut self, sample: i64) {
        if self.count == 0 {
            self.min_us = sample;
            self.max_us = sample;
        } else {
            self.min_us = self.min_us.min(sample);
            self.max_us = self.max_us.max(sample);
        }
        self.count += 1;
        self.mean_us += (sample as f64 - self.mean_us) / self.count as f64;
    }
}

/// Snapshot of a [`LatencySummary`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct LatencySnapshot {
    /// A to B latency series.
    pub hop1: SeriesStats,
    /// B to C latency series.
    pub hop2: SeriesStats,
    /// End-to-end latency series.
    pub total: SeriesStats,
    /// Messages dropped for any reason.
    pub dropped: u64,
}

/// Metrics sink keeping running latency statistics in memory.
#[derive(Debug, Default)]
pub struct LatencySummary {
    /// Aggregated state.
    state: Mutex<LatencySnapshot>,
}

impl LatencySummary {
    /// Creates an empty summary.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current statistics.
    #[must_use]
    pub fn snapshot(&self) -> LatencySnapshot {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl LatencyMetrics for LatencySummary {
    fn record_hops(&self, latency: HopLatency) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.hop1.observe(latency.hop1_us);
        state.hop2.observe(latency.hop2_us);
        state.total.observe(latency.total_us);
    }

    fn record_drop(&self, _stage: Stage, _reason: DropReason) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.dropped += 1;
    }
}
