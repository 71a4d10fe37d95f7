// crates/hexatrack-core/src/logic/calculator.rs
// ============================================================================
// Module: Delay Calculator
// Description: First-hop delay computation for stage B.
// Purpose: Turn ExtrapTrackData into DelayCalcTrackData.
// Dependencies: tracing
// ============================================================================

//! ## Overview
//! The calculator reads the clock once per message: that instant is both the
//! end of hop 1 and the start of hop 2.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use crate::ports::DelayCalcTrackData;
use crate::ports::ExtrapTrackData;
use crate::time::Clock;

// ============================================================================
// SECTION: Time Delta
// ============================================================================

/// Returns `current - original` in microseconds, or 0 when either timestamp
/// is non-positive or `current` is not later than `original`.
#[must_use]
pub const fn time_delta(original: i64, current: i64) -> i64 {
    if original <= 0 || current <= 0 || current <= original {
        return 0;
    }
    current - original
}

// ============================================================================
// SECTION: Calculator
// ============================================================================

/// Computes hop-1 delay metrics.
pub trait CalculatorService: Send + Sync {
    /// Extends `data` with its first-hop delay and second-hop send time.
    fn calculate_delay(&self, data: &ExtrapTrackData) -> DelayCalcTrackData;
}

/// Clock-driven [`CalculatorService`].
pub struct DelayCalculator {
    /// Source of the hop-2 timestamp.
    clock: Arc<dyn Clock>,
}

impl DelayCalculator {
    /// Creates a calculator reading `clock`.
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
        }
    }
}

impl CalculatorService for DelayCalculator {
    fn calculate_delay(&self, data: &ExtrapTrackData) -> DelayCalcTrackData {
        let now = self.clock.now_micros();
        if data.first_hop_sent_time <= 0 {
            tracing::warn!(
                track_id = data.track_id,
                first_hop_sent_time = data.first_hop_sent_time,
                "invalid first hop sent time"
            );
        }
        let delay = time_delta(data.first_hop_sent_time, now);
        tracing::debug!(track_id = data.track_id, hop1_us = delay, second_hop_sent_time = now, "delay calculated");
        DelayCalcTrackData::from_extrap(data, delay, now)
    }
}
