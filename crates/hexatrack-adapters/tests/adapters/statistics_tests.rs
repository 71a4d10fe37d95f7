// crates/hexatrack-adapters/tests/adapters/statistics_tests.rs
// ============================================================================
// Module: Delay Statistics Tests
// Description: Moving average window and queued statistics adapter.
// Purpose: Validate averaging, eviction, and readiness rules.
// Dependencies: hexatrack-adapters, hexatrack-core, tokio
// ============================================================================

//! ## Overview
//! Exercises [`hexatrack_adapters::MovingAverage`] and
//! [`hexatrack_adapters::DelayStatisticsAdapter`].

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
    clippy::float_cmp,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use std::time::Duration;

use hexatrack_adapters::Adapter;
use hexatrack_adapters::DelayStatisticsAdapter;
use hexatrack_adapters::MovingAverage;
use hexatrack_core::OutgoingPort;
use hexatrack_core::PortError;

use super::common::sample_delay_calc;
use super::common::wait_until;

const WAIT: Duration = Duration::from_secs(2);

/// Tests the mean covers only the most recent window of samples.
#[test]
fn moving_average_evicts_oldest_sample() {
    let mut average = MovingAverage::new(3).expect("window");
    assert!(average.is_empty());
    assert_eq!(average.average(), 0.0);

    assert_eq!(average.push(10), 10.0);
    average.push(20);
    assert_eq!(average.push(30), 20.0);
    assert_eq!(average.push(40), 30.0);
    assert_eq!(average.len(), 3);
    assert_eq!(average.window(), 3);
}

/// Tests a zero window is rejected.
#[test]
fn moving_average_rejects_zero_window() {
    assert!(MovingAverage::new(0).is_err());
}

/// Tests large delays do not overflow the running sum.
#[test]
fn moving_average_handles_large_samples() {
    let mut average = MovingAverage::new(2).expect("window");
    average.push(i64::MAX);
    assert_eq!(average.push(i64::MAX), i64::MAX as f64);
}

/// Tests queued samples fold into the moving average.
#[tokio::test]
async fn adapter_averages_first_hop_delay() {
    let adapter = DelayStatisticsAdapter::new().expect("adapter");
    adapter.start().await.expect("start");
    assert!(adapter.is_ready());

    for hop1 in [100, 200, 300] {
        adapter.send(&sample_delay_calc(1001, hop1)).await.expect("send");
    }

    assert!(wait_until(WAIT, || adapter.sample_count() == 3).await);
    assert_eq!(adapter.moving_average(), 200.0);
    adapter.stop().await;
}

/// Tests the adapter window limits the averaged samples.
#[tokio::test]
async fn adapter_window_limits_samples() {
    let adapter = DelayStatisticsAdapter::with_limits(10, 2, Duration::from_millis(10)).expect("adapter");
    adapter.start().await.expect("start");

    for hop1 in [100, 200, 300] {
        adapter.send(&sample_delay_calc(1, hop1)).await.expect("send");
    }

    assert!(wait_until(WAIT, || adapter.moving_average() == 250.0).await);
    assert_eq!(adapter.sample_count(), 2);
    adapter.stop().await;
}

/// Tests sends are refused before start and after stop.
#[tokio::test]
async fn adapter_requires_running() {
    let adapter = DelayStatisticsAdapter::new().expect("adapter");
    assert_eq!(adapter.name(), "DelayCalcTrackData-Custom-OutAdapter");
    assert!(!adapter.is_ready());
    assert_eq!(adapter.send(&sample_delay_calc(1, 100)).await, Err(PortError::NotRunning));

    adapter.start().await.expect("start");
    adapter.stop().await;
    adapter.stop().await;

    assert!(!adapter.is_running());
    assert_eq!(adapter.send(&sample_delay_calc(1, 100)).await, Err(PortError::NotRunning));
    assert_eq!(adapter.sample_count(), 0);
}

/// Tests invalid messages are rejected before queueing.
#[tokio::test]
async fn adapter_rejects_invalid_message() {
    let adapter = DelayStatisticsAdapter::new().expect("adapter");
    adapter.start().await.expect("start");

    let mut invalid = sample_delay_calc(1, 100);
    invalid.first_hop_delay_time = -1;

    assert!(matches!(adapter.send(&invalid).await, Err(PortError::Invalid(_))));
    assert_eq!(adapter.queue_len(), 0);
    adapter.stop().await;
}

/// Tests zero limits are rejected at construction.
#[test]
fn adapter_rejects_zero_limits() {
    assert!(DelayStatisticsAdapter::with_limits(0, 100, Duration::from_millis(10)).is_err());
    assert!(DelayStatisticsAdapter::with_limits(200, 0, Duration::from_millis(10)).is_err());
}
