// crates/hexatrack-core/tests/logic/telemetry_tests.rs
// ============================================================================
// Module: Telemetry and Clock Tests
// Description: Latency summary aggregation and clock sources.
// Purpose: Validate running statistics and deterministic clocks.
// Dependencies: hexatrack-core
// ============================================================================

//! ## Overview
//! Exercises [`hexatrack_core::LatencySummary`] and the clock types.

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

use hexatrack_core::Clock;
use hexatrack_core::LatencyMetrics;
use hexatrack_core::LatencySummary;
use hexatrack_core::ManualClock;
use hexatrack_core::SystemClock;
use hexatrack_core::telemetry::DropReason;
use hexatrack_core::telemetry::HopLatency;
use hexatrack_core::telemetry::Stage;

/// Tests the summary keeps min, max, and mean per series.
#[test]
fn summary_tracks_running_statistics() {
    let summary = LatencySummary::new();
    for (hop1, hop2) in [(100, 50), (300, 150), (200, 100)] {
        summary.record_hops(HopLatency {
            track_id: 1,
            hop1_us: hop1,
            hop2_us: hop2,
            total_us: hop1 + hop2,
        });
    }
    summary.record_drop(Stage::DelayCalc, DropReason::QueueFull);

    let snapshot = summary.snapshot();
    assert_eq!(snapshot.hop1.count, 3);
    assert_eq!(snapshot.hop1.min_us, 100);
    assert_eq!(snapshot.hop1.max_us, 300);
    assert!((snapshot.hop1.mean_us - 200.0).abs() < 1e-9);
    assert_eq!(snapshot.total.max_us, 450);
    assert_eq!(snapshot.dropped, 1);
}

/// Tests telemetry labels are stable.
#[test]
fn telemetry_labels_are_stable() {
    assert_eq!(Stage::Extrapolate.as_str(), "extrapolate");
    assert_eq!(Stage::FinalCalc.as_str(), "final_calc");
    assert_eq!(DropReason::QueueFull.as_str(), "queue_full");
    assert_eq!(DropReason::NotReady.as_str(), "not_ready");
    assert_eq!(DropReason::SendFailed.as_str(), "send_failed");
}

/// Tests the manual clock is settable and advances.
#[test]
fn manual_clock_is_deterministic() {
    let clock = ManualClock::new(1_500_000);
    assert_eq!(clock.now_millis(), 1_500);
    clock.advance(250);
    assert_eq!(clock.now_micros(), 1_500_250);
    clock.set(7);
    assert_eq!(clock.now_micros(), 7);
}

/// Tests the system clock reports microseconds after 2020.
#[test]
fn system_clock_reports_epoch_micros() {
    let now = SystemClock.now_micros();
    assert!(now > 1_577_836_800_000_000);
    let millis = SystemClock.now_millis();
    assert!(millis >= now / 1_000);
}
