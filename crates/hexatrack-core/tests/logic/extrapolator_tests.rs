// crates/hexatrack-core/tests/logic/extrapolator_tests.rs
// ============================================================================
// Module: Track Extrapolator Tests
// Description: Stage A schedule and forwarding tests.
// Purpose: Validate offsets, projected states, and emit pacing.
// Dependencies: hexatrack-core, tokio
// ============================================================================

//! ## Overview
//! Exercises [`hexatrack_core::logic::TrackDataExtrapolator`].

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

use std::sync::Arc;
use std::time::Duration;

use hexatrack_core::ExtrapTrackData;
use hexatrack_core::IncomingPort;
use hexatrack_core::LatencySummary;
use hexatrack_core::LogicError;
use hexatrack_core::ManualClock;
use hexatrack_core::logic::ExtrapolationSchedule;
use hexatrack_core::logic::TrackDataExtrapolator;
use hexatrack_core::logic::extrapolate_at;
use hexatrack_core::logic::extrapolator::MAX_EXTRAPOLATION_STEPS;

use super::common::RecordingPort;
use super::common::SAMPLE_REPORT_MS;
use super::common::sample_track;

// ============================================================================
// SECTION: Schedule
// ============================================================================

/// Tests the default 8 Hz to 100 Hz schedule yields 13 offsets.
#[test]
fn default_schedule_yields_thirteen_offsets() {
    let offsets = ExtrapolationSchedule::default().offsets();
    assert_eq!(offsets.len(), 13);
    assert!(offsets[0].abs() < f64::EPSILON);
    assert!((offsets[12] - 0.12).abs() < 1e-12);
}

/// Tests offsets stop strictly before one input interval.
#[test]
fn schedule_excludes_full_input_interval() {
    let schedule = ExtrapolationSchedule::new(10.0, 100.0).expect("schedule");
    let offsets = schedule.offsets();
    assert_eq!(offsets.len(), 10);
    assert!(offsets.iter().all(|offset| *offset < 0.1));
}

/// Tests an output rate below the input rate still emits the report itself.
#[test]
fn slow_output_rate_emits_single_offset() {
    let schedule = ExtrapolationSchedule::new(8.0, 2.0).expect("schedule");
    assert_eq!(schedule.offsets(), vec![0.0]);
}

/// Tests huge rate ratios are capped.
#[test]
fn schedule_is_capped() {
    let schedule = ExtrapolationSchedule::new(0.001, 1.0e9).expect("schedule");
    assert_eq!(schedule.offsets().len(), MAX_EXTRAPOLATION_STEPS);
}

/// Tests non-positive and non-finite rates are rejected.
#[test]
fn schedule_rejects_invalid_rates() {
    assert!(matches!(
        ExtrapolationSchedule::new(0.0, 100.0),
        Err(LogicError::InvalidFrequency { name: "input_hz", .. })
    ));
    assert!(matches!(
        ExtrapolationSchedule::new(8.0, f64::NAN),
        Err(LogicError::InvalidFrequency { name: "output_hz", .. })
    ));
    assert!(ExtrapolationSchedule::new(-8.0, 100.0).is_err());
}

// ============================================================================
// SECTION: Projection
// ============================================================================

/// Tests constant-velocity projection and microsecond update time.
#[test]
fn extrapolate_at_projects_position_and_time() {
    let track = sample_track(21);
    let extrap = extrapolate_at(&track, 0.05, 77);

    assert_eq!(extrap.position, track.position.advanced(&track.velocity, 0.05));
    assert!((extrap.position.x - (10_000.0 + 100.0 * 0.05)).abs() < 1e-9);
    assert!((extrap.position.y - (20_000.0 - 50.0 * 0.05)).abs() < 1e-9);
    assert_eq!(extrap.update_time, SAMPLE_REPORT_MS * 1_000 + 50_000);
    assert_eq!(extrap.first_hop_sent_time, 77);
    assert_eq!(extrap.velocity, track.velocity);
}

// ============================================================================
// SECTION: Forwarding
// ============================================================================

/// Tests one report produces 13 ordered states stamped by the clock.
#[tokio::test]
async fn process_and_forward_emits_all_states() {
    let outgoing = Arc::new(RecordingPort::<ExtrapTrackData>::new());
    let clock = Arc::new(ManualClock::new(1_700_000_000_000_500));
    let extrapolator =
        TrackDataExtrapolator::new(outgoing.clone(), clock).with_emit_interval(Duration::ZERO);

    let sent = extrapolator.process_and_forward(&sample_track(21)).await;

    assert_eq!(sent, 13);
    let messages = outgoing.messages();
    assert_eq!(messages.len(), 13);
    for (index, message) in messages.iter().enumerate() {
        let step = i64::try_from(index).unwrap();
        assert_eq!(message.update_time, SAMPLE_REPORT_MS * 1_000 + step * 10_000);
        assert_eq!(message.first_hop_sent_time, 1_700_000_000_000_500);
        assert_eq!(message.track_id, 21);
    }
}

/// Tests states are paced by the emit interval with no trailing wait.
#[tokio::test(start_paused = true)]
async fn process_and_forward_paces_emission() {
    let outgoing = Arc::new(RecordingPort::<ExtrapTrackData>::new());
    let clock = Arc::new(ManualClock::new(1_000));
    let extrapolator = TrackDataExtrapolator::new(outgoing.clone(), clock);

    let started = tokio::time::Instant::now();
    extrapolator.process_and_forward(&sample_track(21)).await;

    let elapsed = started.elapsed();
    assert!(elapsed >= Duration::from_millis(120));
    assert!(elapsed < Duration::from_millis(130));
    assert_eq!(outgoing.count(), 13);
}

/// Tests send failures are counted out of the result but do not abort.
#[tokio::test]
async fn process_and_forward_continues_after_send_failure() {
    let outgoing = Arc::new(RecordingPort::<ExtrapTrackData>::failing());
    let clock = Arc::new(ManualClock::new(1_000));
    let extrapolator = TrackDataExtrapolator::new(outgoing, clock).with_emit_interval(Duration::ZERO);

    assert_eq!(extrapolator.process_and_forward(&sample_track(21)).await, 0);
}

/// Tests invalid reports are dropped before extrapolation.
#[tokio::test]
async fn submit_drops_invalid_track() {
    let outgoing = Arc::new(RecordingPort::<ExtrapTrackData>::new());
    let metrics = Arc::new(LatencySummary::new());
    let extrapolator = TrackDataExtrapolator::new(outgoing.clone(), Arc::new(ManualClock::new(1_000)))
        .with_emit_interval(Duration::ZERO)
        .with_metrics(metrics.clone());

    extrapolator.submit(sample_track(0)).await;
    assert_eq!(outgoing.count(), 0);
    assert_eq!(metrics.snapshot().dropped, 1);

    extrapolator.submit(sample_track(1)).await;
    assert_eq!(outgoing.count(), 13);
}

/// Tests a custom schedule changes the number of emitted states.
#[tokio::test]
async fn custom_schedule_controls_state_count() {
    let outgoing = Arc::new(RecordingPort::<ExtrapTrackData>::new());
    let extrapolator = TrackDataExtrapolator::new(outgoing.clone(), Arc::new(ManualClock::new(1_000)))
        .with_schedule(ExtrapolationSchedule::new(4.0, 20.0).expect("schedule"))
        .with_emit_interval(Duration::ZERO);

    extrapolator.submit(sample_track(2)).await;

    assert_eq!(outgoing.count(), 5);
}
