// crates/hexatrack-core/tests/logic/calculator_tests.rs
// ============================================================================
// Module: Delay Calculator Tests
// Description: First-hop delay computation tests.
// Purpose: Validate time deltas and the stage B record builder.
// Dependencies: hexatrack-core
// ============================================================================

//! ## Overview
//! Exercises [`hexatrack_core::logic::DelayCalculator`] and
//! [`hexatrack_core::logic::time_delta`].

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

use hexatrack_core::ManualClock;
use hexatrack_core::logic::CalculatorService;
use hexatrack_core::logic::DelayCalculator;
use hexatrack_core::logic::time_delta;

use super::common::sample_extrap;

// ============================================================================
// SECTION: Time Delta
// ============================================================================

/// Tests a later timestamp yields the positive difference.
#[test]
fn time_delta_returns_positive_difference() {
    assert_eq!(time_delta(1_000, 1_750), 750);
}

/// Tests non-positive inputs and clock skew collapse to zero.
#[test]
fn time_delta_clamps_invalid_inputs_to_zero() {
    assert_eq!(time_delta(0, 1_000), 0);
    assert_eq!(time_delta(-5, 1_000), 0);
    assert_eq!(time_delta(1_000, 0), 0);
    assert_eq!(time_delta(1_000, 1_000), 0);
    assert_eq!(time_delta(2_000, 1_000), 0);
}

// ============================================================================
// SECTION: Delay Calculator
// ============================================================================

/// Tests hop 1 delay is measured against the calculator clock.
#[test]
fn calculator_measures_first_hop_delay() {
    let clock = Arc::new(ManualClock::new(1_700_000_000_005_000));
    let calculator = DelayCalculator::new(clock);
    let extrap = sample_extrap(12, 1_700_000_000_004_250);

    let delay = calculator.calculate_delay(&extrap);

    assert_eq!(delay.first_hop_delay_time, 750);
    assert_eq!(delay.second_hop_sent_time, 1_700_000_000_005_000);
    assert_eq!(delay.first_hop_sent_time, extrap.first_hop_sent_time);
    assert_eq!(delay.position, extrap.position);
}

/// Tests a missing first hop timestamp yields zero delay.
#[test]
fn calculator_reports_zero_delay_without_sent_time() {
    let clock = Arc::new(ManualClock::new(9_000));
    let calculator = DelayCalculator::new(clock);

    let delay = calculator.calculate_delay(&sample_extrap(12, 0));

    assert_eq!(delay.first_hop_delay_time, 0);
    assert_eq!(delay.second_hop_sent_time, 9_000);
}

/// Tests clock skew never produces a negative delay.
#[test]
fn calculator_clamps_clock_skew() {
    let clock = Arc::new(ManualClock::new(1_000));
    let calculator = DelayCalculator::new(clock);

    let delay = calculator.calculate_delay(&sample_extrap(12, 5_000));

    assert_eq!(delay.first_hop_delay_time, 0);
}
