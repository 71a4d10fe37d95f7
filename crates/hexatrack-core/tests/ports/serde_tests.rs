// crates/hexatrack-core/tests/ports/serde_tests.rs
// ============================================================================
// Module: Track JSON Tests
// Description: JSON shape of the track message types.
// Purpose: Validate the field names JSON-lines consumers rely on.
// Dependencies: hexatrack-core, serde_json
// ============================================================================

//! ## Overview
//! Exercises the serde derives of the track message types through
//! `serde_json`.

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

use hexatrack_core::FinalCalcTrackData;
use hexatrack_core::TrackData;
use serde_json::json;

use super::common::SAMPLE_REPORT_MS;
use super::common::sample_delay_calc;
use super::common::sample_track;

/// Tests a final record serializes with flat timing fields and nested vectors.
#[test]
fn final_record_json_uses_field_names() {
    let record = FinalCalcTrackData::from_delay_calc(&sample_delay_calc(6, 300, 20_000), 500, 20_500);

    let value = serde_json::to_value(record).expect("serialize");

    assert_eq!(value["track_id"], 6);
    assert_eq!(value["first_hop_delay_time"], 300);
    assert_eq!(value["second_hop_delay_time"], 500);
    assert_eq!(value["total_delay_time"], 800);
    assert_eq!(value["third_hop_sent_time"], 20_500);
    assert_eq!(value["position"]["z"], 5_000.1);
    assert_eq!(value["velocity"]["x"], 100.0);
    let parsed: FinalCalcTrackData = serde_json::from_value(value).expect("deserialize");
    assert_eq!(parsed, record);
}

/// Tests a track report parses from a hand-written JSON object.
#[test]
fn track_report_parses_from_json() {
    let value = json!({
        "track_id": 42,
        "velocity": { "x": 100.0, "y": -50.0, "z": 10.0 },
        "position": { "x": 10_000.0, "y": 20_000.0, "z": 5_000.0 },
        "original_update_time": SAMPLE_REPORT_MS,
    });

    let track: TrackData = serde_json::from_value(value).expect("deserialize");

    assert_eq!(track, sample_track(42));
}

/// Tests a JSON object missing a field is rejected.
#[test]
fn track_report_requires_every_field() {
    let value = json!({ "track_id": 42, "original_update_time": SAMPLE_REPORT_MS });
    assert!(serde_json::from_value::<TrackData>(value).is_err());
}
