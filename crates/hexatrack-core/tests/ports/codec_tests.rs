// crates/hexatrack-core/tests/ports/codec_tests.rs
// ============================================================================
// Module: Track Codec Tests
// Description: Wire layout tests for the four track message types.
// Purpose: Pin sizes, field order, and truncation handling.
// Dependencies: hexatrack-core, proptest
// ============================================================================

//! ## Overview
//! Exercises [`hexatrack_core::WireMessage`] encode/decode for every track type.

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

use hexatrack_core::DelayCalcTrackData;
use hexatrack_core::Ecef;
use hexatrack_core::ExtrapTrackData;
use hexatrack_core::FinalCalcTrackData;
use hexatrack_core::TrackData;
use hexatrack_core::TrackError;
use hexatrack_core::WireMessage;
use proptest::prelude::*;

use super::common::sample_delay_calc;
use super::common::sample_extrap;
use super::common::sample_track;

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn read_i32(bytes: &[u8], offset: usize) -> i32 {
    i32::from_le_bytes(bytes[offset .. offset + 4].try_into().unwrap())
}

fn read_f64(bytes: &[u8], offset: usize) -> f64 {
    f64::from_le_bytes(bytes[offset .. offset + 8].try_into().unwrap())
}

fn read_i64(bytes: &[u8], offset: usize) -> i64 {
    i64::from_le_bytes(bytes[offset .. offset + 8].try_into().unwrap())
}

// ============================================================================
// SECTION: Layout Tests
// ============================================================================

/// Tests wire sizes match the packed layouts.
#[test]
fn wire_sizes_match_packed_layout() {
    assert_eq!(TrackData::WIRE_SIZE, 60);
    assert_eq!(ExtrapTrackData::WIRE_SIZE, 76);
    assert_eq!(DelayCalcTrackData::WIRE_SIZE, 92);
    assert_eq!(FinalCalcTrackData::WIRE_SIZE, 116);

    assert_eq!(sample_track(7).encode().len(), TrackData::WIRE_SIZE);
    assert_eq!(sample_extrap(7, 5_000).encode().len(), ExtrapTrackData::WIRE_SIZE);
    assert_eq!(sample_delay_calc(7, 300, 9_000).encode().len(), DelayCalcTrackData::WIRE_SIZE);
}

/// Tests track data fields are little-endian in declaration order.
#[test]
fn track_data_field_order_is_id_velocity_position_time() {
    let track = TrackData::new(42, Ecef::new(1.5, -2.5, 3.5), Ecef::new(10.0, 20.0, 30.0), 123_456);
    let bytes = track.encode();

    assert_eq!(read_i32(&bytes, 0), 42);
    assert_eq!(read_f64(&bytes, 4), 1.5);
    assert_eq!(read_f64(&bytes, 12), -2.5);
    assert_eq!(read_f64(&bytes, 20), 3.5);
    assert_eq!(read_f64(&bytes, 28), 10.0);
    assert_eq!(read_f64(&bytes, 36), 20.0);
    assert_eq!(read_f64(&bytes, 44), 30.0);
    assert_eq!(read_i64(&bytes, 52), 123_456);
}

/// Tests final calc timestamps follow the hop order on the wire.
#[test]
fn final_calc_timestamps_follow_hop_order() {
    let delay = DelayCalcTrackData::from_extrap(&sample_extrap(9, 1_000), 200, 1_200);
    let final_data = FinalCalcTrackData::from_delay_calc(&delay, 300, 1_500);
    let bytes = final_data.encode();

    assert_eq!(read_i64(&bytes, 52), final_data.original_update_time);
    assert_eq!(read_i64(&bytes, 60), final_data.update_time);
    assert_eq!(read_i64(&bytes, 68), 1_000);
    assert_eq!(read_i64(&bytes, 76), 200);
    assert_eq!(read_i64(&bytes, 84), 1_200);
    assert_eq!(read_i64(&bytes, 92), 300);
    assert_eq!(read_i64(&bytes, 100), 500);
    assert_eq!(read_i64(&bytes, 108), 1_500);
}

/// Tests each stage extension preserves the fields it inherits.
#[test]
fn stage_extensions_preserve_inherited_fields() {
    let track = sample_track(11);
    let extrap = sample_extrap(11, 2_000);
    assert_eq!(extrap.track_id, track.track_id);
    assert_eq!(extrap.velocity, track.velocity);
    assert_eq!(extrap.original_update_time, track.original_update_time);

    let delay = DelayCalcTrackData::from_extrap(&extrap, 150, 2_150);
    assert_eq!(delay.position, extrap.position);
    assert_eq!(delay.update_time, extrap.update_time);
    assert_eq!(delay.first_hop_sent_time, 2_000);

    let final_data = FinalCalcTrackData::from_delay_calc(&delay, 50, 2_200);
    assert_eq!(final_data.first_hop_delay_time, 150);
    assert_eq!(final_data.second_hop_sent_time, 2_150);
    assert_eq!(final_data.total_delay_time, 200);
}

// ============================================================================
// SECTION: Decode Tests
// ============================================================================

/// Tests decode restores an encoded delay calc message.
#[test]
fn decode_restores_delay_calc() {
    let delay = sample_delay_calc(77, 420, 1_700_000_000_001_000);
    let decoded = DelayCalcTrackData::decode(&delay.encode()).expect("decode");
    assert_eq!(decoded, delay);
}

/// Tests decode ignores bytes beyond the wire size.
#[test]
fn decode_ignores_trailing_bytes() {
    let track = sample_track(5);
    let mut bytes = track.encode().to_vec();
    bytes.extend_from_slice(&[0xAB; 16]);
    let decoded = TrackData::decode(&bytes).expect("decode");
    assert_eq!(decoded, track);
}

/// Tests decode reports truncated input with expected and actual sizes.
#[test]
fn decode_rejects_truncated_input() {
    let bytes = sample_extrap(5, 1_000).encode();
    let err = ExtrapTrackData::decode(&bytes[.. 75]).unwrap_err();
    assert_eq!(
        err,
        TrackError::Truncated {
            message: "ExtrapTrackData",
            expected: 76,
            actual: 75,
        }
    );
}

/// Tests decode of an empty buffer fails without panicking.
#[test]
fn decode_rejects_empty_input() {
    assert!(matches!(FinalCalcTrackData::decode(&[]), Err(TrackError::Truncated { actual: 0, .. })));
}

/// Tests decode validates the fields it reads.
#[test]
fn decode_rejects_invalid_fields() {
    let track = TrackData::new(0, Ecef::new(0.0, 0.0, 0.0), Ecef::new(0.0, 0.0, 0.0), 1);
    let err = TrackData::decode(&track.encode()).unwrap_err();
    assert!(matches!(err, TrackError::Invalid { field: "track_id", .. }));
}

// ============================================================================
// SECTION: Property Tests
// ============================================================================

fn coordinate() -> impl Strategy<Value = f64> {
    -9.9e10 .. 9.9e10
}

proptest! {
    #[test]
    fn valid_tracks_survive_decode(
        track_id in 1 .. 10_000i32,
        vx in -1.0e6 .. 1.0e6f64,
        px in coordinate(),
        py in coordinate(),
        pz in coordinate(),
        time in 0 .. 9_223_372_036_854_775i64,
    ) {
        let track = TrackData::new(track_id, Ecef::new(vx, -vx, 0.0), Ecef::new(px, py, pz), time);
        let decoded = TrackData::decode(&track.encode()).unwrap();
        prop_assert_eq!(decoded, track);
    }

    #[test]
    fn arbitrary_bytes_never_panic(bytes in prop::collection::vec(any::<u8>(), 0 .. 200)) {
        let _ = TrackData::decode(&bytes);
        let _ = ExtrapTrackData::decode(&bytes);
        let _ = DelayCalcTrackData::decode(&bytes);
        let _ = FinalCalcTrackData::decode(&bytes);
    }
}
