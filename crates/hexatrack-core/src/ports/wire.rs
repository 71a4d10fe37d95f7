// crates/hexatrack-core/src/ports/wire.rs
// ============================================================================
// Module: Track Wire Format
// Description: Shared binary codec and validation ranges for track messages.
// Purpose: Keep every stage on one packed little-endian layout.
// Dependencies: bytes
// ============================================================================

//! ## Overview
//! Track messages travel as packed little-endian records: an `i32` track id,
//! six `f64` kinematic components (velocity then position, x/y/z), then a run
//! of `i64` timestamps whose length depends on the message type. There is no
//! header, version byte, or padding.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt::Debug;

use bytes::Buf;
use bytes::BufMut;
use bytes::Bytes;
use bytes::BytesMut;

use crate::error::TrackError;
use crate::ports::track::Ecef;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Smallest accepted track identifier.
pub const MIN_TRACK_ID: i32 = 1;
/// Largest accepted track identifier.
pub const MAX_TRACK_ID: i32 = 9999;
/// Absolute bound on any ECEF position component, in meters.
pub const MAX_POSITION_ECEF: f64 = 9.9e10;
/// Largest accepted timestamp or delay value.
pub const MAX_TIMESTAMP: i64 = 9_223_372_036_854_775;
/// Wire size of the shared id + kinematics prefix.
pub(crate) const KINEMATICS_WIRE_SIZE: usize = 4 + 6 * 8;
/// Wire size of one timestamp field.
pub(crate) const TIME_WIRE_SIZE: usize = 8;

// ============================================================================
// SECTION: Wire Message Trait
// ============================================================================

/// Binary message contract shared by all track types.
///
/// # Invariants
/// - `encode` always yields exactly `WIRE_SIZE` bytes.
/// - `decode` only returns values for which `validate` succeeds.
pub trait WireMessage: Clone + Debug + Send + Sync + 'static {
    /// Stable message name, also used as the default messaging group.
    const NAME: &'static str;
    /// Encoded size in bytes.
    const WIRE_SIZE: usize;

    /// Returns the track identifier.
    fn track_id(&self) -> i32;

    /// Checks every field against its validation range.
    ///
    /// # Errors
    ///
    /// Returns [`TrackError::Invalid`] naming the first offending field.
    fn validate(&self) -> Result<(), TrackError>;

    /// Returns true when [`WireMessage::validate`] succeeds.
    fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// Encodes the message into its packed wire layout.
    fn encode(&self) -> Bytes;

    /// Decodes and validates a message. Trailing bytes are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`TrackError::Truncated`] for short input and
    /// [`TrackError::Invalid`] when the decoded fields are out of range.
    fn decode(bytes: &[u8]) -> Result<Self, TrackError>;
}

// ============================================================================
// SECTION: Writer
// ============================================================================

/// Append-only encoder for the packed layout.
pub(crate) struct WireWriter {
    /// Output buffer, pre-sized to the message wire size.
    buf: BytesMut,
}

impl WireWriter {
    /// Creates a writer with room for `capacity` bytes.
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(capacity),
        }
    }

    /// Writes the id + velocity + position prefix.
    pub(crate) fn kinematics(mut self, track_id: i32, velocity: &Ecef, position: &Ecef) -> Self {
        self.buf.put_i32_le(track_id);
        for value in [velocity.x, velocity.y, velocity.z, position.x, position.y, position.z] {
            self.buf.put_f64_le(value);
        }
        self
    }

    /// Writes one timestamp field.
    pub(crate) fn time(mut self, value: i64) -> Self {
        self.buf.put_i64_le(value);
        self
    }

    /// Finishes encoding.
    pub(crate) fn finish(self) -> Bytes {
        self.buf.freeze()
    }
}

// ============================================================================
// SECTION: Reader
// ============================================================================

/// Cursor over a length-checked input buffer.
pub(crate) struct WireReader<'a> {
    /// Remaining input.
    buf: &'a [u8],
}

impl<'a> WireReader<'a> {
    /// Checks `bytes` holds at least `expected` bytes for message `message`.
    pub(crate) fn new(
        message: &'static str,
        expected: usize,
        bytes: &'a [u8],
    ) -> Result<Self, TrackError> {
        if bytes.len() < expected {
            return Err(TrackError::Truncated {
                message,
                expected,
                actual: bytes.len(),
            });
        }
        Ok(Self {
            buf: bytes,
        })
    }

    /// Reads the id + velocity + position prefix.
    pub(crate) fn kinematics(&mut self) -> (i32, Ecef, Ecef) {
        let track_id = self.buf.get_i32_le();
        let velocity = Ecef::new(self.buf.get_f64_le(), self.buf.get_f64_le(), self.buf.get_f64_le());
        let position = Ecef::new(self.buf.get_f64_le(), self.buf.get_f64_le(), self.buf.get_f64_le());
        (track_id, velocity, position)
    }

    /// Reads one timestamp field.
    pub(crate) fn time(&mut self) -> i64 {
        self.buf.get_i64_le()
    }
}

// ============================================================================
// SECTION: Validation
// ============================================================================

/// Validates the id and kinematic fields shared by every track type.
pub(crate) fn validate_kinematics(
    track_id: i32,
    velocity: &Ecef,
    position: &Ecef,
) -> Result<(), TrackError> {
    if !(MIN_TRACK_ID ..= MAX_TRACK_ID).contains(&track_id) {
        return Err(TrackError::invalid(
            "track_id",
            format!("{track_id} outside {MIN_TRACK_ID}..={MAX_TRACK_ID}"),
        ));
    }
    for (field, value) in [("velocity.x", velocity.x), ("velocity.y", velocity.y), ("velocity.z", velocity.z)] {
        if !value.is_finite() {
            return Err(TrackError::invalid(field, "must be finite"));
        }
    }
    for (field, value) in [("position.x", position.x), ("position.y", position.y), ("position.z", position.z)] {
        if !value.is_finite() {
            return Err(TrackError::invalid(field, "must be finite"));
        }
        if value.abs() > MAX_POSITION_ECEF {
            return Err(TrackError::invalid(field, format!("{value} exceeds +/-{MAX_POSITION_ECEF}")));
        }
    }
    Ok(())
}

/// Validates timestamp and delay fields against `0..=MAX_TIMESTAMP`.
pub(crate) fn validate_times(fields: &[(&'static str, i64)]) -> Result<(), TrackError> {
    for &(field, value) in fields {
        if !(0 ..= MAX_TIMESTAMP).contains(&value) {
            return Err(TrackError::invalid(field, format!("{value} outside 0..={MAX_TIMESTAMP}")));
        }
    }
    Ok(())
}
