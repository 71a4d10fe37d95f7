// crates/hexatrack-core/src/ports/track.rs
// ============================================================================
// Module: Track Messages
// Description: TrackData and its per-hop extensions.
// Purpose: Canonical message types exchanged between pipeline stages.
// Dependencies: bytes, serde
// ============================================================================

//! ## Overview
//! Each stage extends the message it receives with its own hop timestamps:
//!
//! | Type | Adds | Wire size |
//! |---|---|---|
//! | [`TrackData`] | id, velocity, position, `original_update_time` (ms) | 60 |
//! | [`ExtrapTrackData`] | `update_time`, `first_hop_sent_time` (µs) | 76 |
//! | [`DelayCalcTrackData`] | `first_hop_delay_time`, `second_hop_sent_time` | 92 |
//! | [`FinalCalcTrackData`] | `second_hop_delay_time`, `total_delay_time`, `third_hop_sent_time` | 116 |

// ============================================================================
// SECTION: Imports
// ============================================================================

use bytes::Bytes;
use serde::Deserialize;
use serde::Serialize;

use crate::error::TrackError;
use crate::ports::wire::KINEMATICS_WIRE_SIZE;
use crate::ports::wire::TIME_WIRE_SIZE;
use crate::ports::wire::WireMessage;
use crate::ports::wire::WireReader;
use crate::ports::wire::WireWriter;
use crate::ports::wire::validate_kinematics;
use crate::ports::wire::validate_times;

// ============================================================================
// SECTION: Vector
// ============================================================================

/// Earth-Centered Earth-Fixed vector (meters or meters per second).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Ecef {
    /// X component.
    pub x: f64,
    /// Y component.
    pub y: f64,
    /// Z component.
    pub z: f64,
}

impl Ecef {
    /// Creates a vector from components.
    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self {
            x,
            y,
            z,
        }
    }

    /// Returns `self + rate * dt`, component-wise.
    #[must_use]
    pub fn advanced(&self, rate: &Self, dt: f64) -> Self {
        Self::new(self.x + rate.x * dt, self.y + rate.y * dt, self.z + rate.z * dt)
    }
}

// ============================================================================
// SECTION: TrackData
// ============================================================================

/// Raw track report published at the input rate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackData {
    /// Track identifier (1..=9999).
    pub track_id: i32,
    /// Velocity in ECEF (m/s).
    pub velocity: Ecef,
    /// Position in ECEF (m).
    pub position: Ecef,
    /// Report time in milliseconds since the Unix epoch.
    pub original_update_time: i64,
}

impl TrackData {
    /// Creates a track report.
    #[must_use]
    pub const fn new(track_id: i32, velocity: Ecef, position: Ecef, original_update_time: i64) -> Self {
        Self {
            track_id,
            velocity,
            position,
            original_update_time,
        }
    }
}

impl WireMessage for TrackData {
    const NAME: &'static str = "TrackData";
    const WIRE_SIZE: usize = KINEMATICS_WIRE_SIZE + TIME_WIRE_SIZE;

    fn track_id(&self) -> i32 {
        self.track_id
    }

    fn validate(&self) -> Result<(), TrackError> {
        validate_kinematics(self.track_id, &self.velocity, &self.position)?;
        validate_times(&[("original_update_time", self.original_update_time)])
    }

    fn encode(&self) -> Bytes {
        WireWriter::with_capacity(Self::WIRE_SIZE)
            .kinematics(self.track_id, &self.velocity, &self.position)
            .time(self.original_update_time)
            .finish()
    }

    fn decode(bytes: &[u8]) -> Result<Self, TrackError> {
        let mut reader = WireReader::new(Self::NAME, Self::WIRE_SIZE, bytes)?;
        let (track_id, velocity, position) = reader.kinematics();
        let decoded = Self::new(track_id, velocity, position, reader.time());
        decoded.validate()?;
        Ok(decoded)
    }
}

// ============================================================================
// SECTION: ExtrapTrackData
// ============================================================================

/// Track state extrapolated to the output rate by stage A.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExtrapTrackData {
    /// Track identifier (1..=9999).
    pub track_id: i32,
    /// Velocity in ECEF (m/s).
    pub velocity: Ecef,
    /// Extrapolated position in ECEF (m).
    pub position: Ecef,
    /// Source report time in milliseconds.
    pub original_update_time: i64,
    /// Extrapolated state time in microseconds.
    pub update_time: i64,
    /// Time stage A sent this message, in microseconds.
    pub first_hop_sent_time: i64,
}

impl ExtrapTrackData {
    /// Extends `track` with an extrapolated position and hop-1 timestamps.
    #[must_use]
    pub const fn from_track(
        track: &TrackData,
        position: Ecef,
        update_time: i64,
        first_hop_sent_time: i64,
    ) -> Self {
        Self {
            track_id: track.track_id,
            velocity: track.velocity,
            position,
            original_update_time: track.original_update_time,
            update_time,
            first_hop_sent_time,
        }
    }
}

impl WireMessage for ExtrapTrackData {
    const NAME: &'static str = "ExtrapTrackData";
    const WIRE_SIZE: usize = KINEMATICS_WIRE_SIZE + 3 * TIME_WIRE_SIZE;

    fn track_id(&self) -> i32 {
        self.track_id
    }

    fn validate(&self) -> Result<(), TrackError> {
        validate_kinematics(self.track_id, &self.velocity, &self.position)?;
        validate_times(&[
            ("original_update_time", self.original_update_time),
            ("update_time", self.update_time),
            ("first_hop_sent_time", self.first_hop_sent_time),
        ])
    }

    fn encode(&self) -> Bytes {
        WireWriter::with_capacity(Self::WIRE_SIZE)
            .kinematics(self.track_id, &self.velocity, &self.position)
            .time(self.original_update_time)
            .time(self.update_time)
            .time(self.first_hop_sent_time)
            .finish()
    }

    fn decode(bytes: &[u8]) -> Result<Self, TrackError> {
        let mut reader = WireReader::new(Self::NAME, Self::WIRE_SIZE, bytes)?;
        let (track_id, velocity, position) = reader.kinematics();
        let decoded = Self {
            track_id,
            velocity,
            position,
            original_update_time: reader.time(),
            update_time: reader.time(),
            first_hop_sent_time: reader.time(),
        };
        decoded.validate()?;
        Ok(decoded)
    }
}

// ============================================================================
// SECTION: DelayCalcTrackData
// ============================================================================

/// Track state annotated with the first-hop delay by stage B.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DelayCalcTrackData {
    /// Track identifier (1..=9999).
    pub track_id: i32,
    /// Velocity in ECEF (m/s).
    pub velocity: Ecef,
    /// Extrapolated position in ECEF (m).
    pub position: Ecef,
    /// Source report time in milliseconds.
    pub original_update_time: i64,
    /// Extrapolated state time in microseconds.
    pub update_time: i64,
    /// Time stage A sent the message, in microseconds.
    pub first_hop_sent_time: i64,
    /// A to B latency in microseconds.
    pub first_hop_delay_time: i64,
    /// Time stage B sent this message, in microseconds.
    pub second_hop_sent_time: i64,
}

impl DelayCalcTrackData {
    /// Extends `extrap` with hop-2 timing.
    #[must_use]
    pub const fn from_extrap(
        extrap: &ExtrapTrackData,
        first_hop_delay_time: i64,
        second_hop_sent_time: i64,
    ) -> Self {
        Self {
            track_id: extrap.track_id,
            velocity: extrap.velocity,
            position: extrap.position,
            original_update_time: extrap.original_update_time,
            update_time: extrap.update_time,
            first_hop_sent_time: extrap.first_hop_sent_time,
            first_hop_delay_time,
            second_hop_sent_time,
        }
    }
}

impl WireMessage for DelayCalcTrackData {
    const NAME: &'static str = "DelayCalcTrackData";
    const WIRE_SIZE: usize = KINEMATICS_WIRE_SIZE + 5 * TIME_WIRE_SIZE;

    fn track_id(&self) -> i32 {
        self.track_id
    }

    fn validate(&self) -> Result<(), TrackError> {
        validate_kinematics(self.track_id, &self.velocity, &self.position)?;
        validate_times(&[
            ("original_update_time", self.original_update_time),
            ("update_time", self.update_time),
            ("first_hop_sent_time", self.first_hop_sent_time),
            ("first_hop_delay_time", self.first_hop_delay_time),
            ("second_hop_sent_time", self.second_hop_sent_time),
        ])
    }

    fn encode(&self) -> Bytes {
        WireWriter::with_capacity(Self::WIRE_SIZE)
            .kinematics(self.track_id, &self.velocity, &self.position)
            .time(self.original_update_time)
            .time(self.update_time)
            .time(self.first_hop_sent_time)
            .time(self.first_hop_delay_time)
            .time(self.second_hop_sent_time)
            .finish()
    }

    fn decode(bytes: &[u8]) -> Result<Self, TrackError> {
        let mut reader = WireReader::new(Self::NAME, Self::WIRE_SIZE, bytes)?;
        let (track_id, velocity, position) = reader.kinematics();
        let decoded = Self {
            track_id,
            velocity,
            position,
            original_update_time: reader.time(),
            update_time: reader.time(),
            first_hop_sent_time: reader.time(),
            first_hop_delay_time: reader.time(),
            second_hop_sent_time: reader.time(),
        };
        decoded.validate()?;
        Ok(decoded)
    }
}

// ============================================================================
// SECTION: FinalCalcTrackData
// ============================================================================

/// Track state with complete end-to-end latency, produced by stage C.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FinalCalcTrackData {
    /// Track identifier (1..=9999).
    pub track_id: i32,
    /// Velocity in ECEF (m/s).
    pub velocity: Ecef,
    /// Extrapolated position in ECEF (m).
    pub position: Ecef,
    /// Source report time in milliseconds.
    pub original_update_time: i64,
    /// Extrapolated state time in microseconds.
    pub update_time: i64,
    /// Time stage A sent the message, in microseconds.
    pub first_hop_sent_time: i64,
    /// A to B latency in microseconds.
    pub first_hop_delay_time: i64,
    /// Time stage B sent the message, in microseconds.
    pub second_hop_sent_time: i64,
    /// B to C latency in microseconds.
    pub second_hop_delay_time: i64,
    /// Sum of both hop delays in microseconds.
    pub total_delay_time: i64,
    /// Time stage C emitted this message, in microseconds.
    pub third_hop_sent_time: i64,
}

impl FinalCalcTrackData {
    /// Extends `delay` with hop-3 timing. The total is hop 1 plus hop 2.
    #[must_use]
    pub const fn from_delay_calc(
        delay: &DelayCalcTrackData,
        second_hop_delay_time: i64,
        third_hop_sent_time: i64,
    ) -> Self {
        Self {
            track_id: delay.track_id,
            velocity: delay.velocity,
            position: delay.position,
            original_update_time: delay.original_update_time,
            update_time: delay.update_time,
            first_hop_sent_time: delay.first_hop_sent_time,
            first_hop_delay_time: delay.first_hop_delay_time,
            second_hop_sent_time: delay.second_hop_sent_time,
            second_hop_delay_time,
            total_delay_time: delay.first_hop_delay_time.saturating_add(second_hop_delay_time),
            third_hop_sent_time,
        }
    }
}

impl WireMessage for FinalCalcTrackData {
    const NAME: &'static str = "FinalCalcTrackData";
    const WIRE_SIZE: usize = KINEMATICS_WIRE_SIZE + 8 * TIME_WIRE_SIZE;

    fn track_id(&self) -> i32 {
        self.track_id
    }

    fn validate(&self) -> Result<(), TrackError> {
        validate_kinematics(self.track_id, &self.velocity, &self.position)?;
        validate_times(&[
            ("original_update_time", self.original_update_time),
            ("update_time", self.update_time),
            ("first_hop_sent_time", self.first_hop_sent_time),
            ("first_hop_delay_time", self.first_hop_delay_time),
            ("second_hop_sent_time", self.second_hop_sent_time),
            ("second_hop_delay_time", self.second_hop_delay_time),
            ("total_delay_time", self.total_delay_time),
            ("third_hop_sent_time", self.third_hop_sent_time),
        ])
    }

    fn encode(&self) -> Bytes {
        WireWriter::with_capacity(Self::WIRE_SIZE)
            .kinematics(self.track_id, &self.velocity, &self.position)
            .time(self.original_update_time)
            .time(self.update_time)
            .time(self.first_hop_sent_time)
            .time(self.first_hop_delay_time)
            .time(self.second_hop_sent_time)
            .time(self.second_hop_delay_time)
            .time(self.total_delay_time)
            .time(self.third_hop_sent_time)
            .finish()
    }

    fn decode(bytes: &[u8]) -> Result<Self, TrackError> {
        let mut reader = WireReader::new(Self::NAME, Self::WIRE_SIZE, bytes)?;
        let (track_id, velocity, position) = reader.kinematics();
        let decoded = Self {
            track_id,
            velocity,
            position,
            original_update_time: reader.time(),
            update_time: reader.time(),
            first_hop_sent_time: reader.time(),
            first_hop_delay_time: reader.time(),
            second_hop_sent_time: reader.time(),
            second_hop_delay_time: reader.time(),
            total_delay_time: reader.time(),
            third_hop_sent_time: reader.time(),
        };
        decoded.validate()?;
        Ok(decoded)
    }
}
