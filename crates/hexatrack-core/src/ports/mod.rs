// crates/hexatrack-core/src/ports/mod.rs
// ============================================================================
// Module: Hexatrack Ports
// Description: Canonical track messages and the port traits around them.
// Purpose: Define the boundary between domain services and adapters.
// Dependencies: async-trait, bytes, serde
// ============================================================================

//! ## Overview
//! Ports are the only way domain services talk to the outside world.
//! Incoming adapters call an [`IncomingPort`]; services emit through an
//! [`OutgoingPort`]. The message types here are the canonical definitions;
//! [`crate::model`] re-exports them under the legacy path.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod incoming;
pub mod outgoing;
pub mod track;
pub mod wire;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use incoming::DelayCalcTrackDataIncomingPort;
pub use incoming::ExtrapTrackDataIncomingPort;
pub use incoming::IncomingPort;
pub use incoming::TrackDataIncomingPort;
pub use outgoing::DelayCalcTrackDataOutgoingPort;
pub use outgoing::ExtrapTrackDataOutgoingPort;
pub use outgoing::FanOut;
pub use outgoing::FinalTrackDataOutgoingPort;
pub use outgoing::OutgoingPort;
pub use track::DelayCalcTrackData;
pub use track::Ecef;
pub use track::ExtrapTrackData;
pub use track::FinalCalcTrackData;
pub use track::TrackData;
pub use wire::MAX_POSITION_ECEF;
pub use wire::MAX_TIMESTAMP;
pub use wire::MAX_TRACK_ID;
pub use wire::MIN_TRACK_ID;
pub use wire::WireMessage;
