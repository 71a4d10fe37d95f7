// crates/hexatrack-core/src/lib.rs
// ============================================================================
// Module: Hexatrack Core Library
// Description: Domain models, port contracts, and pipeline logic.
// Purpose: Single source of truth for track messages and hop latency math.
// Dependencies: async-trait, bytes, serde, thiserror, tokio, tracing
// ============================================================================

//! ## Overview
//! `hexatrack-core` is the domain hexagon shared by every pipeline stage. It
//! defines the four track message types and their fixed little-endian wire
//! layouts, the incoming/outgoing port traits adapters plug into, and the
//! stage services:
//!
//! - [`logic::TrackDataExtrapolator`] (stage A, 8 Hz to 100 Hz)
//! - [`logic::ProcessTrackUseCase`] (stage B, first-hop delay)
//! - [`logic::FinalCalculationService`] and [`logic::TargetStatisticService`]
//!   (stage C, second-hop and total delay)
//!
//! Invariants:
//! - Decoded track messages are always valid.
//! - Domain services never block on I/O; all I/O goes through ports.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod error;
pub mod logic;
pub mod model;
pub mod ports;
pub mod telemetry;
pub mod time;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use error::LogicError;
pub use error::PortError;
pub use error::TrackError;
pub use ports::DelayCalcTrackData;
pub use ports::Ecef;
pub use ports::ExtrapTrackData;
pub use ports::FanOut;
pub use ports::FinalCalcTrackData;
pub use ports::IncomingPort;
pub use ports::OutgoingPort;
pub use ports::TrackData;
pub use ports::WireMessage;
pub use telemetry::LatencyMetrics;
pub use telemetry::LatencySummary;
pub use telemetry::NoopMetrics;
pub use time::Clock;
pub use time::ManualClock;
pub use time::SystemClock;
