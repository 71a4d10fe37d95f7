// crates/hexatrack-core/src/ports/incoming.rs
// ============================================================================
// Module: Incoming Ports
// Description: Entry points adapters use to hand messages to the domain.
// Purpose: Decouple receive loops from domain processing.
// Dependencies: async-trait
// ============================================================================

//! ## Overview
//! An incoming port accepts one decoded message at a time. Queued services
//! return as soon as the message is enqueued; direct services finish their
//! processing before returning.

// ============================================================================
// SECTION: Imports
// ============================================================================

use async_trait::async_trait;

use crate::ports::track::DelayCalcTrackData;
use crate::ports::track::ExtrapTrackData;
use crate::ports::track::TrackData;

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Domain entry point for messages of type `M`.
#[async_trait]
pub trait IncomingPort<M>: Send + Sync {
    /// Hands a decoded message to the domain.
    async fn submit(&self, message: M);
}

// ============================================================================
// SECTION: Stage Aliases
// ============================================================================

/// Stage A entry point.
pub type TrackDataIncomingPort = dyn IncomingPort<TrackData>;
/// Stage B entry point.
pub type ExtrapTrackDataIncomingPort = dyn IncomingPort<ExtrapTrackData>;
/// Stage C entry point.
pub type DelayCalcTrackDataIncomingPort = dyn IncomingPort<DelayCalcTrackData>;
