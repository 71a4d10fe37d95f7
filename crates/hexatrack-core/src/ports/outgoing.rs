// crates/hexatrack-core/src/ports/outgoing.rs
// ============================================================================
// Module: Outgoing Ports
// Description: Exit points domain services emit processed messages through.
// Purpose: Let several adapters share one logical output.
// Dependencies: async-trait, tracing
// ============================================================================

//! ## Overview
//! An outgoing port delivers a processed message to an adapter. [`FanOut`]
//! lets one service feed several adapters (for example the RADIO
//! transmitter and a statistics sink) through a single port.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::PortError;
use crate::ports::track::DelayCalcTrackData;
use crate::ports::track::ExtrapTrackData;
use crate::ports::track::FinalCalcTrackData;

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Domain exit point for messages of type `M`.
#[async_trait]
pub trait OutgoingPort<M>: Send + Sync {
    /// Delivers a processed message.
    ///
    /// # Errors
    ///
    /// Returns [`PortError`] when the message is rejected or delivery fails.
    async fn send(&self, message: &M) -> Result<(), PortError>;

    /// Returns true when the port can accept messages.
    fn is_ready(&self) -> bool {
        true
    }
}

// ============================================================================
// SECTION: Stage Aliases
// ============================================================================

/// Stage A exit point.
pub type ExtrapTrackDataOutgoingPort = dyn OutgoingPort<ExtrapTrackData>;
/// Stage B exit point.
pub type DelayCalcTrackDataOutgoingPort = dyn OutgoingPort<DelayCalcTrackData>;
/// Stage C exit point.
pub type FinalTrackDataOutgoingPort = dyn OutgoingPort<FinalCalcTrackData>;

// ============================================================================
// SECTION: Fan-Out
// ============================================================================

/// Outgoing port that broadcasts each message to every target.
///
/// # Invariants
/// - Every target is attempted, even after an earlier target fails.
/// - The first failure is returned once all targets have been attempted.
pub struct FanOut<M> {
    /// Delivery targets in registration order.
    targets: Vec<Arc<dyn OutgoingPort<M>>>,
}

impl<M> FanOut<M> {
    /// Creates a fan-out over `targets`.
    #[must_use]
    pub fn new(targets: Vec<Arc<dyn OutgoingPort<M>>>) -> Self {
        Self {
            targets,
        }
    }

    /// Returns the number of targets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    /// Returns true when there are no targets.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

#[async_trait]
impl<M> OutgoingPort<M> for FanOut<M>
where
    M: Send + Sync + 'static,
{
    async fn send(&self, message: &M) -> Result<(), PortError> {
        let mut first_error = None;
        for target in &self.targets {
            if let Err(err) = target.send(message).await {
                tracing::warn!(error = %err, "fan-out target failed");
                first_error.get_or_insert(err);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    fn is_ready(&self) -> bool {
        self.targets.iter().any(|target| target.is_ready())
    }
}
