// crates/hexatrack-adapters/src/error.rs
// ============================================================================
// Module: Adapter Errors
// Description: Errors raised while starting adapters and pipelines.
// Purpose: Keep lifecycle failures typed and distinct from send failures.
// Dependencies: hexatrack-transport, thiserror
// ============================================================================

//! Errors raised while starting adapters and pipelines.

use hexatrack_transport::TransportError;
use thiserror::Error;

/// Adapter lifecycle errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdapterError {
    /// The socket rejected an attach or join.
    #[error("socket error: {0}")]
    Socket(#[from] TransportError),
    /// The adapter's socket is already closed.
    #[error("socket for {0} is not open")]
    NotOpen(String),
    /// The adapter or pipeline could not start.
    #[error("start failed: {0}")]
    Start(String),
}
