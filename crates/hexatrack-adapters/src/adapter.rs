// crates/hexatrack-adapters/src/adapter.rs
// ============================================================================
// Module: Adapter Lifecycle
// Description: Start/stop contract shared by every adapter.
// Purpose: Let pipelines drive heterogeneous adapters uniformly.
// Dependencies: async-trait
// ============================================================================

//! Start/stop lifecycle contract shared by every adapter.

use async_trait::async_trait;

use crate::error::AdapterError;

/// Lifecycle contract for incoming and outgoing adapters.
///
/// # Invariants
/// - `start` on a running adapter is a no-op returning `Ok`.
/// - `stop` is idempotent and never fails.
#[async_trait]
pub trait Adapter: Send + Sync {
    /// Returns the adapter name used in logs and lookups.
    fn name(&self) -> &str;

    /// Starts the adapter.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError`] when the adapter cannot start.
    async fn start(&self) -> Result<(), AdapterError>;

    /// Stops the adapter and releases its resources.
    async fn stop(&self);

    /// Returns true while the adapter is running.
    fn is_running(&self) -> bool;
}
