// crates/hexatrack-adapters/src/pipeline.rs
// ============================================================================
// Module: Pipelines
// Description: Adapter pairs and the manager that drives them.
// Purpose: Start and stop every adapter of a stage in a safe order.
// Dependencies: tracing
// ============================================================================

//! ## Overview
//! A [`MessagePipeline`] pairs an optional incoming adapter with an optional
//! outgoing adapter. The outgoing side starts first so the exit is ready
//! before the first message arrives; stopping runs in reverse.
//! [`AdapterManager`] owns the pipelines of one stage process and can stop
//! the two sides separately, so a stage can drain its domain worker while
//! the exits are still open.
//! Invariants:
//! - `start_all` attempts every pipeline even after a failure.
//! - `stop_all` stops every incoming adapter before any outgoing adapter.
//! - `stop_all` is idempotent.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::sync::PoisonError;
use std::sync::RwLock;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;

use crate::adapter::Adapter;
use crate::error::AdapterError;

// ============================================================================
// SECTION: Pipeline
// ============================================================================

/// Named pair of incoming and outgoing adapters.
pub struct MessagePipeline {
    /// Pipeline name.
    name: String,
    /// Receiving side.
    incoming: Option<Arc<dyn Adapter>>,
    /// Emitting side.
    outgoing: Option<Arc<dyn Adapter>>,
}

impl MessagePipeline {
    /// Creates an empty pipeline.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            incoming: None,
            outgoing: None,
        }
    }

    /// Sets the incoming adapter.
    #[must_use]
    pub fn with_incoming(mut self, adapter: Arc<dyn Adapter>) -> Self {
        self.incoming = Some(adapter);
        self
    }

    /// Sets the outgoing adapter.
    #[must_use]
    pub fn with_outgoing(mut self, adapter: Arc<dyn Adapter>) -> Self {
        self.outgoing = Some(adapter);
        self
    }

    /// Returns the pipeline name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the incoming adapter, if any.
    #[must_use]
    pub fn incoming(&self) -> Option<&Arc<dyn Adapter>> {
        self.incoming.as_ref()
    }

    /// Returns the outgoing adapter, if any.
    #[must_use]
    pub fn outgoing(&self) -> Option<&Arc<dyn Adapter>> {
        self.outgoing.as_ref()
    }

    /// Starts the outgoing adapter, then the incoming adapter.
    ///
    /// # Errors
    ///
    /// Returns the first [`AdapterError`]; later adapters are not started.
    pub async fn start(&self) -> Result<(), AdapterError> {
        for adapter in [&self.outgoing, &self.incoming].into_iter().flatten() {
            adapter.start().await.map_err(|err| {
                tracing::error!(pipeline = %self.name, adapter = adapter.name(), error = %err, "adapter failed to start");
                err
            })?;
        }
        Ok(())
    }

    /// Stops the incoming adapter, then the outgoing adapter.
    pub async fn stop(&self) {
        self.stop_incoming().await;
        self.stop_outgoing().await;
    }

    /// Stops only the incoming adapter.
    pub async fn stop_incoming(&self) {
        if let Some(adapter) = &self.incoming {
            adapter.stop().await;
        }
    }

    /// Stops only the outgoing adapter.
    pub async fn stop_outgoing(&self) {
        if let Some(adapter) = &self.outgoing {
            adapter.stop().await;
        }
    }

    /// Returns true when every present adapter is running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        [&self.incoming, &self.outgoing].into_iter().flatten().all(|adapter| adapter.is_running())
    }
}

// ============================================================================
// SECTION: Manager
// ============================================================================

/// Owner of every pipeline in a stage process.
#[derive(Default)]
pub struct AdapterManager {
    /// Registered pipelines in registration order.
    pipelines: RwLock<Vec<Arc<MessagePipeline>>>,
    /// Set when the last `start_all` started every pipeline.
    running: AtomicBool,
}

impl AdapterManager {
    /// Creates an empty manager.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a pipeline.
    pub fn register(&self, pipeline: MessagePipeline) {
        tracing::info!(pipeline = %pipeline.name(), "registering pipeline");
        self.pipelines.write().unwrap_or_else(PoisonError::into_inner).push(Arc::new(pipeline));
    }

    /// Starts every pipeline in registration order.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::Start`] naming how many pipelines started when
    /// any of them failed.
    pub async fn start_all(&self) -> Result<(), AdapterError> {
        let pipelines = self.snapshot();
        tracing::info!(count = pipelines.len(), "starting pipelines");
        let mut started = 0_usize;
        for pipeline in &pipelines {
            match pipeline.start().await {
                Ok(()) => {
                    started += 1;
                    tracing::info!(pipeline = %pipeline.name(), "pipeline started");
                }
                Err(err) => tracing::error!(pipeline = %pipeline.name(), error = %err, "pipeline failed to start"),
            }
        }
        let all_started = started == pipelines.len();
        self.running.store(all_started, Ordering::Release);
        tracing::info!(started, total = pipelines.len(), "pipelines started");
        if all_started {
            Ok(())
        } else {
            Err(AdapterError::Start(format!("started {started}/{} pipelines", pipelines.len())))
        }
    }

    /// Stops every pipeline: all incoming adapters, then all outgoing ones.
    pub async fn stop_all(&self) {
        self.stop_incoming().await;
        self.stop_outgoing().await;
    }

    /// Stops the incoming adapter of every pipeline.
    pub async fn stop_incoming(&self) {
        let pipelines = self.snapshot();
        self.running.store(false, Ordering::Release);
        for pipeline in &pipelines {
            pipeline.stop_incoming().await;
        }
        tracing::debug!(count = pipelines.len(), "incoming adapters stopped");
    }

    /// Stops the outgoing adapter of every pipeline.
    pub async fn stop_outgoing(&self) {
        let pipelines = self.snapshot();
        self.running.store(false, Ordering::Release);
        for pipeline in &pipelines {
            pipeline.stop_outgoing().await;
        }
        tracing::info!(count = pipelines.len(), "all pipelines stopped");
    }

    /// Returns the number of registered pipelines.
    #[must_use]
    pub fn pipeline_count(&self) -> usize {
        self.pipelines.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Returns true after a fully successful `start_all` until `stop_all`.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Returns the pipeline named `name`.
    #[must_use]
    pub fn pipeline(&self, name: &str) -> Option<Arc<MessagePipeline>> {
        self.pipelines
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|pipeline| pipeline.name() == name)
            .cloned()
    }

    /// Returns the registered pipeline names.
    #[must_use]
    pub fn pipeline_names(&self) -> Vec<String> {
        self.snapshot().iter().map(|pipeline| pipeline.name().to_string()).collect()
    }

    /// Clones the pipeline list so no lock is held across awaits.
    fn snapshot(&self) -> Vec<Arc<MessagePipeline>> {
        self.pipelines.read().unwrap_or_else(PoisonError::into_inner).clone()
    }
}
