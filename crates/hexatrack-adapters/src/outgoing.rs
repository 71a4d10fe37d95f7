// crates/hexatrack-adapters/src/outgoing.rs
// ============================================================================
// Module: RADIO Outgoing Adapter
// Description: Outgoing port publishing encoded messages to one group.
// Purpose: Carry a stage's output onto its RADIO/DISH channel.
// Dependencies: hexatrack-core, hexatrack-transport, tracing
// ============================================================================

//! ## Overview
//! [`RadioOutgoingAdapter`] connects its RADIO socket on start and publishes
//! every valid message it is handed to its group.
//! Invariants:
//! - Nothing is published while the adapter is stopped.
//! - Invalid messages are rejected before encoding.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::marker::PhantomData;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

use async_trait::async_trait;
use hexatrack_core::OutgoingPort;
use hexatrack_core::PortError;
use hexatrack_core::WireMessage;
use hexatrack_transport::Endpoint;
use hexatrack_transport::MessageSocket;

use crate::adapter::Adapter;
use crate::error::AdapterError;

// ============================================================================
// SECTION: Adapter
// ============================================================================

/// Outgoing adapter publishing `M` through a RADIO socket.
pub struct RadioOutgoingAdapter<M> {
    /// `"{group}-OutAdapter"`.
    name: String,
    /// Endpoint the RADIO connects to.
    endpoint: Endpoint,
    /// Destination group.
    group: String,
    /// RADIO socket.
    socket: Arc<dyn MessageSocket>,
    /// Set between `start` and `stop`.
    running: AtomicBool,
    /// Messages published.
    sent: AtomicU64,
    /// Message type published.
    _message: PhantomData<fn(&M)>,
}

impl<M: WireMessage> RadioOutgoingAdapter<M> {
    /// Creates a stopped adapter.
    #[must_use]
    pub fn new(socket: Arc<dyn MessageSocket>, endpoint: Endpoint, group: impl Into<String>) -> Self {
        let group = group.into();
        Self {
            name: format!("{group}-OutAdapter"),
            endpoint,
            group,
            socket,
            running: AtomicBool::new(false),
            sent: AtomicU64::new(0),
            _message: PhantomData,
        }
    }

    /// Returns the destination group.
    #[must_use]
    pub fn group(&self) -> &str {
        &self.group
    }

    /// Returns how many messages were published.
    #[must_use]
    pub fn sent_count(&self) -> u64 {
        self.sent.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl<M: WireMessage> Adapter for RadioOutgoingAdapter<M> {
    fn name(&self) -> &str {
        &self.name
    }

    async fn start(&self) -> Result<(), AdapterError> {
        if self.running.load(Ordering::Acquire) {
            tracing::warn!(adapter = %self.name, "adapter already running");
            return Ok(());
        }
        if !self.socket.is_open() {
            return Err(AdapterError::NotOpen(self.name.clone()));
        }
        self.socket.connect(&self.endpoint).await?;
        self.running.store(true, Ordering::Release);
        tracing::info!(adapter = %self.name, endpoint = %self.endpoint, group = %self.group, "adapter started");
        Ok(())
    }

    async fn stop(&self) {
        if !self.running.swap(false, Ordering::AcqRel) {
            return;
        }
        self.socket.close().await;
        tracing::info!(adapter = %self.name, sent = self.sent_count(), "adapter stopped");
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }
}

#[async_trait]
impl<M: WireMessage> OutgoingPort<M> for RadioOutgoingAdapter<M> {
    async fn send(&self, message: &M) -> Result<(), PortError> {
        if !self.running.load(Ordering::Acquire) {
            tracing::warn!(adapter = %self.name, track_id = message.track_id(), "adapter not running, dropping");
            return Err(PortError::NotRunning);
        }
        message.validate()?;
        let payload = message.encode();
        self.socket
            .send(&payload, &self.group)
            .await
            .map_err(|err| PortError::Transport(err.to_string()))?;
        self.sent.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(
            adapter = %self.name,
            track_id = message.track_id(),
            bytes = payload.len(),
            "message published"
        );
        Ok(())
    }

    fn is_ready(&self) -> bool {
        self.running.load(Ordering::Acquire) && self.socket.is_open()
    }
}
