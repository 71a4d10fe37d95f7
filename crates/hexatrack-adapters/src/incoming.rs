// crates/hexatrack-adapters/src/incoming.rs
// ============================================================================
// Module: DISH Incoming Adapter
// Description: Receive loop decoding group messages into an incoming port.
// Purpose: Feed a stage service from its RADIO/DISH input channel.
// Dependencies: hexatrack-core, hexatrack-transport, tokio, tracing
// ============================================================================

//! ## Overview
//! [`DishIncomingAdapter`] binds its DISH socket, joins one group, and runs a
//! receive task that decodes each payload as `M` before submitting it.
//! Invariants:
//! - Undecodable payloads are counted and skipped, never submitted.
//! - The receive task observes `stop` within one receive timeout.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::PoisonError;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::time::Duration;

use async_trait::async_trait;
use hexatrack_core::IncomingPort;
use hexatrack_core::WireMessage;
use hexatrack_transport::Endpoint;
use hexatrack_transport::MessageSocket;
use hexatrack_transport::TransportError;
use tokio::task::JoinHandle;

use crate::adapter::Adapter;
use crate::error::AdapterError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default receive poll timeout.
pub const DEFAULT_RECEIVE_TIMEOUT: Duration = Duration::from_millis(100);

// ============================================================================
// SECTION: Counters
// ============================================================================

/// Receive-side counters shared with the receive task.
#[derive(Debug, Default)]
struct ReceiveCounters {
    /// Messages decoded and submitted.
    received: AtomicU64,
    /// Payloads that failed to decode.
    rejected: AtomicU64,
}

// ============================================================================
// SECTION: Adapter
// ============================================================================

/// Incoming adapter reading `M` from a DISH socket.
pub struct DishIncomingAdapter<M> {
    /// `"{group}-InAdapter"`.
    name: String,
    /// Endpoint the DISH binds.
    endpoint: Endpoint,
    /// Group the DISH joins.
    group: String,
    /// DISH socket.
    socket: Arc<dyn MessageSocket>,
    /// Destination for decoded messages.
    port: Arc<dyn IncomingPort<M>>,
    /// Receive poll timeout.
    receive_timeout: Duration,
    /// Cleared by `stop`.
    running: Arc<AtomicBool>,
    /// Receive task while running.
    worker: Mutex<Option<JoinHandle<()>>>,
    /// Receive-side counters.
    counters: Arc<ReceiveCounters>,
}

impl<M: WireMessage> DishIncomingAdapter<M> {
    /// Creates a stopped adapter.
    #[must_use]
    pub fn new(
        socket: Arc<dyn MessageSocket>,
        endpoint: Endpoint,
        group: impl Into<String>,
        port: Arc<dyn IncomingPort<M>>,
    ) -> Self {
        let group = group.into();
        Self {
            name: format!("{group}-InAdapter"),
            endpoint,
            group,
            socket,
            port,
            receive_timeout: DEFAULT_RECEIVE_TIMEOUT,
            running: Arc::new(AtomicBool::new(false)),
            worker: Mutex::new(None),
            counters: Arc::new(ReceiveCounters::default()),
        }
    }

    /// Replaces the receive poll timeout.
    #[must_use]
    pub fn with_receive_timeout(mut self, receive_timeout: Duration) -> Self {
        if !receive_timeout.is_zero() {
            self.receive_timeout = receive_timeout;
        }
        self
    }

    /// Returns the joined group.
    #[must_use]
    pub fn group(&self) -> &str {
        &self.group
    }

    /// Returns how many messages were decoded and submitted.
    #[must_use]
    pub fn received_count(&self) -> u64 {
        self.counters.received.load(Ordering::Relaxed)
    }

    /// Returns how many payloads failed to decode.
    #[must_use]
    pub fn rejected_count(&self) -> u64 {
        self.counters.rejected.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl<M: WireMessage> Adapter for DishIncomingAdapter<M> {
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
        self.socket.bind(&self.endpoint).await?;
        self.socket.join(&self.group).await?;
        tracing::info!(adapter = %self.name, endpoint = %self.endpoint, group = %self.group, "dish bound");

        self.running.store(true, Ordering::Release);
        let handle = tokio::spawn(receive_loop(
            self.name.clone(),
            Arc::clone(&self.socket),
            Arc::clone(&self.port),
            self.receive_timeout,
            Arc::clone(&self.running),
            Arc::clone(&self.counters),
        ));
        *self.worker.lock().unwrap_or_else(PoisonError::into_inner) = Some(handle);
        tracing::info!(adapter = %self.name, "adapter started");
        Ok(())
    }

    async fn stop(&self) {
        if !self.running.swap(false, Ordering::AcqRel) {
            return;
        }
        let handle = self.worker.lock().unwrap_or_else(PoisonError::into_inner).take();
        if let Some(handle) = handle {
            if let Err(err) = handle.await {
                tracing::error!(adapter = %self.name, error = %err, "receive task failed");
            }
        }
        self.socket.close().await;
        tracing::info!(adapter = %self.name, "adapter stopped");
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }
}

// ============================================================================
// SECTION: Receive Loop
// ============================================================================

/// Receives, decodes, and submits until `running` clears or the socket closes.
async fn receive_loop<M: WireMessage>(
    name: String,
    socket: Arc<dyn MessageSocket>,
    port: Arc<dyn IncomingPort<M>>,
    timeout: Duration,
    running: Arc<AtomicBool>,
    counters: Arc<ReceiveCounters>,
) {
    tracing::debug!(adapter = %name, "receive task started");
    while running.load(Ordering::Acquire) {
        match socket.receive(timeout).await {
            Ok(Some(message)) if message.body.is_empty() => {}
            Ok(Some(message)) => match M::decode(&message.body) {
                Ok(data) => {
                    counters.received.fetch_add(1, Ordering::Relaxed);
                    tracing::debug!(adapter = %name, track_id = data.track_id(), "track received");
                    port.submit(data).await;
                }
                Err(err) => {
                    counters.rejected.fetch_add(1, Ordering::Relaxed);
                    tracing::warn!(
                        adapter = %name,
                        bytes = message.body.len(),
                        error = %err,
                        "failed to decode {}",
                        M::NAME
                    );
                }
            },
            Ok(None) => {}
            Err(TransportError::Closed) => break,
            Err(err) => {
                tracing::error!(adapter = %name, error = %err, "receive error");
                tokio::time::sleep(timeout).await;
            }
        }
    }
    tracing::debug!(adapter = %name, "receive task stopped");
}
