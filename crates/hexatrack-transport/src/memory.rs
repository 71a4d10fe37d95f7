// crates/hexatrack-transport/src/memory.rs
// ============================================================================
// Module: Memory Bus
// Description: In-process RADIO/DISH built on tokio broadcast channels.
// Purpose: Run pipelines and tests without touching the network.
// Dependencies: tokio, tracing
// ============================================================================

//! ## Overview
//! A [`MemoryBus`] maps ports to broadcast channels. RADIO sockets connected
//! to an endpoint publish into its port's channel, tagged with the target
//! host; DISH sockets bound to the same port receive from it and filter by
//! host and joined group. A DISH bound to `*` hears every host on its port,
//! as a UDP socket bound to the unspecified address does.
//! Like UDP, messages published while no DISH is bound are lost, a slow
//! DISH loses the oldest messages once its buffer overflows, and a socket
//! attaches to one endpoint only.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashMap;
use std::collections::HashSet;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::PoisonError;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;

use crate::endpoint::Endpoint;
use crate::endpoint::Host;
use crate::error::TransportError;
use crate::frame::validate_group;
use crate::socket::Message;
use crate::socket::MessageSocket;
use crate::socket::SocketType;
use crate::socket::require_type;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default per-DISH buffer, matching the default receive high-water mark.
pub const DEFAULT_BUS_CAPACITY: usize = 1_000;

// ============================================================================
// SECTION: Bus
// ============================================================================

/// Message in flight on a port, tagged with the host the RADIO targeted.
#[derive(Debug, Clone)]
struct Routed {
    /// Destination host of the sending RADIO.
    host: Host,
    /// Delivered message.
    message: Message,
}

/// Shared registry of in-process endpoints.
#[derive(Clone)]
pub struct MemoryBus {
    /// Channels keyed by port.
    channels: Arc<Mutex<HashMap<u16, broadcast::Sender<Routed>>>>,
    /// Buffer size for new channels.
    capacity: usize,
}

impl MemoryBus {
    /// Creates a bus with the default buffer size.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_BUS_CAPACITY)
    }

    /// Creates a bus whose DISH buffers hold `capacity` messages, rounded up
    /// to a power of two.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            channels: Arc::new(Mutex::new(HashMap::new())),
            capacity: capacity.max(1),
        }
    }

    /// Creates a socket of the given role on this bus.
    #[must_use]
    pub fn socket(&self, socket_type: SocketType) -> MemorySocket {
        MemorySocket {
            socket_type,
            bus: self.clone(),
            sender: Mutex::new(None),
            receiver: tokio::sync::Mutex::new(None),
            attached: AtomicBool::new(false),
            groups: Mutex::new(HashSet::new()),
            open: AtomicBool::new(true),
        }
    }

    /// Creates a RADIO socket on this bus.
    #[must_use]
    pub fn radio(&self) -> MemorySocket {
        self.socket(SocketType::Radio)
    }

    /// Creates a DISH socket on this bus.
    #[must_use]
    pub fn dish(&self) -> MemorySocket {
        self.socket(SocketType::Dish)
    }

    /// Returns the channel for the port of `endpoint`, creating it on first
    /// use.
    fn channel(&self, endpoint: &Endpoint) -> broadcast::Sender<Routed> {
        let mut channels = self.channels.lock().unwrap_or_else(PoisonError::into_inner);
        channels
            .entry(endpoint.port())
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .clone()
    }
}

impl Default for MemoryBus {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// SECTION: Socket
// ============================================================================

/// RADIO or DISH socket attached to a [`MemoryBus`].
pub struct MemorySocket {
    /// Socket role.
    socket_type: SocketType,
    /// Owning bus.
    bus: MemoryBus,
    /// RADIO publish handle and target host.
    sender: Mutex<Option<(broadcast::Sender<Routed>, Host)>>,
    /// DISH subscription and bound host, locked for the duration of a
    /// receive.
    receiver: tokio::sync::Mutex<Option<(broadcast::Receiver<Routed>, Host)>>,
    /// Set by the first bind or connect.
    attached: AtomicBool,
    /// Groups a DISH delivers.
    groups: Mutex<HashSet<String>>,
    /// Cleared by `close`.
    open: AtomicBool,
}

impl MemorySocket {
    /// Fails once the socket is closed.
    fn ensure_open(&self) -> Result<(), TransportError> {
        if self.open.load(Ordering::Acquire) { Ok(()) } else { Err(TransportError::Closed) }
    }

    /// Claims the single attachment, rejecting a second bind or connect.
    fn attach(&self, endpoint: &Endpoint) -> Result<(), TransportError> {
        if self.attached.swap(true, Ordering::AcqRel) {
            return Err(TransportError::already_attached(endpoint));
        }
        Ok(())
    }

    /// Returns true when a DISH has joined `group`.
    fn has_joined(&self, group: &str) -> bool {
        self.groups.lock().unwrap_or_else(PoisonError::into_inner).contains(group)
    }
}

/// Returns true when a DISH bound to `bound` hears a RADIO targeting `target`.
fn host_matches(bound: &Host, target: &Host) -> bool {
    matches!(bound, Host::Any) || bound == target
}

#[async_trait]
impl MessageSocket for MemorySocket {
    fn socket_type(&self) -> SocketType {
        self.socket_type
    }

    fn is_open(&self) -> bool {
        self.open.load(Ordering::Acquire)
    }

    async fn bind(&self, endpoint: &Endpoint) -> Result<(), TransportError> {
        self.ensure_open()?;
        require_type(self.socket_type, SocketType::Dish, "bind")?;
        self.attach(endpoint)?;
        let receiver = self.bus.channel(endpoint).subscribe();
        *self.receiver.lock().await = Some((receiver, endpoint.host().clone()));
        tracing::debug!(endpoint = %endpoint, "memory dish bound");
        Ok(())
    }

    async fn connect(&self, endpoint: &Endpoint) -> Result<(), TransportError> {
        self.ensure_open()?;
        require_type(self.socket_type, SocketType::Radio, "connect")?;
        self.attach(endpoint)?;
        let sender = self.bus.channel(endpoint);
        *self.sender.lock().unwrap_or_else(PoisonError::into_inner) = Some((sender, endpoint.host().clone()));
        tracing::debug!(endpoint = %endpoint, "memory radio connected");
        Ok(())
    }

    async fn join(&self, group: &str) -> Result<(), TransportError> {
        self.ensure_open()?;
        require_type(self.socket_type, SocketType::Dish, "join")?;
        validate_group(group)?;
        self.groups.lock().unwrap_or_else(PoisonError::into_inner).insert(group.to_string());
        Ok(())
    }

    async fn leave(&self, group: &str) -> Result<(), TransportError> {
        self.ensure_open()?;
        require_type(self.socket_type, SocketType::Dish, "leave")?;
        validate_group(group)?;
        self.groups.lock().unwrap_or_else(PoisonError::into_inner).remove(group);
        Ok(())
    }

    async fn send(&self, data: &[u8], group: &str) -> Result<(), TransportError> {
        self.ensure_open()?;
        require_type(self.socket_type, SocketType::Radio, "send")?;
        validate_group(group)?;
        let (sender, host) = self
            .sender
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or(TransportError::NotConnected)?;
        // No subscribers means nobody is bound; the message is dropped like a datagram.
        let _ = sender.send(Routed {
            host,
            message: Message {
                group: group.to_string(),
                body: Bytes::copy_from_slice(data),
            },
        });
        Ok(())
    }

    async fn receive(&self, timeout: Duration) -> Result<Option<Message>, TransportError> {
        self.ensure_open()?;
        require_type(self.socket_type, SocketType::Dish, "receive")?;
        let deadline = tokio::time::Instant::now() + timeout;
        let mut guard = self.receiver.lock().await;
        let (receiver, bound) = guard.as_mut().ok_or(TransportError::NotConnected)?;
        loop {
            let Ok(received) = tokio::time::timeout_at(deadline, receiver.recv()).await else {
                return Ok(None);
            };
            match received {
                Ok(routed) if host_matches(bound, &routed.host) && self.has_joined(&routed.message.group) => {
                    return Ok(Some(routed.message));
                }
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "memory dish lagged, oldest messages dropped");
                }
                Err(RecvError::Closed) => return Err(TransportError::Closed),
            }
        }
    }

    async fn close(&self) {
        if !self.open.swap(false, Ordering::AcqRel) {
            return;
        }
        self.sender.lock().unwrap_or_else(PoisonError::into_inner).take();
        self.receiver.lock().await.take();
        self.groups.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }
}
