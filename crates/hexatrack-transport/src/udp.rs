// crates/hexatrack-transport/src/udp.rs
// ============================================================================
// Module: UDP RADIO/DISH
// Description: Native group messaging over tokio UDP sockets.
// Purpose: Exchange track messages between stages on one host or a LAN.
// Dependencies: tokio, tracing
// ============================================================================

//! ## Overview
//! A RADIO connects to a unicast or multicast endpoint and sends framed
//! datagrams. A DISH binds the endpoint, joins the multicast group when the
//! address is one, and runs a reader task that decodes datagrams into a
//! bounded receive buffer. `receive` drains that buffer and filters by
//! joined group.
//! Invariants:
//! - Malformed datagrams are discarded and counted, never surfaced.
//! - A full receive buffer drops its oldest messages first.
//! - Std locks are never held across an await point.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashSet;
use std::net::IpAddr;
use std::net::Ipv4Addr;
use std::net::Ipv6Addr;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::PoisonError;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::time::Duration;

use async_trait::async_trait;
use tokio::net::UdpSocket;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

use crate::endpoint::Endpoint;
use crate::error::TransportError;
use crate::frame::decode_frame;
use crate::frame::encode_frame;
use crate::frame::validate_group;
use crate::socket::Message;
use crate::socket::MessageSocket;
use crate::socket::SocketType;
use crate::socket::require_type;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Largest UDP payload accepted on receive.
pub const MAX_DATAGRAM_SIZE: usize = 65_507;
/// Default DISH receive buffer in messages.
pub const DEFAULT_RECEIVE_BUFFER: usize = 1_000;

// ============================================================================
// SECTION: State
// ============================================================================

/// Socket state once bound or connected.
struct Attachment {
    /// Underlying socket, shared with in-flight receives.
    socket: Arc<UdpSocket>,
    /// Destination for RADIO sends.
    peer: Option<SocketAddr>,
    /// Joined multicast group and interface for DISH sockets.
    membership: Option<(Ipv4Addr, Ipv4Addr)>,
    /// DISH reader task filling the receive buffer.
    reader: Option<JoinHandle<()>>,
}

/// RADIO or DISH socket over UDP.
pub struct UdpGroupSocket {
    /// Socket role.
    socket_type: SocketType,
    /// Bound or connected socket.
    attachment: Mutex<Option<Attachment>>,
    /// DISH receive buffer, locked for the duration of a receive.
    inbox: tokio::sync::Mutex<Option<broadcast::Receiver<Message>>>,
    /// DISH receive buffer size in messages.
    receive_buffer: usize,
    /// Groups a DISH delivers.
    groups: Mutex<HashSet<String>>,
    /// Cleared by `close`.
    open: AtomicBool,
    /// Discarded malformed datagrams, shared with the reader task.
    malformed: Arc<AtomicU64>,
}

impl UdpGroupSocket {
    /// Creates an unattached socket of the given role.
    #[must_use]
    pub fn new(socket_type: SocketType) -> Self {
        Self {
            socket_type,
            attachment: Mutex::new(None),
            inbox: tokio::sync::Mutex::new(None),
            receive_buffer: DEFAULT_RECEIVE_BUFFER,
            groups: Mutex::new(HashSet::new()),
            open: AtomicBool::new(true),
            malformed: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Sets how many received messages a DISH buffers before dropping the
    /// oldest. Rounded up to a power of two; zero is treated as one.
    #[must_use]
    pub fn with_receive_buffer(mut self, messages: usize) -> Self {
        self.receive_buffer = messages.max(1);
        self
    }

    /// Returns the DISH receive buffer size in messages.
    #[must_use]
    pub const fn receive_buffer(&self) -> usize {
        self.receive_buffer
    }

    /// Creates a RADIO socket.
    #[must_use]
    pub fn radio() -> Self {
        Self::new(SocketType::Radio)
    }

    /// Creates a DISH socket.
    #[must_use]
    pub fn dish() -> Self {
        Self::new(SocketType::Dish)
    }

    /// Returns the local address once bound or connected.
    #[must_use]
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.lock_attachment().as_ref().and_then(|attachment| attachment.socket.local_addr().ok())
    }

    /// Returns how many malformed datagrams were discarded.
    #[must_use]
    pub fn malformed_count(&self) -> u64 {
        self.malformed.load(Ordering::Relaxed)
    }

    /// Locks the attachment slot.
    fn lock_attachment(&self) -> std::sync::MutexGuard<'_, Option<Attachment>> {
        self.attachment.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Fails once the socket is closed.
    fn ensure_open(&self) -> Result<(), TransportError> {
        if self.open.load(Ordering::Acquire) { Ok(()) } else { Err(TransportError::Closed) }
    }

    /// Fails when the socket is already bound or connected.
    fn ensure_detached(&self, endpoint: &Endpoint) -> Result<(), TransportError> {
        if self.lock_attachment().is_some() {
            return Err(TransportError::already_attached(endpoint));
        }
        Ok(())
    }

    /// Stores a new attachment, rejecting a second bind or connect.
    fn attach(&self, endpoint: &Endpoint, attachment: Attachment) -> Result<(), TransportError> {
        let mut slot = self.lock_attachment();
        if slot.is_some() {
            if let Some(reader) = attachment.reader {
                reader.abort();
            }
            return Err(TransportError::already_attached(endpoint));
        }
        *slot = Some(attachment);
        Ok(())
    }

    /// Returns true when a DISH has joined `group`.
    fn has_joined(&self, group: &str) -> bool {
        self.groups.lock().unwrap_or_else(PoisonError::into_inner).contains(group)
    }
}

// ============================================================================
// SECTION: Reader
// ============================================================================

/// Decodes datagrams from `socket` into `inbox` until the task is aborted.
async fn read_datagrams(socket: Arc<UdpSocket>, inbox: broadcast::Sender<Message>, malformed: Arc<AtomicU64>) {
    let mut buf = vec![0_u8; MAX_DATAGRAM_SIZE];
    loop {
        let (len, from) = match socket.recv_from(&mut buf).await {
            Ok(received) => received,
            Err(err) => {
                tracing::warn!(error = %err, "dish reader stopped");
                return;
            }
        };
        match decode_frame(&buf[.. len]) {
            Ok((group, body)) => {
                // No receiver means the socket is closing.
                let _ = inbox.send(Message {
                    group,
                    body,
                });
            }
            Err(err) => {
                malformed.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(%from, error = %err, "malformed datagram discarded");
            }
        }
    }
}

// ============================================================================
// SECTION: MessageSocket
// ============================================================================

#[async_trait]
impl MessageSocket for UdpGroupSocket {
    fn socket_type(&self) -> SocketType {
        self.socket_type
    }

    fn is_open(&self) -> bool {
        self.open.load(Ordering::Acquire)
    }

    async fn bind(&self, endpoint: &Endpoint) -> Result<(), TransportError> {
        self.ensure_open()?;
        require_type(self.socket_type, SocketType::Dish, "bind")?;
        self.ensure_detached(endpoint)?;
        let (socket, membership) = if let Some(group) = endpoint.multicast_v4() {
            let socket = UdpSocket::bind(SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), endpoint.port())).await?;
            let interface = endpoint.interface().unwrap_or(Ipv4Addr::UNSPECIFIED);
            socket.join_multicast_v4(group, interface)?;
            (socket, Some((group, interface)))
        } else {
            (UdpSocket::bind(endpoint.resolve().await?).await?, None)
        };
        tracing::info!(
            endpoint = %endpoint,
            local = ?socket.local_addr().ok(),
            receive_buffer = self.receive_buffer,
            "dish bound"
        );
        let socket = Arc::new(socket);
        let (sender, receiver) = broadcast::channel(self.receive_buffer);
        let reader = tokio::spawn(read_datagrams(Arc::clone(&socket), sender, Arc::clone(&self.malformed)));
        self.attach(
            endpoint,
            Attachment {
                socket,
                peer: None,
                membership,
                reader: Some(reader),
            },
        )?;
        *self.inbox.lock().await = Some(receiver);
        Ok(())
    }

    async fn connect(&self, endpoint: &Endpoint) -> Result<(), TransportError> {
        self.ensure_open()?;
        require_type(self.socket_type, SocketType::Radio, "connect")?;
        self.ensure_detached(endpoint)?;
        let peer = endpoint.resolve().await?;
        let local_ip = match (peer, endpoint.interface()) {
            (SocketAddr::V4(_), Some(interface)) => IpAddr::V4(interface),
            (SocketAddr::V4(_), None) => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            (SocketAddr::V6(_), _) => IpAddr::V6(Ipv6Addr::UNSPECIFIED),
        };
        let socket = UdpSocket::bind(SocketAddr::new(local_ip, 0)).await?;
        if endpoint.is_multicast() && peer.is_ipv4() {
            socket.set_multicast_loop_v4(true)?;
        }
        tracing::info!(endpoint = %endpoint, "radio connected");
        self.attach(
            endpoint,
            Attachment {
                socket: Arc::new(socket),
                peer: Some(peer),
                membership: None,
                reader: None,
            },
        )
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
        let frame = encode_frame(group, data)?;
        let (socket, peer) = {
            let slot = self.lock_attachment();
            let attachment = slot.as_ref().ok_or(TransportError::NotConnected)?;
            let peer = attachment.peer.ok_or(TransportError::NotConnected)?;
            (Arc::clone(&attachment.socket), peer)
        };
        socket.send_to(&frame, peer).await?;
        Ok(())
    }

    async fn receive(&self, timeout: Duration) -> Result<Option<Message>, TransportError> {
        self.ensure_open()?;
        require_type(self.socket_type, SocketType::Dish, "receive")?;
        let deadline = tokio::time::Instant::now() + timeout;
        let mut guard = self.inbox.lock().await;
        let inbox = guard.as_mut().ok_or(TransportError::NotConnected)?;
        loop {
            let Ok(received) = tokio::time::timeout_at(deadline, inbox.recv()).await else {
                return Ok(None);
            };
            match received {
                Ok(message) if self.has_joined(&message.group) => return Ok(Some(message)),
                Ok(message) => tracing::trace!(group = %message.group, "datagram for unjoined group ignored"),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "dish receive buffer full, oldest messages dropped");
                }
                Err(RecvError::Closed) if !self.is_open() => return Err(TransportError::Closed),
                Err(RecvError::Closed) => return Err(TransportError::Io("dish reader stopped".to_string())),
            }
        }
    }

    async fn close(&self) {
        if !self.open.swap(false, Ordering::AcqRel) {
            return;
        }
        let attachment = self.lock_attachment().take();
        if let Some(Attachment {
            socket,
            membership,
            reader,
            ..
        }) = attachment
        {
            if let Some(reader) = reader {
                reader.abort();
            }
            if let Some((group, interface)) = membership {
                if let Err(err) = socket.leave_multicast_v4(group, interface) {
                    tracing::debug!(error = %err, "multicast leave failed on close");
                }
            }
        }
        self.inbox.lock().await.take();
        self.groups.lock().unwrap_or_else(PoisonError::into_inner).clear();
        tracing::debug!(socket_type = %self.socket_type, "socket closed");
    }
}
