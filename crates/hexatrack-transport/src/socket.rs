// crates/hexatrack-transport/src/socket.rs
// ============================================================================
// Module: Socket Contract
// Description: Async RADIO/DISH socket trait and message types.
// Purpose: Let adapters work over any group-messaging backend.
// Dependencies: async-trait, bytes
// ============================================================================

//! ## Overview
//! [`MessageSocket`] is the seam between adapters and transports. All
//! methods take `&self` so one socket can be shared between a receive loop
//! and a controlling task.
//! Invariants:
//! - A RADIO only sends; a DISH only receives.
//! - A closed socket rejects every operation with [`TransportError::Closed`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;

use crate::endpoint::Endpoint;
use crate::error::TransportError;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Socket role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SocketType {
    /// Group publisher.
    Radio,
    /// Group subscriber.
    Dish,
}

impl SocketType {
    /// Returns a stable label for the role.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Radio => "RADIO",
            Self::Dish => "DISH",
        }
    }

    /// Returns the connection mode the role uses.
    #[must_use]
    pub const fn default_mode(self) -> ConnectionMode {
        match self {
            Self::Radio => ConnectionMode::Connect,
            Self::Dish => ConnectionMode::Bind,
        }
    }
}

impl fmt::Display for SocketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a socket attaches to its endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionMode {
    /// Listen on the endpoint.
    Bind,
    /// Send to the endpoint.
    Connect,
}

/// One received group message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Group the message was published to.
    pub group: String,
    /// Message payload.
    pub body: Bytes,
}

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Async group-messaging socket.
#[async_trait]
pub trait MessageSocket: Send + Sync {
    /// Returns the socket role.
    fn socket_type(&self) -> SocketType;

    /// Returns true until [`MessageSocket::close`] is called.
    fn is_open(&self) -> bool;

    /// Binds a DISH to `endpoint`.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] on role misuse or bind failure.
    async fn bind(&self, endpoint: &Endpoint) -> Result<(), TransportError>;

    /// Connects a RADIO to `endpoint`.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] on role misuse or socket failure.
    async fn connect(&self, endpoint: &Endpoint) -> Result<(), TransportError>;

    /// Subscribes a DISH to `group`.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] on role misuse or an invalid group.
    async fn join(&self, group: &str) -> Result<(), TransportError>;

    /// Unsubscribes a DISH from `group`.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] on role misuse or an invalid group.
    async fn leave(&self, group: &str) -> Result<(), TransportError>;

    /// Publishes `data` to `group` through a RADIO.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] on role misuse, an unconnected socket, or
    /// a send failure.
    async fn send(&self, data: &[u8], group: &str) -> Result<(), TransportError>;

    /// Waits up to `timeout` for a message on a joined group.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] on role misuse, an unbound socket, or a
    /// receive failure. A timeout yields `Ok(None)`.
    async fn receive(&self, timeout: Duration) -> Result<Option<Message>, TransportError>;

    /// Closes the socket. Idempotent.
    async fn close(&self);
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Fails with [`TransportError::WrongSocketType`] unless `actual == required`.
pub(crate) fn require_type(
    actual: SocketType,
    required: SocketType,
    operation: &'static str,
) -> Result<(), TransportError> {
    if actual == required {
        Ok(())
    } else {
        Err(TransportError::WrongSocketType {
            operation,
            socket_type: actual.as_str(),
        })
    }
}
