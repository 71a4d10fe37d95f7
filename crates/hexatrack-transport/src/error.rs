// crates/hexatrack-transport/src/error.rs
// ============================================================================
// Module: Transport Errors
// Description: Error types for endpoints, framing, and sockets.
// Purpose: Give adapters a stable error surface for socket failures.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! [`TransportError`] covers endpoint parsing, group validation, socket role
//! misuse, and I/O failures. I/O errors are stored as strings so the enum
//! stays `Clone` and comparable in tests.

use thiserror::Error;

use crate::endpoint::Endpoint;

/// Errors raised by transport sockets.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// Endpoint text could not be parsed.
    #[error("invalid endpoint {endpoint}: {reason}")]
    InvalidEndpoint {
        /// Rejected endpoint text.
        endpoint: String,
        /// Parse failure description.
        reason: String,
    },
    /// Endpoint uses a scheme other than `udp`.
    #[error("unsupported endpoint scheme: {0}")]
    UnsupportedScheme(String),
    /// Group name is empty, too long, or the frame header is malformed.
    #[error("invalid group: {0}")]
    InvalidGroup(String),
    /// Operation is not available for the socket role.
    #[error("{operation} is not supported on a {socket_type} socket")]
    WrongSocketType {
        /// Attempted operation.
        operation: &'static str,
        /// Socket role label.
        socket_type: &'static str,
    },
    /// Socket has not been bound or connected yet.
    #[error("socket is not connected")]
    NotConnected,
    /// Socket has been closed.
    #[error("socket is closed")]
    Closed,
    /// Underlying I/O failure.
    #[error("transport io error: {0}")]
    Io(String),
}

impl TransportError {
    /// Error for a second bind or connect on one socket.
    pub(crate) fn already_attached(endpoint: &Endpoint) -> Self {
        Self::InvalidEndpoint {
            endpoint: endpoint.to_string(),
            reason: "socket is already attached".to_string(),
        }
    }
}

impl From<std::io::Error> for TransportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}
