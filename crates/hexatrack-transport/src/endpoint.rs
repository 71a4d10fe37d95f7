// crates/hexatrack-transport/src/endpoint.rs
// ============================================================================
// Module: Endpoints
// Description: Parsing and resolution of `udp://[iface;]host:port` endpoints.
// Purpose: Validate socket addresses before any socket is created.
// Dependencies: tokio
// ============================================================================

//! ## Overview
//! Endpoints follow the group-messaging URL form `udp://[iface;]host:port`.
//! `*` stands for "any" in both the interface and host positions. Only the
//! `udp` scheme is accepted; RADIO/DISH has no stream transport here.
//!
//! ```text
//! udp://127.0.0.1:15000          unicast
//! udp://239.1.1.1:9000           multicast, default interface
//! udp://192.168.1.20;239.1.1.1:9000  multicast on a specific interface
//! udp://*:9000                   bind on all interfaces
//! ```

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::net::IpAddr;
use std::net::Ipv4Addr;
use std::net::Ipv6Addr;
use std::net::SocketAddr;
use std::str::FromStr;

use crate::error::TransportError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// The only accepted scheme.
pub const UDP_SCHEME: &str = "udp";
/// Maximum accepted endpoint length in bytes.
pub const MAX_ENDPOINT_LENGTH: usize = 512;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Host portion of an endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Host {
    /// `*`: every local address.
    Any,
    /// Literal IP address.
    Ip(IpAddr),
    /// DNS name resolved at bind/connect time.
    Name(String),
}

/// Parsed `udp://` endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    /// Local interface for multicast membership and sends.
    interface: Option<Ipv4Addr>,
    /// Target or bind host.
    host: Host,
    /// UDP port.
    port: u16,
}

impl Endpoint {
    /// Creates an endpoint for a literal address.
    #[must_use]
    pub const fn from_socket_addr(addr: SocketAddr) -> Self {
        Self {
            interface: None,
            host: Host::Ip(addr.ip()),
            port: addr.port(),
        }
    }

    /// Returns the multicast interface, if one was given.
    #[must_use]
    pub const fn interface(&self) -> Option<Ipv4Addr> {
        self.interface
    }

    /// Returns the host portion.
    #[must_use]
    pub const fn host(&self) -> &Host {
        &self.host
    }

    /// Returns the port.
    #[must_use]
    pub const fn port(&self) -> u16 {
        self.port
    }

    /// Returns the multicast group address when the host is one.
    #[must_use]
    pub fn multicast_v4(&self) -> Option<Ipv4Addr> {
        match self.host {
            Host::Ip(IpAddr::V4(addr)) if addr.is_multicast() => Some(addr),
            _ => None,
        }
    }

    /// Returns true when the host is a multicast address.
    #[must_use]
    pub fn is_multicast(&self) -> bool {
        matches!(self.host, Host::Ip(ip) if ip.is_multicast())
    }

    /// Resolves the endpoint to one socket address.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::InvalidEndpoint`] when a host name does not
    /// resolve.
    pub async fn resolve(&self) -> Result<SocketAddr, TransportError> {
        match &self.host {
            Host::Any => Ok(SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), self.port)),
            Host::Ip(ip) => Ok(SocketAddr::new(*ip, self.port)),
            Host::Name(name) => {
                let mut addrs = tokio::net::lookup_host((name.as_str(), self.port)).await?;
                addrs.next().ok_or_else(|| TransportError::InvalidEndpoint {
                    endpoint: self.to_string(),
                    reason: "host did not resolve".to_string(),
                })
            }
        }
    }
}

// ============================================================================
// SECTION: Parsing
// ============================================================================

impl FromStr for Endpoint {
    type Err = TransportError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| TransportError::InvalidEndpoint {
            endpoint: text.to_string(),
            reason: reason.to_string(),
        };
        if text.len() > MAX_ENDPOINT_LENGTH {
            return Err(invalid("endpoint too long"));
        }
        let (scheme, rest) = text.split_once("://").ok_or_else(|| invalid("missing scheme"))?;
        if scheme != UDP_SCHEME {
            return Err(TransportError::UnsupportedScheme(scheme.to_string()));
        }
        let (interface, address) = match rest.split_once(';') {
            Some((iface, address)) => (parse_interface(iface).ok_or_else(|| invalid("invalid interface"))?, address),
            None => (None, rest),
        };
        let (host, port) = address.rsplit_once(':').ok_or_else(|| invalid("missing port"))?;
        let port = port.parse::<u16>().map_err(|_| invalid("invalid port"))?;
        let host = parse_host(host).ok_or_else(|| invalid("invalid host"))?;
        Ok(Self {
            interface,
            host,
            port,
        })
    }
}

/// Parses the interface segment; `*` means unspecified.
fn parse_interface(text: &str) -> Option<Option<Ipv4Addr>> {
    if text == "*" {
        return Some(None);
    }
    text.parse::<Ipv4Addr>().ok().map(Some)
}

/// Parses the host segment.
fn parse_host(text: &str) -> Option<Host> {
    if text == "*" {
        return Some(Host::Any);
    }
    if let Some(inner) = text.strip_prefix('[').and_then(|rest| rest.strip_suffix(']')) {
        return inner.parse::<Ipv6Addr>().ok().map(|addr| Host::Ip(IpAddr::V6(addr)));
    }
    if let Ok(addr) = text.parse::<Ipv4Addr>() {
        return Some(Host::Ip(IpAddr::V4(addr)));
    }
    let valid_name = !text.is_empty()
        && text.chars().all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '.')
        && !text.starts_with(['-', '.']);
    valid_name.then(|| Host::Name(text.to_string()))
}

// ============================================================================
// SECTION: Display
// ============================================================================

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{UDP_SCHEME}://")?;
        if let Some(interface) = self.interface {
            write!(f, "{interface};")?;
        }
        match &self.host {
            Host::Any => write!(f, "*")?,
            Host::Ip(IpAddr::V4(addr)) => write!(f, "{addr}")?,
            Host::Ip(IpAddr::V6(addr)) => write!(f, "[{addr}]")?,
            Host::Name(name) => write!(f, "{name}")?,
        }
        write!(f, ":{}", self.port)
    }
}
