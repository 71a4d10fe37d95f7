// crates/hexatrack-transport/src/lib.rs
// ============================================================================
// Module: Hexatrack Transport
// Description: Group-addressed datagram messaging for pipeline stages.
// Purpose: Provide RADIO/DISH sockets behind an async socket trait.
// Dependencies: async-trait, bytes, tokio, tracing
// ============================================================================

//! ## Overview
//! Stages publish through a RADIO socket and subscribe through a DISH
//! socket. Messages carry a group name; a DISH only delivers groups it has
//! joined. Two implementations are provided:
//!
//! - [`UdpGroupSocket`]: native RADIO/DISH over UDP unicast or multicast,
//!   compiled with the `draft-api` feature (on by default).
//! - [`MemoryBus`]: in-process RADIO/DISH for tests and single-process runs.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod endpoint;
pub mod error;
pub mod frame;
pub mod memory;
pub mod socket;
#[cfg(feature = "draft-api")]
/// UDP RADIO/DISH implementation.
pub mod udp;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use endpoint::Endpoint;
pub use endpoint::Host;
pub use error::TransportError;
pub use frame::MAX_GROUP_LENGTH;
pub use frame::decode_frame;
pub use frame::encode_frame;
pub use frame::validate_group;
pub use memory::MemoryBus;
pub use memory::MemorySocket;
pub use socket::ConnectionMode;
pub use socket::Message;
pub use socket::MessageSocket;
pub use socket::SocketType;
#[cfg(feature = "draft-api")]
pub use udp::UdpGroupSocket;

// ============================================================================
// SECTION: Build Flags
// ============================================================================

/// True when the crate was built with the `draft-api` feature.
pub const DRAFT_API_ENABLED: bool = cfg!(feature = "draft-api");
