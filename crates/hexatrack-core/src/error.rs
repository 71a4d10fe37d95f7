// crates/hexatrack-core/src/error.rs
// ============================================================================
// Module: Hexatrack Core Errors
// Description: Error types for track codecs, ports, and domain services.
// Purpose: Give adapters stable variants to branch on.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! Every fallible operation in the core returns one of the enums below.
//! Runtime data errors are reported, never raised as panics.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

// ============================================================================
// SECTION: Track Errors
// ============================================================================

/// Errors raised while decoding or validating track messages.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TrackError {
    /// Input buffer is shorter than the message wire size.
    #[error("truncated {message}: expected {expected} bytes, received {actual}")]
    Truncated {
        /// Message type name.
        message: &'static str,
        /// Required wire size in bytes.
        expected: usize,
        /// Received buffer size in bytes.
        actual: usize,
    },
    /// A field violates its validation range.
    #[error("invalid {field}: {reason}")]
    Invalid {
        /// Offending field name.
        field: &'static str,
        /// Human-readable violation.
        reason: String,
    },
}

impl TrackError {
    /// Builds an [`TrackError::Invalid`] for `field`.
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

// ============================================================================
// SECTION: Port Errors
// ============================================================================

/// Errors returned by outgoing ports.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PortError {
    /// The port is not running and dropped the message.
    #[error("port is not running")]
    NotRunning,
    /// The port is running but cannot accept messages yet.
    #[error("port is not ready")]
    NotReady,
    /// The message failed validation before sending.
    #[error("invalid track message: {0}")]
    Invalid(#[from] TrackError),
    /// The underlying transport failed.
    #[error("transport failure: {0}")]
    Transport(String),
    /// The port sink (file, writer) failed.
    #[error("sink failure: {0}")]
    Sink(String),
}

// ============================================================================
// SECTION: Logic Errors
// ============================================================================

/// Errors raised when constructing domain services.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LogicError {
    /// Frequency is non-positive or not finite.
    #[error("invalid frequency {name}: {value}")]
    InvalidFrequency {
        /// Frequency parameter name.
        name: &'static str,
        /// Rejected value in hertz.
        value: f64,
    },
    /// Queue capacity or window size is zero.
    #[error("invalid capacity for {0}: must be greater than zero")]
    InvalidCapacity(&'static str),
}
