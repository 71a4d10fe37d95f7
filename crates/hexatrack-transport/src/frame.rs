// crates/hexatrack-transport/src/frame.rs
// ============================================================================
// Module: Datagram Framing
// Description: Group-prefixed datagram layout for RADIO/DISH.
// Purpose: Carry the group name alongside each message body.
// Dependencies: bytes
// ============================================================================

//! ## Overview
//! Every datagram is `[group_len: u8][group bytes][body]`, the same layout
//! the group-messaging UDP engine uses on the wire. Group names are 1 to 255
//! bytes of UTF-8.

// ============================================================================
// SECTION: Imports
// ============================================================================

use bytes::BufMut;
use bytes::Bytes;
use bytes::BytesMut;

use crate::error::TransportError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum group name length in bytes.
pub const MAX_GROUP_LENGTH: usize = 255;

// ============================================================================
// SECTION: Framing
// ============================================================================

/// Checks a group name is 1..=255 bytes.
///
/// # Errors
///
/// Returns [`TransportError::InvalidGroup`] for empty or oversized names.
pub fn validate_group(group: &str) -> Result<(), TransportError> {
    if group.is_empty() {
        return Err(TransportError::InvalidGroup("group must not be empty".to_string()));
    }
    if group.len() > MAX_GROUP_LENGTH {
        return Err(TransportError::InvalidGroup(format!(
            "group is {} bytes, limit is {MAX_GROUP_LENGTH}",
            group.len()
        )));
    }
    Ok(())
}

/// Builds one datagram carrying `body` for `group`.
///
/// # Errors
///
/// Returns [`TransportError::InvalidGroup`] when the group is invalid.
pub fn encode_frame(group: &str, body: &[u8]) -> Result<Bytes, TransportError> {
    validate_group(group)?;
    let group_len = u8::try_from(group.len())
        .map_err(|_| TransportError::InvalidGroup("group length exceeds one byte".to_string()))?;
    let mut buf = BytesMut::with_capacity(1 + group.len() + body.len());
    buf.put_u8(group_len);
    buf.put_slice(group.as_bytes());
    buf.put_slice(body);
    Ok(buf.freeze())
}

/// Splits a datagram into its group and body.
///
/// # Errors
///
/// Returns [`TransportError::InvalidGroup`] when the header is missing, the
/// declared group overruns the datagram, or the group is not UTF-8.
pub fn decode_frame(datagram: &[u8]) -> Result<(String, Bytes), TransportError> {
    let (&group_len, rest) = datagram
        .split_first()
        .ok_or_else(|| TransportError::InvalidGroup("empty datagram".to_string()))?;
    let group_len = usize::from(group_len);
    if group_len == 0 || rest.len() < group_len {
        return Err(TransportError::InvalidGroup(format!(
            "declared group length {group_len} does not fit {} bytes",
            rest.len()
        )));
    }
    let (group, body) = rest.split_at(group_len);
    let group = std::str::from_utf8(group)
        .map_err(|_| TransportError::InvalidGroup("group is not utf-8".to_string()))?;
    Ok((group.to_string(), Bytes::copy_from_slice(body)))
}
