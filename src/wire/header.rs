//! Frame header encoding and decoding.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use byteorder::{ByteOrder, LittleEndian};

use super::{check_capacity, HEADER_LEN};
use crate::error::WireError;

/// Fixed 13-byte prefix present on every frame.
///
/// The timestamp is nanoseconds since the Unix epoch at encode time. It is
/// observational only: receivers log it and otherwise ignore it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    /// ASCII tag identifying the payload kind.
    pub msg_type: u8,
    /// Total frame length, header and body.
    pub msg_len: u16,
    /// Send time, nanoseconds since the Unix epoch.
    pub timestamp: u64,
    /// One's-complement checksum over the whole frame.
    pub checksum: u16,
}

impl FrameHeader {
    pub const ENCODED_LEN: usize = HEADER_LEN;

    const MSG_TYPE_OFFSET: usize = 0;
    const MSG_LEN_OFFSET: usize = 1;
    const TIMESTAMP_OFFSET: usize = 3;
    const CHECKSUM_OFFSET: usize = 11;

    /// Create a header for an outbound frame with `body_len` body bytes.
    ///
    /// The checksum starts at zero; it is patched in with
    /// [`FrameHeader::patch_checksum`] after the body is encoded.
    pub fn new(msg_type: u8, body_len: usize) -> Self {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or(Duration::ZERO)
            .as_nanos() as u64;

        Self {
            msg_type,
            msg_len: (HEADER_LEN + body_len) as u16,
            timestamp,
            checksum: 0,
        }
    }

    /// Encode the header into the first `ENCODED_LEN` bytes of `buf`.
    pub fn encode(&self, buf: &mut [u8]) -> Result<(), WireError> {
        check_capacity(buf, Self::ENCODED_LEN)?;

        buf[Self::MSG_TYPE_OFFSET] = self.msg_type;
        LittleEndian::write_u16(&mut buf[Self::MSG_LEN_OFFSET..], self.msg_len);
        LittleEndian::write_u64(&mut buf[Self::TIMESTAMP_OFFSET..], self.timestamp);
        LittleEndian::write_u16(&mut buf[Self::CHECKSUM_OFFSET..], self.checksum);
        Ok(())
    }

    /// Decode a header from the first `ENCODED_LEN` bytes of `buf`.
    pub fn decode(buf: &[u8]) -> Result<Self, WireError> {
        check_capacity(buf, Self::ENCODED_LEN)?;

        Ok(Self {
            msg_type: buf[Self::MSG_TYPE_OFFSET],
            msg_len: LittleEndian::read_u16(&buf[Self::MSG_LEN_OFFSET..]),
            timestamp: LittleEndian::read_u64(&buf[Self::TIMESTAMP_OFFSET..]),
            checksum: LittleEndian::read_u16(&buf[Self::CHECKSUM_OFFSET..]),
        })
    }

    /// Overwrite the checksum field of an already-encoded frame.
    pub fn patch_checksum(frame: &mut [u8], checksum: u16) -> Result<(), WireError> {
        check_capacity(frame, Self::ENCODED_LEN)?;
        LittleEndian::write_u16(&mut frame[Self::CHECKSUM_OFFSET..], checksum);
        Ok(())
    }

    /// Body length implied by `msg_len`, if `msg_len` covers the header.
    pub fn body_len(&self) -> Option<usize> {
        (self.msg_len as usize).checked_sub(HEADER_LEN)
    }
}

impl std::fmt::Display for FrameHeader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "msg_type={} msg_len={} timestamp={} checksum={:#06x}",
            self.msg_type as char, self.msg_len, self.timestamp, self.checksum
        )
    }
}
