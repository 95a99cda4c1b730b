//! One's-complement frame checksum.
//!
//! The frame is summed as little-endian 16-bit words with the checksum field
//! treated as zero (a trailing odd byte is added as-is), the 32-bit
//! accumulator is carry-folded down to 16 bits, and the stored checksum is
//! the one's complement of the result. Verification adds the stored value
//! back into the fold: an intact frame lands on `0xFFFF` exactly, because a
//! sum cancels its own one's complement.

use byteorder::{ByteOrder, LittleEndian};

use super::HEADER_LEN;

const CHECKSUM_OFFSET: usize = 11;

/// Sum `frame` as 16-bit little-endian words, the checksum field as zero.
fn fold_data(frame: &[u8]) -> u16 {
    let in_checksum_field =
        |i: usize| i == CHECKSUM_OFFSET || i == CHECKSUM_OFFSET + 1;
    let byte = |i: usize| {
        if in_checksum_field(i) {
            0
        } else {
            u32::from(frame[i])
        }
    };

    let mut sum: u32 = 0;
    let mut i = 0;
    while i + 1 < frame.len() {
        sum += byte(i) | (byte(i + 1) << 8);
        i += 2;
    }
    if i < frame.len() {
        sum += byte(i);
    }

    sum = (sum >> 16) + (sum & 0xFFFF);
    sum = (sum >> 16) + (sum & 0xFFFF);
    sum as u16
}

/// Compute the checksum of an encoded frame.
///
/// The checksum field's current contents are ignored, so the frame may be
/// encoded with the field still zero; the returned value is then patched in
/// with [`FrameHeader::patch_checksum`].
///
/// [`FrameHeader::patch_checksum`]: super::FrameHeader::patch_checksum
pub fn compute_checksum(frame: &[u8]) -> u16 {
    !fold_data(frame)
}

/// Verify a received frame against the checksum stored in its header.
pub fn verify_checksum(frame: &[u8]) -> bool {
    if frame.len() < HEADER_LEN {
        return false;
    }
    let stored = LittleEndian::read_u16(&frame[CHECKSUM_OFFSET..]);

    let mut sum = u32::from(fold_data(frame)) + u32::from(stored);
    sum = (sum >> 16) + (sum & 0xFFFF);
    sum as u16 == 0xFFFF
}
