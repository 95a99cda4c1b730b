//! Wire protocol for the submission service.
//!
//! Defines the frame format, message payloads, and the integrity checksum.
//!
//! ## Frame Format
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │ MsgType (1) │ MsgLen (2) │ Timestamp (8) │ Checksum (2)      │
//! ├──────────────────────────────────────────────────────────────┤
//! │ Body (fixed length per message kind, 0..=192 bytes)          │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! All multi-byte integers are little-endian. `MsgLen` counts the header
//! and the body together, so a reader pulls `HEADER_LEN` bytes, then
//! `msg_len - HEADER_LEN` more.

mod checksum;
mod header;
mod messages;

pub use checksum::{compute_checksum, verify_checksum};
pub use header::FrameHeader;
pub use messages::{
    LoginRequest, LoginResponse, LogoutRequest, LogoutResponse, SubmissionRequest,
    SubmissionResponse,
};

use crate::error::WireError;

/// Header size in bytes.
pub const HEADER_LEN: usize = 13;

/// Largest frame the protocol can produce (header + SubmissionRequest body).
pub const MAX_FRAME_LEN: usize = HEADER_LEN + SubmissionRequest::ENCODED_LEN;

/// Scratch buffer size for one connection attempt. Larger than any frame.
pub const FRAME_BUFFER_LEN: usize = 1024;

/// Message kind, identified by the ASCII tag in the frame header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MessageKind {
    LoginRequest = b'L',
    LoginResponse = b'E',
    SubmissionRequest = b'S',
    SubmissionResponse = b'R',
    LogoutRequest = b'O',
    LogoutResponse = b'G',
}

impl MessageKind {
    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            b'L' => Some(Self::LoginRequest),
            b'E' => Some(Self::LoginResponse),
            b'S' => Some(Self::SubmissionRequest),
            b'R' => Some(Self::SubmissionResponse),
            b'O' => Some(Self::LogoutRequest),
            b'G' => Some(Self::LogoutResponse),
            _ => None,
        }
    }

    pub fn tag(self) -> u8 {
        self as u8
    }

    /// Encoded body length for this kind.
    pub fn body_len(self) -> usize {
        match self {
            Self::LoginRequest => LoginRequest::ENCODED_LEN,
            Self::LoginResponse => LoginResponse::ENCODED_LEN,
            Self::SubmissionRequest => SubmissionRequest::ENCODED_LEN,
            Self::SubmissionResponse => SubmissionResponse::ENCODED_LEN,
            Self::LogoutRequest => LogoutRequest::ENCODED_LEN,
            Self::LogoutResponse => LogoutResponse::ENCODED_LEN,
        }
    }

    /// Total frame length (header + body) for this kind.
    pub fn frame_len(self) -> usize {
        HEADER_LEN + self.body_len()
    }
}

impl std::fmt::Display for MessageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::LoginRequest => "login_request",
            Self::LoginResponse => "login_response",
            Self::SubmissionRequest => "submission_request",
            Self::SubmissionResponse => "submission_response",
            Self::LogoutRequest => "logout_request",
            Self::LogoutResponse => "logout_response",
        };
        write!(f, "{name}")
    }
}

/// Fail with `BufferTooSmall` unless `buf` can hold `need` bytes.
pub(crate) fn check_capacity(buf: &[u8], need: usize) -> Result<(), WireError> {
    if buf.len() < need {
        return Err(WireError::BufferTooSmall {
            need,
            have: buf.len(),
        });
    }
    Ok(())
}
