//! Error types for Veles.

use std::io;
use std::net::SocketAddr;

use thiserror::Error;

/// Result type alias for Veles operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for Veles.
#[derive(Error, Debug)]
pub enum Error {
    // Codec errors
    #[error("wire error: {0}")]
    Wire(#[from] WireError),

    // Protocol errors
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    // Resolution errors
    #[error("could not resolve {host}:{port}: {reason}")]
    Resolution {
        host: String,
        port: u16,
        reason: String,
    },

    #[error("no addresses found for {host}:{port}")]
    NoAddresses { host: String, port: u16 },

    // Transport errors
    #[error("connection failed to {addr}: {reason}")]
    ConnectionFailed { addr: SocketAddr, reason: String },

    #[error("connection timeout")]
    ConnectionTimeout,

    #[error("connection closed by peer")]
    ConnectionClosed,

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    // Configuration errors
    #[error("configuration error: {0}")]
    Config(String),
}

/// Buffer-level encoding errors. These indicate a programming or
/// configuration mistake, never a network condition.
#[derive(Error, Debug)]
pub enum WireError {
    #[error("buffer too small: need {need} bytes, have {have}")]
    BufferTooSmall { need: usize, have: usize },
}

/// Protocol-level errors: the peer sent something the session cannot use.
#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("invalid message type: {0:#04x}")]
    InvalidMessageType(u8),

    #[error("checksum mismatch")]
    ChecksumMismatch,

    #[error("malformed frame: {0}")]
    MalformedFrame(String),

    #[error("checksum retries exhausted after {0} attempts")]
    ChecksumRetriesExhausted(u32),

    #[error("unexpected message: expected {expected}, got {got}")]
    UnexpectedMessage { expected: String, got: String },

    #[error("login rejected: code={code} reason={reason}")]
    LoginRejected { code: char, reason: String },
}

impl Error {
    /// Whether this error must terminate the whole run.
    ///
    /// Non-fatal errors fail only the current endpoint attempt; the runner
    /// falls back to the next candidate address. Fatal errors indicate a
    /// protocol-level disagreement or a local mistake that no other endpoint
    /// will fix.
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::ConnectionFailed { .. }
            | Self::ConnectionTimeout
            | Self::ConnectionClosed
            | Self::Io(_) => false,

            Self::Protocol(
                ProtocolError::ChecksumMismatch | ProtocolError::ChecksumRetriesExhausted(_),
            ) => false,

            Self::Wire(_)
            | Self::Protocol(_)
            | Self::Resolution { .. }
            | Self::NoAddresses { .. }
            | Self::Config(_) => true,
        }
    }
}
