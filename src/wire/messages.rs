//! Fixed-length message payloads.
//!
//! Each payload is a plain value struct with an `encode` into / `decode`
//! from a byte slice. Text fields occupy fixed slots: the encoded value is
//! truncated to `slot - 1` bytes, the remainder of the slot is zero-filled,
//! and the final byte is always a NUL terminator. Decoding stops at the
//! first NUL and never reads past the slot.

use super::check_capacity;
use crate::error::WireError;

/// Write `value` into a fixed text slot, truncating and NUL-terminating.
fn put_text(slot: &mut [u8], value: &str) {
    let len = value.len().min(slot.len() - 1);
    slot[..len].copy_from_slice(&value.as_bytes()[..len]);
    slot[len..].fill(0);
}

/// Read a NUL-terminated string out of a fixed text slot.
fn get_text(slot: &[u8]) -> String {
    let end = slot.iter().position(|&b| b == 0).unwrap_or(slot.len());
    String::from_utf8_lossy(&slot[..end]).into_owned()
}

/// Login credentials, sent first on every connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginRequest {
    pub user: String,
    pub password: String,
}

impl LoginRequest {
    pub const TAG: u8 = b'L';
    pub const ENCODED_LEN: usize = 96;

    const USER_SLOT: usize = 64;
    const PASSWORD_SLOT: usize = 32;

    pub fn encode(&self, buf: &mut [u8]) -> Result<(), WireError> {
        check_capacity(buf, Self::ENCODED_LEN)?;
        put_text(&mut buf[..Self::USER_SLOT], &self.user);
        put_text(&mut buf[Self::USER_SLOT..Self::ENCODED_LEN], &self.password);
        Ok(())
    }

    pub fn decode(buf: &[u8]) -> Result<Self, WireError> {
        check_capacity(buf, Self::ENCODED_LEN)?;
        Ok(Self {
            user: get_text(&buf[..Self::USER_SLOT]),
            password: get_text(&buf[Self::USER_SLOT..Self::ENCODED_LEN]),
        })
    }
}

/// Server's verdict on a login attempt. Code `'Y'` means accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginResponse {
    pub code: u8,
    pub reason: String,
}

impl LoginResponse {
    pub const TAG: u8 = b'E';
    pub const ENCODED_LEN: usize = 33;

    pub const ACCEPTED: u8 = b'Y';

    pub fn accepted(&self) -> bool {
        self.code == Self::ACCEPTED
    }

    pub fn encode(&self, buf: &mut [u8]) -> Result<(), WireError> {
        check_capacity(buf, Self::ENCODED_LEN)?;
        buf[0] = self.code;
        put_text(&mut buf[1..Self::ENCODED_LEN], &self.reason);
        Ok(())
    }

    pub fn decode(buf: &[u8]) -> Result<Self, WireError> {
        check_capacity(buf, Self::ENCODED_LEN)?;
        Ok(Self {
            code: buf[0],
            reason: get_text(&buf[1..Self::ENCODED_LEN]),
        })
    }
}

/// The submission payload: who is submitting what.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionRequest {
    pub name: String,
    pub email: String,
    pub repo: String,
}

impl SubmissionRequest {
    pub const TAG: u8 = b'S';
    pub const ENCODED_LEN: usize = 192;

    const SLOT: usize = 64;

    pub fn encode(&self, buf: &mut [u8]) -> Result<(), WireError> {
        check_capacity(buf, Self::ENCODED_LEN)?;
        put_text(&mut buf[..Self::SLOT], &self.name);
        put_text(&mut buf[Self::SLOT..2 * Self::SLOT], &self.email);
        put_text(&mut buf[2 * Self::SLOT..Self::ENCODED_LEN], &self.repo);
        Ok(())
    }

    pub fn decode(buf: &[u8]) -> Result<Self, WireError> {
        check_capacity(buf, Self::ENCODED_LEN)?;
        Ok(Self {
            name: get_text(&buf[..Self::SLOT]),
            email: get_text(&buf[Self::SLOT..2 * Self::SLOT]),
            repo: get_text(&buf[2 * Self::SLOT..Self::ENCODED_LEN]),
        })
    }
}

/// Receipt for an accepted submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionResponse {
    pub token: String,
}

impl SubmissionResponse {
    pub const TAG: u8 = b'R';
    pub const ENCODED_LEN: usize = 32;

    pub fn encode(&self, buf: &mut [u8]) -> Result<(), WireError> {
        check_capacity(buf, Self::ENCODED_LEN)?;
        put_text(&mut buf[..Self::ENCODED_LEN], &self.token);
        Ok(())
    }

    pub fn decode(buf: &[u8]) -> Result<Self, WireError> {
        check_capacity(buf, Self::ENCODED_LEN)?;
        Ok(Self {
            token: get_text(&buf[..Self::ENCODED_LEN]),
        })
    }
}

/// Session termination request. Carries no body; the frame is header-only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LogoutRequest;

impl LogoutRequest {
    pub const TAG: u8 = b'O';
    pub const ENCODED_LEN: usize = 0;

    pub fn encode(&self, _buf: &mut [u8]) -> Result<(), WireError> {
        Ok(())
    }

    pub fn decode(_buf: &[u8]) -> Result<Self, WireError> {
        Ok(Self)
    }
}

/// Session termination notice. The server may send this unprompted to end
/// the session at any step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogoutResponse {
    pub reason: String,
}

impl LogoutResponse {
    pub const TAG: u8 = b'G';
    pub const ENCODED_LEN: usize = 32;

    pub fn encode(&self, buf: &mut [u8]) -> Result<(), WireError> {
        check_capacity(buf, Self::ENCODED_LEN)?;
        put_text(&mut buf[..Self::ENCODED_LEN], &self.reason);
        Ok(())
    }

    pub fn decode(buf: &[u8]) -> Result<Self, WireError> {
        check_capacity(buf, Self::ENCODED_LEN)?;
        Ok(Self {
            reason: get_text(&buf[..Self::ENCODED_LEN]),
        })
    }
}
