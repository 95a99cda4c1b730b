//! # Veles
//!
//! Fault-tolerant client for a fixed-frame TCP submission protocol.
//!
//! Veles resolves a target hostname to candidate addresses, connects, and
//! drives a fixed three-step exchange — login, submission, logout — over
//! binary frames protected by a one's-complement checksum.
//!
//! ## Architecture
//!
//! ┌──────────────────────────────────────────────────────────┐
//! │                        Client                            │
//! │      resolve → sequential fallback across endpoints      │
//! ├──────────────────────────────────────────────────────────┤
//! │                        Session                           │
//! │   Login → Submission → Logout, bounded checksum retry    │
//! ├──────────────────────────────────────────────────────────┤
//! │                       Wire codec                         │
//! │     13-byte header + fixed payloads + checksum           │
//! ├──────────────────────────────────────────────────────────┤
//! │                       Transport                          │
//! │      TCP connect with timeout, exact-length I/O          │
//! └──────────────────────────────────────────────────────────┘

#![warn(clippy::all, clippy::pedantic)]
// Allow stylistic lints that don't affect correctness
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::cast_possible_truncation)] // Frame lengths fit u16 by construction
#![allow(clippy::doc_markdown)] // ASCII diagrams in docs

pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod transport;
pub mod wire;

pub use client::{Client, RunOutcome};
pub use config::Config;
pub use error::{Error, Result};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default target host.
pub const DEFAULT_HOST: &str = "challenge1.vitorian.com";

/// Default target port.
pub const DEFAULT_PORT: u16 = 9009;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::client::{Client, RunOutcome, Session, SessionOutcome, SessionState};
    pub use crate::config::Config;
    pub use crate::error::{Error, Result};
    pub use crate::transport::{TcpStream, TransportConfig};
    pub use crate::wire::{FrameHeader, MessageKind};
}
