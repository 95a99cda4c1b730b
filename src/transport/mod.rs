//! Transport layer: address resolution and TCP streams.
//!
//! Everything here is deliberately boring: resolve a hostname to candidate
//! addresses, connect to one within a deadline, and move exact byte counts
//! over the established stream.

mod tcp;

pub use tcp::TcpStream;

use std::net::SocketAddr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

/// Transport configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransportConfig {
    /// Connection timeout.
    #[serde(default = "default_connect_timeout", with = "humantime_serde")]
    pub connect_timeout: Duration,

    /// Per-operation read/write timeout.
    #[serde(default = "default_io_timeout", with = "humantime_serde")]
    pub io_timeout: Duration,

    /// Enable TCP_NODELAY.
    #[serde(default = "default_nodelay")]
    pub tcp_nodelay: bool,
}

fn default_connect_timeout() -> Duration {
    Duration::from_secs(5)
}
fn default_io_timeout() -> Duration {
    Duration::from_secs(5)
}
fn default_nodelay() -> bool {
    true
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            connect_timeout: default_connect_timeout(),
            io_timeout: default_io_timeout(),
            tcp_nodelay: default_nodelay(),
        }
    }
}

/// Resolve a hostname and port to candidate addresses.
///
/// Returns the addresses in resolver order; the caller tries them
/// sequentially. Resolution failure and an empty result are both fatal to
/// the run.
pub async fn resolve(host: &str, port: u16) -> Result<Vec<SocketAddr>> {
    let addrs: Vec<SocketAddr> = tokio::net::lookup_host((host, port))
        .await
        .map_err(|e| Error::Resolution {
            host: host.to_string(),
            port,
            reason: e.to_string(),
        })?
        .collect();

    if addrs.is_empty() {
        return Err(Error::NoAddresses {
            host: host.to_string(),
            port,
        });
    }

    debug!(host, port, count = addrs.len(), "resolved candidate addresses");

    Ok(addrs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_resolve_loopback() {
        let addrs = resolve("localhost", 9009).await.unwrap();
        assert!(!addrs.is_empty());
        assert!(addrs.iter().all(|a| a.port() == 9009));
        assert!(addrs.iter().all(|a| a.ip().is_loopback()));
    }

    #[tokio::test]
    async fn test_resolve_unknown_host_fails() {
        let result = resolve("host.invalid", 9009).await;
        assert!(matches!(result, Err(Error::Resolution { .. })));
    }
}
