//! Endpoint fallback: try each candidate address until one run completes.

use std::net::SocketAddr;

use tracing::{info, warn};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::transport::{self, TcpStream};

use super::{Session, SessionOutcome};

/// Result of a whole run across all candidate endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// One endpoint completed the full exchange.
    Completed { token: String },
    /// Every candidate endpoint failed softly or was aborted by the peer.
    Exhausted,
}

impl RunOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }

    /// The submission token, when the run completed.
    pub fn token(&self) -> Option<&str> {
        match self {
            Self::Completed { token } => Some(token),
            Self::Exhausted => None,
        }
    }
}

/// Protocol client with sequential endpoint fallback.
///
/// Candidate endpoints are tried strictly in order, each to completion or
/// failure. A soft failure (unreachable endpoint, I/O error, checksum retry
/// exhaustion, early peer logout) moves on to the next candidate; a fatal
/// error ends the run immediately.
pub struct Client {
    config: Config,
}

impl Client {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Resolve `host:port` and run the exchange against the candidates.
    pub async fn run(&self, host: &str, port: u16) -> Result<RunOutcome> {
        let endpoints = transport::resolve(host, port).await?;
        info!(host, port, count = endpoints.len(), "resolved target");

        self.run_endpoints(&endpoints).await
    }

    /// Run the exchange against a pre-resolved candidate list.
    pub async fn run_endpoints(&self, endpoints: &[SocketAddr]) -> Result<RunOutcome> {
        if endpoints.is_empty() {
            return Err(Error::Config("no candidate endpoints".into()));
        }

        for (i, &addr) in endpoints.iter().enumerate() {
            info!(%addr, attempt = i + 1, total = endpoints.len(), "trying endpoint");

            match self.attempt(addr).await {
                Ok(SessionOutcome::Completed { token }) => {
                    info!(%addr, "run completed");
                    return Ok(RunOutcome::Completed { token });
                }
                Ok(SessionOutcome::AbortedByPeer { reason }) => {
                    info!(%addr, reason = %reason, "session ended by peer, trying next endpoint");
                }
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    warn!(%addr, error = %e, "endpoint failed, trying next");
                }
            }
        }

        info!("all candidate endpoints exhausted");
        Ok(RunOutcome::Exhausted)
    }

    /// One full connection attempt against one endpoint.
    async fn attempt(&self, addr: SocketAddr) -> Result<SessionOutcome> {
        let stream = TcpStream::connect(addr, &self.config.transport).await?;

        Session::new(
            stream,
            self.config.identity.clone(),
            self.config.session.checksum_retries,
        )
        .run()
        .await
    }
}
