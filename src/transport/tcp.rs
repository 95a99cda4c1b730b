//! TCP stream with exact-length, deadline-bounded I/O.

use std::net::SocketAddr;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpSocket, TcpStream as TokioTcpStream};
use tokio::time::timeout;
use tracing::debug;

use super::TransportConfig;
use crate::error::{Error, Result};

/// A connected TCP stream.
///
/// Reads and writes transfer exactly the requested number of bytes or fail;
/// every operation is bounded by the configured I/O timeout. The socket is
/// released when the stream is dropped.
pub struct TcpStream {
    inner: TokioTcpStream,
    peer_addr: SocketAddr,
    config: TransportConfig,
}

impl TcpStream {
    /// Connect to a remote address within the configured timeout.
    pub async fn connect(addr: SocketAddr, config: &TransportConfig) -> Result<Self> {
        let socket = if addr.is_ipv6() {
            TcpSocket::new_v6()
        } else {
            TcpSocket::new_v4()
        }
        .map_err(|e| Error::ConnectionFailed {
            addr,
            reason: e.to_string(),
        })?;

        let stream = timeout(config.connect_timeout, socket.connect(addr))
            .await
            .map_err(|_| Error::ConnectionTimeout)?
            .map_err(|e| Error::ConnectionFailed {
                addr,
                reason: e.to_string(),
            })?;

        if config.tcp_nodelay {
            stream.set_nodelay(true).map_err(|e| Error::ConnectionFailed {
                addr,
                reason: e.to_string(),
            })?;
        }

        debug!(%addr, "connected");

        Ok(Self {
            inner: stream,
            peer_addr: addr,
            config: config.clone(),
        })
    }

    /// Read exactly `buf.len()` bytes.
    ///
    /// An early peer shutdown surfaces as [`Error::ConnectionClosed`]; a
    /// deadline expiry as [`Error::ConnectionTimeout`].
    pub async fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        timeout(self.config.io_timeout, self.inner.read_exact(buf))
            .await
            .map_err(|_| Error::ConnectionTimeout)?
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::UnexpectedEof => Error::ConnectionClosed,
                _ => Error::Io(e),
            })?;
        Ok(())
    }

    /// Write all of `buf`.
    pub async fn write_all(&mut self, buf: &[u8]) -> Result<()> {
        timeout(self.config.io_timeout, self.inner.write_all(buf))
            .await
            .map_err(|_| Error::ConnectionTimeout)?
            .map_err(Error::Io)?;
        Ok(())
    }

    /// Shut down the write half, signalling a clean end of session.
    pub async fn shutdown(&mut self) -> Result<()> {
        self.inner.shutdown().await.map_err(Error::Io)?;
        debug!(addr = %self.peer_addr, "stream shut down");
        Ok(())
    }

    /// Remote address of this stream.
    pub fn peer_addr(&self) -> SocketAddr {
        self.peer_addr
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn test_connect_and_exact_io() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let server_addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 5];
            stream.read_exact(&mut buf).await.unwrap();
            stream.write_all(&buf).await.unwrap();
        });

        let config = TransportConfig::default();
        let mut stream = TcpStream::connect(server_addr, &config).await.unwrap();
        assert_eq!(stream.peer_addr(), server_addr);

        stream.write_all(b"hello").await.unwrap();

        let mut buf = [0u8; 5];
        stream.read_exact(&mut buf).await.unwrap();
        assert_eq!(&buf, b"hello");
    }

    #[tokio::test]
    async fn test_connect_refused() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let config = TransportConfig::default();
        let result = TcpStream::connect(addr, &config).await;
        assert!(matches!(
            result,
            Err(Error::ConnectionFailed { .. } | Error::ConnectionTimeout)
        ));
    }

    #[tokio::test]
    async fn test_read_after_peer_shutdown() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let server_addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            drop(stream);
        });

        let config = TransportConfig::default();
        let mut stream = TcpStream::connect(server_addr, &config).await.unwrap();

        let mut buf = [0u8; 13];
        let result = stream.read_exact(&mut buf).await;
        assert!(matches!(
            result,
            Err(Error::ConnectionClosed | Error::Io(_))
        ));
    }

    #[tokio::test]
    async fn test_read_deadline() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let server_addr = listener.local_addr().unwrap();

        // Server accepts but never writes.
        tokio::spawn(async move {
            let (_stream, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(5)).await;
        });

        let config = TransportConfig {
            io_timeout: Duration::from_millis(100),
            ..Default::default()
        };
        let mut stream = TcpStream::connect(server_addr, &config).await.unwrap();

        let mut buf = [0u8; 1];
        let result = stream.read_exact(&mut buf).await;
        assert!(matches!(result, Err(Error::ConnectionTimeout)));
    }
}
