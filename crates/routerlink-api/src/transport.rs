// Shared transport configuration for opening RouterOS API sockets.
//
// Every session is a fresh TCP connection: connect bounded by
// `connect_timeout`, each reply bounded by `read_timeout`, and
// SO_KEEPALIVE left off so an idle socket is never kept warm.

use std::net::SocketAddr;
use std::time::Duration;

use tokio::net::{TcpSocket, TcpStream};
use tracing::debug;

use crate::error::Error;

/// Plain-text RouterOS API port.
pub const DEFAULT_PORT: u16 = 8728;

/// Where to connect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub host: String,
    pub port: u16,
}

impl Endpoint {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Socket tuning for a single API session.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub connect_timeout: Duration,
    pub read_timeout: Duration,
    pub keepalive: bool,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(5),
            read_timeout: Duration::from_secs(10),
            keepalive: false,
        }
    }
}

impl TransportConfig {
    /// Resolve `endpoint` and open a TCP stream to the first address that
    /// accepts within `connect_timeout`.
    pub async fn open(&self, endpoint: &Endpoint) -> Result<TcpStream, Error> {
        tokio::time::timeout(self.connect_timeout, self.connect_any(endpoint))
            .await
            .map_err(|_| Error::ConnectTimeout {
                address: endpoint.to_string(),
                timeout_secs: self.connect_timeout.as_secs(),
            })?
    }

    async fn connect_any(&self, endpoint: &Endpoint) -> Result<TcpStream, Error> {
        let addrs: Vec<SocketAddr> =
            tokio::net::lookup_host((endpoint.host.as_str(), endpoint.port))
                .await?
                .collect();

        let mut last_err = None;
        for addr in addrs {
            debug!(%addr, "opening API socket");
            match self.connect_addr(addr).await {
                Ok(stream) => return Ok(stream),
                Err(e) => last_err = Some(e),
            }
        }

        Err(last_err.map_or_else(
            || Error::Resolve {
                host: endpoint.host.clone(),
            },
            Error::Transport,
        ))
    }

    async fn connect_addr(&self, addr: SocketAddr) -> std::io::Result<TcpStream> {
        let socket = if addr.is_ipv4() {
            TcpSocket::new_v4()?
        } else {
            TcpSocket::new_v6()?
        };
        socket.set_keepalive(self.keepalive)?;
        let stream = socket.connect(addr).await?;
        stream.set_nodelay(true)?;
        Ok(stream)
    }
}
