// src/network/transport.rs

//! One-shot TCP transport for miner control ports
//!
//! Every call opens a fresh connection, writes one request, reads one reply
//! line and drops the socket. Daemons in this space generally serve a single
//! client at a time, so nothing is pooled or kept alive.
use crate::utils::error::ExporterError;
use serde::{Deserialize, Serialize};
use std::io::{self, BufRead, BufReader, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

/// Socket timeouts applied to every round trip
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransportConfig {
    /// Seconds to wait for the TCP handshake
    #[serde(default = "default_timeout_secs")]
    pub connect_timeout_secs: u64,
    /// Seconds to wait on each write or read
    #[serde(default = "default_timeout_secs")]
    pub io_timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    5
}

impl Default for TransportConfig {
    fn default() -> Self {
        TransportConfig {
            connect_timeout_secs: default_timeout_secs(),
            io_timeout_secs: default_timeout_secs(),
        }
    }
}

impl TransportConfig {
    fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs.max(1))
    }

    fn io_timeout(&self) -> Duration {
        Duration::from_secs(self.io_timeout_secs.max(1))
    }
}

/// A request/response channel to one miner daemon
///
/// Collectors only depend on this trait, which keeps the protocol code
/// testable against scripted replies.
pub trait Transport: Send + Sync {
    /// Address of the daemon, used in errors and logs
    fn address(&self) -> &str;

    /// Sends `payload` and returns the daemon's single-line reply
    ///
    /// # Errors
    /// Returns `ExporterError::TransportError` if:
    /// - The connection cannot be established
    /// - Writing the request or reading the reply fails
    /// - The reply is empty
    fn send(&self, payload: &[u8]) -> Result<String, ExporterError>;
}

/// Production transport over plain TCP
#[derive(Debug, Clone)]
pub struct TcpTransport {
    address: String,
    config: TransportConfig,
}

impl TcpTransport {
    /// Creates a transport for `address` (host:port)
    pub fn new(address: impl Into<String>, config: TransportConfig) -> Self {
        TcpTransport {
            address: address.into(),
            config,
        }
    }

    fn connect(&self) -> io::Result<TcpStream> {
        let mut last_err = None;
        for addr in self.address.to_socket_addrs()? {
            match TcpStream::connect_timeout(&addr, self.config.connect_timeout()) {
                Ok(stream) => return Ok(stream),
                Err(e) => last_err = Some(e),
            }
        }

        Err(last_err.unwrap_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidInput, "address resolved to nothing")
        }))
    }

    fn round_trip(&self, payload: &[u8]) -> io::Result<String> {
        let mut stream = self.connect()?;
        stream.set_read_timeout(Some(self.config.io_timeout()))?;
        stream.set_write_timeout(Some(self.config.io_timeout()))?;

        stream.write_all(payload)?;
        stream.flush()?;

        // Some daemons close without a trailing newline, so EOF also ends the reply
        let mut reader = BufReader::new(stream);
        let mut line = Vec::new();
        reader.read_until(b'\n', &mut line)?;

        let reply = trim_reply(&String::from_utf8_lossy(&line)).to_string();
        if reply.is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "empty response",
            ));
        }

        Ok(reply)
    }
}

impl Transport for TcpTransport {
    fn address(&self) -> &str {
        &self.address
    }

    fn send(&self, payload: &[u8]) -> Result<String, ExporterError> {
        let reply = self
            .round_trip(payload)
            .map_err(|e| ExporterError::transport(&self.address, e))?;

        log::debug!(
            "{}: sent {} bytes, received {} bytes",
            self.address,
            payload.len(),
            reply.len()
        );
        Ok(reply)
    }
}

/// Strips line terminators and the NUL byte ccminer appends to its replies
fn trim_reply(reply: &str) -> &str {
    reply.trim_end_matches(['\r', '\n', '\0'])
}
