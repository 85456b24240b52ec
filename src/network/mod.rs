// src/network/mod.rs
//! Network communication components
//!
//! This module handles the TCP round trips to miner daemons' control ports.
//! Each poll opens its own short-lived connection; see [`TcpTransport`].

/// Request/response transport to a miner daemon
///
/// Defines the [`Transport`] seam used by collectors and its plain TCP
/// implementation.
pub mod transport;

// Re-export main components for cleaner imports
pub use transport::{TcpTransport, Transport, TransportConfig};
