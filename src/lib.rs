//! Miner Exporter - Prometheus exporter for GPU mining daemons
//!
//! This crate polls mining daemons over their TCP control ports and
//! normalizes their replies into one metrics model:
//! - ccminer (semicolon/pipe key-value text)
//! - DSTM's ZM (JSON over a socket)
//! - Claymore's dual miner (positional JSON-RPC result)
//!
//! Every scrape opens fresh connections; nothing is cached between polls.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

/// Collector contract wrapping a protocol and its transport
pub mod collector;

/// Network communication with miner daemons
pub mod network;

/// Per-family protocol decoders
pub mod protocol;

/// Canonical metrics model
pub mod stats;

/// Prometheus collector and HTTP server
pub mod exporter;

/// Utility functions and error handling
pub mod utils;

/// Command-line interface definitions
pub mod cli;

/// Configuration management
pub mod config;

/// Shared type definitions
pub mod types;

// Core exports
pub use cli::Commands;
pub use collector::{Collector, MinerCollector};
pub use config::Config;
pub use exporter::{MinerExporter, MinerTarget};
pub use network::{TcpTransport, Transport, TransportConfig};
pub use protocol::{Ccminer, Claymore, Dstm, Protocol};
pub use stats::{Algorithm, Metrics, Rates, Shares};
pub use types::MinerKind;
pub use utils::{ExporterError, init_logging};
