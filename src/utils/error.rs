// src/utils/error.rs
use std::io;
use thiserror::Error;

/// Main error type for the exporter
///
/// Poll-fatal conditions (transport failures, undecodable responses) and
/// the process-level failures of the exposition layer all surface here.
/// Field-local parse failures never do: those default to `0.0` inside the
/// decoders.
#[derive(Error, Debug)]
pub enum ExporterError {
    /// A round trip to a miner daemon failed (connect, write, read or an
    /// empty reply)
    #[error("Transport error talking to {address}: {source}")]
    TransportError {
        /// Address of the daemon that could not be polled
        address: String,
        /// Underlying I/O cause
        #[source]
        source: io::Error,
    },

    /// A response arrived but cannot satisfy its protocol's layout
    #[error("Decode error: {0}")]
    DecodeError(String),

    /// Configuration file or parameter errors
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Standard I/O operation errors
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Metric construction or encoding errors
    #[error("Prometheus error: {0}")]
    PrometheusError(#[from] prometheus::Error),

    /// HTTP listener errors
    #[error("HTTP error: {0}")]
    HttpError(#[from] hyper::Error),

    /// A miner poll was still running at the scrape deadline
    #[error("Poll timed out after {0:?}")]
    PollTimeout(std::time::Duration),

    /// Async task execution errors
    #[error("Task execution error: {0}")]
    TaskError(String),
}

impl ExporterError {
    /// Wraps an I/O failure from a round trip to `address`
    pub fn transport(address: impl Into<String>, source: io::Error) -> Self {
        ExporterError::TransportError {
            address: address.into(),
            source,
        }
    }
}

/// Converts async task join errors into ExporterError
///
/// Used when a blocking scrape task panics or is cancelled.
impl From<tokio::task::JoinError> for ExporterError {
    fn from(e: tokio::task::JoinError) -> Self {
        ExporterError::TaskError(format!("Async task failed: {}", e))
    }
}
