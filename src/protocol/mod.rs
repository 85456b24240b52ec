// src/protocol/mod.rs
//! Miner control protocols
//!
//! This module contains one decoder per supported daemon family and their
//! common interface. Currently implements:
//! - ccminer (semicolon/pipe key-value text)
//! - DSTM (one JSON document per line)
//! - Claymore dual miner (positional array of strings)

/// ccminer key-value protocol
///
/// Three plain-text queries (`summary`, `pool`, `threads`) merged into one
/// algorithm.
pub mod ccminer;

/// DSTM JSON-over-socket protocol
///
/// A single `getstat` request answered with per-GPU records.
pub mod dstm;

/// Claymore positional protocol
///
/// A single `miner_getstat1` call whose reply meaning is defined by index.
pub mod claymore;

use crate::stats::Metrics;
use crate::utils::error::ExporterError;

pub use ccminer::Ccminer;
pub use claymore::Claymore;
pub use dstm::Dstm;

/// Common interface for all daemon protocols
///
/// A poll sends every request in [`Protocol::requests`] in order, hands the
/// replies to [`Protocol::decode`] and normalizes the result. Decoding only
/// fails when a reply cannot satisfy the protocol's layout; unreadable
/// individual fields become `0.0`.
pub trait Protocol: Send + Sync {
    /// Structured form of the raw replies, before normalization
    type Record;

    /// Static identifier of the daemon family
    const NAME: &'static str;

    /// Raw request payloads, one round trip each
    fn requests(&self) -> &'static [&'static [u8]];

    /// Turns the replies (same order as the requests) into a record
    ///
    /// # Errors
    /// Returns `ExporterError::DecodeError` if the replies cannot be mapped
    /// onto the protocol's layout
    fn decode(&self, replies: Vec<String>) -> Result<Self::Record, ExporterError>;

    /// Maps a record onto the canonical model
    fn normalize(&self, record: Self::Record) -> Metrics;
}

/// Parses a numeric field, treating anything unreadable as `0.0`
pub(crate) fn parse_float(value: Option<&str>) -> f64 {
    value
        .and_then(|v| v.trim().parse::<f64>().ok())
        .unwrap_or(0.0)
}

#[cfg(test)]
pub(crate) mod test_util {
    /// Float comparison tolerant of summation order
    pub fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_float_defaults_to_zero() {
        assert_eq!(parse_float(Some("0.31")), 0.31);
        assert_eq!(parse_float(Some(" 7 ")), 7.0);
        assert_eq!(parse_float(Some("abc")), 0.0);
        assert_eq!(parse_float(Some("")), 0.0);
        assert_eq!(parse_float(None), 0.0);
    }
}
