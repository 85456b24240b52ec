// src/stats/model.rs
use serde::{Deserialize, Serialize};

/// One poll's worth of telemetry from a single miner daemon
///
/// Built fresh by every successful `collect()`; nothing is carried over
/// between polls.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    /// Version string reported by the daemon
    pub version: String,
    /// Seconds since the daemon started
    pub uptime_seconds: f64,
    /// One entry per concurrently mined algorithm, in protocol order
    pub algorithms: Vec<Algorithm>,
}

/// Rates and shares for one hashing algorithm
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Algorithm {
    /// Lowercase algorithm identifier, e.g. "equihash"
    pub name: String,
    /// Cumulative share counts since the daemon started
    pub shares: Shares,
    /// Current computation rates
    pub rates: Rates,
}

/// Cumulative share counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Shares {
    /// Shares accepted by the pool
    pub accepted: f64,
    /// Shares rejected by the pool
    pub rejected: f64,
    /// Shares that arrived after the work window closed (0 when unreported)
    pub stale: f64,
}

/// Aggregate and per-GPU rates in the daemon's native unit
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Rates {
    /// Aggregate rate
    pub total: f64,
    /// Rate per GPU, indexed as the daemon enumerates its devices
    pub by_gpu: Vec<f64>,
}

impl Rates {
    /// Builds rates whose total is the sum of the per-GPU values.
    ///
    /// Used by protocols that report no aggregate of their own.
    pub fn summed(by_gpu: Vec<f64>) -> Self {
        // Iterator::sum over no floats yields -0.0
        let total = by_gpu.iter().fold(0.0, |acc, rate| acc + rate);
        Rates { total, by_gpu }
    }
}
