// src/exporter/mod.rs
//! Prometheus exposition
//!
//! Turns the canonical [`Metrics`](crate::stats::Metrics) of every configured
//! miner into gauge families and serves them over HTTP:
//! - [`MinerExporter`]: the `prometheus` collector polled on each gather
//! - [`serve`]: the hyper listener routing `/metrics` and `/`

/// Prometheus collector over the configured miners
pub mod collector;

/// HTTP listener
pub mod server;

pub use collector::{MinerExporter, MinerTarget};
pub use server::{ServerState, serve};
