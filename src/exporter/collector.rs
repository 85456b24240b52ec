// src/exporter/collector.rs

//! Prometheus view of the configured miners
//!
//! [`MinerExporter`] implements `prometheus::core::Collector`, so every
//! gather polls each miner once and builds brand new metric families from
//! the results. Nothing survives between scrapes.
use crate::collector::{self, Collector};
use crate::config::MinerConfig;
use crate::network::TransportConfig;
use crate::stats::Metrics;
use crate::utils::error::ExporterError;
use prometheus::core::{Collector as PromCollector, Desc};
use prometheus::proto::MetricFamily;
use prometheus::{GaugeVec, Opts};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

const NAMESPACE: &str = "miner";

/// A configured miner: the label it is exported under and its collector
pub struct MinerTarget {
    /// Configured name, exported as the `miner` label
    pub name: String,
    /// Protocol collector for the daemon
    pub collector: Arc<dyn Collector>,
}

impl MinerTarget {
    /// Creates a target from its configuration entry
    pub fn from_config(miner: &MinerConfig, transport: &TransportConfig) -> Self {
        MinerTarget {
            name: miner.name.clone(),
            collector: Arc::from(collector::for_kind(miner.kind, &miner.address, transport)),
        }
    }
}

/// Gauge families filled from one round of polls
struct MinerFamilies {
    up: GaugeVec,
    info: GaugeVec,
    uptime: GaugeVec,
    rates: GaugeVec,
    rates_total: GaugeVec,
    shares: GaugeVec,
}

fn gauge_vec(name: &str, help: &str, labels: &[&str]) -> prometheus::Result<GaugeVec> {
    GaugeVec::new(Opts::new(name, help).namespace(NAMESPACE), labels)
}

impl MinerFamilies {
    fn new() -> prometheus::Result<Self> {
        Ok(MinerFamilies {
            up: gauge_vec("up", "Could the miner be reached.", &["miner"])?,
            info: gauge_vec(
                "info",
                "Information about the miner.",
                &["miner", "kind", "version"],
            )?,
            uptime: gauge_vec(
                "uptime_seconds",
                "Number of seconds since the miner started.",
                &["miner"],
            )?,
            rates: gauge_vec(
                "rates",
                "Mining rate by algorithm and GPU.",
                &["miner", "algorithm", "gpu"],
            )?,
            rates_total: gauge_vec(
                "rates_total",
                "Total mining rate by algorithm.",
                &["miner", "algorithm"],
            )?,
            shares: gauge_vec(
                "shares",
                "Shares by algorithm and status.",
                &["miner", "algorithm", "status"],
            )?,
        })
    }

    fn vecs(&self) -> [&GaugeVec; 6] {
        [
            &self.up,
            &self.info,
            &self.uptime,
            &self.rates,
            &self.rates_total,
            &self.shares,
        ]
    }

    fn record_down(&self, miner: &str) {
        self.up.with_label_values(&[miner]).set(0.0);
    }

    fn record(&self, miner: &str, kind: &str, metrics: &Metrics) {
        self.up.with_label_values(&[miner]).set(1.0);
        self.info
            .with_label_values(&[miner, kind, &metrics.version])
            .set(1.0);
        self.uptime
            .with_label_values(&[miner])
            .set(metrics.uptime_seconds);

        for algo in &metrics.algorithms {
            let name = algo.name.as_str();
            for (gpu, rate) in algo.rates.by_gpu.iter().enumerate() {
                self.rates
                    .with_label_values(&[miner, name, &gpu.to_string()])
                    .set(*rate);
            }
            self.rates_total
                .with_label_values(&[miner, name])
                .set(algo.rates.total);

            for (status, count) in [
                ("accepted", algo.shares.accepted),
                ("rejected", algo.shares.rejected),
                ("stale", algo.shares.stale),
            ] {
                self.shares
                    .with_label_values(&[miner, name, status])
                    .set(count);
            }
        }
    }

    fn collect(&self) -> Vec<MetricFamily> {
        self.vecs()
            .iter()
            .flat_map(|v| PromCollector::collect(*v))
            .collect()
    }
}

type PollResult = Result<Metrics, ExporterError>;

/// Starts one poll on its own thread
fn spawn_poll(target: &MinerTarget) -> Result<Receiver<PollResult>, ExporterError> {
    let (tx, rx) = mpsc::channel();
    let collector = Arc::clone(&target.collector);
    thread::Builder::new()
        .name(format!("poll-{}", target.name))
        .spawn(move || {
            // The receiver is gone once the deadline passed
            let _ = tx.send(collector.collect());
        })?;
    Ok(rx)
}

/// Exposes every configured miner through one Prometheus collector
pub struct MinerExporter {
    targets: Vec<MinerTarget>,
    poll_timeout: Duration,
    descs: Vec<Desc>,
}

impl MinerExporter {
    /// Creates an exporter over `targets`
    ///
    /// Each scrape waits at most `poll_timeout` for the miners; one still
    /// polling after that is exported as down.
    ///
    /// # Errors
    /// Returns `ExporterError::PrometheusError` if the metric descriptors
    /// are invalid
    pub fn new(targets: Vec<MinerTarget>, poll_timeout: Duration) -> Result<Self, ExporterError> {
        let families = MinerFamilies::new()?;
        let descs = families
            .vecs()
            .iter()
            .flat_map(|v| PromCollector::desc(*v))
            .cloned()
            .collect();

        Ok(MinerExporter {
            targets,
            poll_timeout,
            descs,
        })
    }

    /// Polls every target and returns fresh metric families
    ///
    /// Targets are polled concurrently against one shared deadline. A miner
    /// that fails or misses the deadline is reported with `miner_up 0`; the
    /// error is logged and never reaches the scraper.
    pub fn scrape(&self) -> Result<Vec<MetricFamily>, ExporterError> {
        let families = MinerFamilies::new()?;
        let deadline = Instant::now() + self.poll_timeout;
        let polls: Vec<_> = self.targets.iter().map(spawn_poll).collect();

        for (target, poll) in self.targets.iter().zip(polls) {
            let result = poll.and_then(|rx| {
                let remaining = deadline.saturating_duration_since(Instant::now());
                match rx.recv_timeout(remaining) {
                    Ok(result) => result,
                    Err(RecvTimeoutError::Timeout) => {
                        Err(ExporterError::PollTimeout(self.poll_timeout))
                    }
                    Err(RecvTimeoutError::Disconnected) => Err(ExporterError::TaskError(
                        "poll thread exited without a result".into(),
                    )),
                }
            });

            match result {
                Ok(metrics) => {
                    log::debug!("{}: {:?}", target.name, metrics);
                    families.record(&target.name, target.collector.name(), &metrics);
                }
                Err(e) => {
                    log::warn!("Failed to collect stats from miner {}: {}", target.name, e);
                    families.record_down(&target.name);
                }
            }
        }

        Ok(families.collect())
    }
}

impl PromCollector for MinerExporter {
    fn desc(&self) -> Vec<&Desc> {
        self.descs.iter().collect()
    }

    fn collect(&self) -> Vec<MetricFamily> {
        self.scrape().unwrap_or_else(|e| {
            log::error!("Failed to build miner metric families: {}", e);
            Vec::new()
        })
    }
}
