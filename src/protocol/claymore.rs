// src/protocol/claymore.rs

//! Claymore dual miner protocol
//!
//! `miner_getstat1` returns a flat array of strings whose meaning is given
//! purely by position. Numeric slots are themselves `;`-separated lists.
//! The whole layout is described by [`GETSTAT1_LAYOUT`].
use super::{Protocol, parse_float};
use crate::stats::{Algorithm, Metrics, Rates, Shares};
use crate::utils::error::ExporterError;
use serde::Deserialize;
use serde_json::Value;

const GETSTAT1: &[u8] = b"{\"id\":0,\"jsonrpc\":\"2.0\",\"method\":\"miner_getstat1\"}\n";

/// Slots of one mined algorithm inside the reply
#[derive(Debug, Clone, Copy)]
pub struct AlgorithmSlots {
    /// Name reported for the algorithm
    pub name: &'static str,
    /// Index of the `total;accepted;rejected` triple
    pub summary: usize,
    /// Index of the `;`-separated per-GPU rates
    pub gpu_rates: usize,
}

/// Positional layout of a `miner_getstat1` result
#[derive(Debug, Clone, Copy)]
pub struct Layout {
    /// Index of the version string
    pub version: usize,
    /// Index of the uptime, reported in minutes
    pub uptime_minutes: usize,
    /// Primary (ethash) and secondary (dual-mined) algorithms, in order
    pub algorithms: [AlgorithmSlots; 2],
}

impl Layout {
    /// Number of fields a reply needs to satisfy the layout
    pub const fn arity(&self) -> usize {
        let mut max = if self.version > self.uptime_minutes {
            self.version
        } else {
            self.uptime_minutes
        };
        let mut i = 0;
        while i < self.algorithms.len() {
            let slots = self.algorithms[i];
            if slots.summary > max {
                max = slots.summary;
            }
            if slots.gpu_rates > max {
                max = slots.gpu_rates;
            }
            i += 1;
        }
        max + 1
    }
}

/// Field positions of the reply, the only place they are spelled out
pub const GETSTAT1_LAYOUT: Layout = Layout {
    version: 0,
    uptime_minutes: 1,
    algorithms: [
        AlgorithmSlots {
            name: "daggerhashimoto",
            summary: 2,
            gpu_rates: 3,
        },
        AlgorithmSlots {
            name: "decred",
            summary: 4,
            gpu_rates: 5,
        },
    ],
};

/// Offsets inside an algorithm's summary triple
const TOTAL: usize = 0;
const ACCEPTED: usize = 1;
const REJECTED: usize = 2;

/// JSON-RPC envelope around the positional result
#[derive(Debug, Deserialize)]
struct Reply {
    #[serde(default)]
    result: Option<Vec<String>>,
    #[serde(default)]
    error: Option<Value>,
}

/// Positional result of a `miner_getstat1` call
///
/// Only [`Claymore::decode`] builds one, after checking the reply against
/// the layout arity.
#[derive(Debug, Clone)]
pub struct GetStat1 {
    fields: Vec<String>,
}

impl GetStat1 {
    /// Raw fields in wire order
    pub fn fields(&self) -> &[String] {
        &self.fields
    }
}

/// Decoder for Claymore's dual Ethereum miner
#[derive(Debug, Clone, Copy, Default)]
pub struct Claymore;

impl Protocol for Claymore {
    type Record = GetStat1;

    const NAME: &'static str = "claymore";

    fn requests(&self) -> &'static [&'static [u8]] {
        &[GETSTAT1]
    }

    fn decode(&self, replies: Vec<String>) -> Result<GetStat1, ExporterError> {
        let [reply]: [String; 1] = replies.try_into().map_err(|r: Vec<String>| {
            ExporterError::DecodeError(format!("expected 1 claymore reply, got {}", r.len()))
        })?;

        let reply: Reply = serde_json::from_str(&reply).map_err(|e| {
            ExporterError::DecodeError(format!("miner_getstat1 reply is not JSON-RPC: {}", e))
        })?;

        if let Some(error) = reply.error.filter(|e| !e.is_null()) {
            return Err(ExporterError::DecodeError(format!(
                "miner_getstat1 failed: {}",
                error
            )));
        }

        let fields = reply.result.ok_or_else(|| {
            ExporterError::DecodeError("miner_getstat1 reply has no result".to_string())
        })?;

        let arity = GETSTAT1_LAYOUT.arity();
        if fields.len() < arity {
            return Err(ExporterError::DecodeError(format!(
                "miner_getstat1 returned {} fields, layout needs {}",
                fields.len(),
                arity
            )));
        }

        Ok(GetStat1 { fields })
    }

    fn normalize(&self, record: GetStat1) -> Metrics {
        let layout = GETSTAT1_LAYOUT;
        let fields = &record.fields;

        let uptime_minutes = parse_list(&fields[layout.uptime_minutes])
            .first()
            .copied()
            .unwrap_or(0.0);

        let algorithms = layout
            .algorithms
            .iter()
            .map(|slots| {
                let summary = parse_list(&fields[slots.summary]);
                let at = |i: usize| summary.get(i).copied().unwrap_or(0.0);

                // The miner's own total is authoritative here
                Algorithm {
                    name: slots.name.to_string(),
                    shares: Shares {
                        accepted: at(ACCEPTED),
                        rejected: at(REJECTED),
                        stale: 0.0,
                    },
                    rates: Rates {
                        total: at(TOTAL),
                        by_gpu: parse_list(&fields[slots.gpu_rates]),
                    },
                }
            })
            .collect();

        Metrics {
            version: fields[layout.version].clone(),
            uptime_seconds: uptime_minutes * 60.0,
            algorithms,
        }
    }
}

/// Parses a `;`-separated slot, each element independently
///
/// Elements that fail to parse (Claymore writes `off` for disabled GPUs)
/// become `0.0`. A blank slot holds no elements.
fn parse_list(slot: &str) -> Vec<f64> {
    if slot.trim().is_empty() {
        return Vec::new();
    }
    slot.split(';').map(|v| parse_float(Some(v))).collect()
}
