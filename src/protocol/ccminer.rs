// src/protocol/ccminer.rs

//! ccminer API protocol
//!
//! The daemon answers bare text commands with `KEY=VALUE` pairs separated by
//! `;`. Commands that describe several objects (one per GPU for `threads`)
//! separate them with `|`.
use super::{Protocol, parse_float};
use crate::stats::{Algorithm, Metrics, Rates, Shares};
use crate::utils::error::ExporterError;
use std::collections::HashMap;

/// One `KEY=VALUE;...` record
pub type KeyValues = HashMap<String, String>;

const SUMMARY: &[u8] = b"summary";
const POOL: &[u8] = b"pool";
const THREADS: &[u8] = b"threads";

/// Replies of one ccminer poll, parsed into key-value records
#[derive(Debug, Clone, Default)]
pub struct CcminerRecord {
    /// `summary` reply: version, algorithm, uptime
    pub summary: KeyValues,
    /// `pool` reply: share counters
    pub pool: KeyValues,
    /// `threads` reply: one record per GPU, in daemon order
    pub threads: Vec<KeyValues>,
}

/// Decoder for ccminer and its forks
#[derive(Debug, Clone, Copy, Default)]
pub struct Ccminer;

impl Protocol for Ccminer {
    type Record = CcminerRecord;

    const NAME: &'static str = "ccminer";

    fn requests(&self) -> &'static [&'static [u8]] {
        &[SUMMARY, POOL, THREADS]
    }

    fn decode(&self, replies: Vec<String>) -> Result<CcminerRecord, ExporterError> {
        let [summary, pool, threads]: [String; 3] = replies.try_into().map_err(|r: Vec<String>| {
            ExporterError::DecodeError(format!("expected 3 ccminer replies, got {}", r.len()))
        })?;

        let summary = first_record(&summary);
        if summary.is_empty() {
            return Err(ExporterError::DecodeError(
                "ccminer summary has no KEY=VALUE fields".into(),
            ));
        }

        Ok(CcminerRecord {
            summary,
            pool: first_record(&pool),
            threads: parse_records(&threads),
        })
    }

    fn normalize(&self, record: CcminerRecord) -> Metrics {
        let field = |map: &KeyValues, key: &str| parse_float(map.get(key).map(String::as_str));

        // No single reply carries the aggregate rate, so it is summed per thread
        let by_gpu = record
            .threads
            .iter()
            .map(|thread| field(thread, "KHS"))
            .collect();

        let name = record
            .summary
            .get("ALGO")
            .map(|algo| algo.to_lowercase())
            .filter(|algo| !algo.is_empty())
            .unwrap_or_else(|| "unknown".to_string());

        Metrics {
            version: record.summary.get("VER").cloned().unwrap_or_default(),
            uptime_seconds: field(&record.summary, "UPTIME"),
            algorithms: vec![Algorithm {
                name,
                shares: Shares {
                    accepted: field(&record.pool, "ACC"),
                    rejected: field(&record.pool, "REJ"),
                    stale: field(&record.pool, "STALE"),
                },
                rates: Rates::summed(by_gpu),
            }],
        }
    }
}

/// Parses `KEY=VALUE;KEY=VALUE` into a map
///
/// Segments without exactly one `=` are dropped. Keys keep their case.
pub fn parse_record(input: &str) -> KeyValues {
    input
        .split(';')
        .filter_map(|segment| {
            let mut parts = segment.split('=');
            match (parts.next(), parts.next(), parts.next()) {
                (Some(key), Some(value), None) => Some((key.to_string(), value.to_string())),
                _ => None,
            }
        })
        .collect()
}

/// Parses `|`-separated records, skipping ones that yield no fields
pub fn parse_records(input: &str) -> Vec<KeyValues> {
    input
        .split('|')
        .map(parse_record)
        .filter(|record| !record.is_empty())
        .collect()
}

/// Single-object replies still end with a `|`
fn first_record(input: &str) -> KeyValues {
    parse_records(input).into_iter().next().unwrap_or_default()
}
