// src/protocol/dstm.rs

//! DSTM (ZM) telemetry protocol
//!
//! The daemon answers a one-line JSON request with one JSON document per
//! line. Only the per-GPU rates and share counters reach the canonical model.
use super::Protocol;
use crate::stats::{Algorithm, Metrics, Rates, Shares};
use crate::utils::error::ExporterError;
use serde::Deserialize;
use serde::de::{DeserializeOwned, Deserializer};
use serde_json::Value;

const GETSTAT: &[u8] = br#"{"id": 1, "method": "getstat"}"#;

/// ZM only mines equihash
const ALGORITHM: &str = "equihash";

/// Reply to the `getstat` request
///
/// Every field defaults individually, so a reply missing a field or
/// carrying one of an unexpected type still decodes the rest.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GetStat {
    /// Echo of the request id
    #[serde(deserialize_with = "lenient")]
    pub id: i64,
    /// Seconds since the miner started
    #[serde(deserialize_with = "lenient")]
    pub uptime: i64,
    /// Seconds since the pool connection was established
    #[serde(deserialize_with = "lenient")]
    pub contime: i64,
    /// Pool host
    #[serde(deserialize_with = "lenient")]
    pub server: String,
    /// Pool port
    #[serde(deserialize_with = "lenient")]
    pub port: u16,
    /// Pool user
    #[serde(deserialize_with = "lenient")]
    pub user: String,
    /// Miner version
    #[serde(deserialize_with = "lenient")]
    pub version: String,
    /// Error reported by the miner, if any
    #[serde(deserialize_with = "lenient")]
    pub error: Option<String>,
    /// One entry per GPU
    #[serde(deserialize_with = "lenient")]
    pub result: Vec<GpuStat>,
}

/// Per-GPU entry of a `getstat` reply
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GpuStat {
    /// Device index as enumerated by the miner
    #[serde(deserialize_with = "lenient")]
    pub gpu_id: i64,
    /// Degrees Celsius
    #[serde(deserialize_with = "lenient")]
    pub temperature: i64,
    /// Current solutions per second
    #[serde(deserialize_with = "lenient")]
    pub sol_ps: f64,
    /// Average solutions per second
    #[serde(deserialize_with = "lenient")]
    pub avg_sol_ps: f64,
    /// Current solutions per watt
    #[serde(deserialize_with = "lenient")]
    pub sol_pw: f64,
    /// Average solutions per watt
    #[serde(deserialize_with = "lenient")]
    pub avg_sol_pw: f64,
    /// Current draw in watts
    #[serde(deserialize_with = "lenient")]
    pub power_usage: f64,
    /// Average draw in watts
    #[serde(deserialize_with = "lenient")]
    pub avg_power_usage: f64,
    /// Shares accepted from this GPU
    #[serde(deserialize_with = "lenient")]
    pub accepted_shares: u64,
    /// Shares rejected from this GPU
    #[serde(deserialize_with = "lenient")]
    pub rejected_shares: u64,
    /// Share submission latency in milliseconds
    #[serde(deserialize_with = "lenient")]
    pub latency: i64,
}

/// Reads a field, keeping its default when the value has the wrong type
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value.clone()).unwrap_or_else(|e| {
        log::debug!("Ignoring dstm field value {} ({})", value, e);
        T::default()
    }))
}

/// Decoder for DSTM's ZM miner
#[derive(Debug, Clone, Copy, Default)]
pub struct Dstm;

impl Protocol for Dstm {
    type Record = GetStat;

    const NAME: &'static str = "dstm";

    fn requests(&self) -> &'static [&'static [u8]] {
        &[GETSTAT]
    }

    fn decode(&self, replies: Vec<String>) -> Result<GetStat, ExporterError> {
        let [reply]: [String; 1] = replies.try_into().map_err(|r: Vec<String>| {
            ExporterError::DecodeError(format!("expected 1 dstm reply, got {}", r.len()))
        })?;

        // A garbled document polls as all zeroes rather than failing the scrape
        let stat = serde_json::from_str::<GetStat>(&reply).unwrap_or_else(|e| {
            log::warn!("Unreadable dstm getstat reply ({}): {}", e, reply);
            GetStat::default()
        });

        if let Some(error) = &stat.error {
            log::warn!("dstm reported error: {}", error);
        }

        Ok(stat)
    }

    fn normalize(&self, record: GetStat) -> Metrics {
        let by_gpu = record.result.iter().map(|gpu| gpu.sol_ps).collect();
        let accepted: u64 = record.result.iter().map(|gpu| gpu.accepted_shares).sum();
        let rejected: u64 = record.result.iter().map(|gpu| gpu.rejected_shares).sum();

        Metrics {
            version: record.version,
            uptime_seconds: record.uptime as f64,
            algorithms: vec![Algorithm {
                name: ALGORITHM.to_string(),
                shares: Shares {
                    accepted: accepted as f64,
                    rejected: rejected as f64,
                    stale: 0.0,
                },
                rates: Rates::summed(by_gpu),
            }],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::test_util::assert_close;

    fn gpu(id: usize, sol_ps: f64, accepted: u64, rejected: u64) -> String {
        format!(
            r#"{{"gpu_id":{id},"temperature":59,"sol_ps":{sol_ps},"avg_sol_ps":430.71,"sol_pw":4.32,"avg_sol_pw":4.32,"power_usage":97.86,"avg_power_usage":99.68,"accepted_shares":{accepted},"rejected_shares":{rejected},"latency":287}}"#
        )
    }

    fn sample_reply() -> String {
        let gpus = [
            gpu(0, 422.49, 1, 1),
            gpu(1, 427.96, 0, 0),
            gpu(2, 431.08, 2, 1),
            gpu(3, 424.16, 5, 0),
            gpu(4, 421.73, 3, 2),
            gpu(5, 416.42, 4, 1),
        ];
        format!(
            r#"{{"id":1,"result":[{}],"uptime":240,"contime":236,"server":"europe.equihash-hub.miningpoolhub.com","port":17023,"user":"rig.worker","version":"0.5.8","error":null}}"#,
            gpus.join(",")
        )
    }

    fn poll(reply: String) -> Metrics {
        Dstm.normalize(Dstm.decode(vec![reply]).unwrap())
    }

    #[test]
    fn request_is_getstat_document() {
        let request: serde_json::Value = serde_json::from_slice(Dstm.requests()[0]).unwrap();
        assert_eq!(request["method"], "getstat");
        assert_eq!(request["id"], 1);
    }

    #[test]
    fn normalizes_sample_poll() {
        let metrics = poll(sample_reply());

        assert_eq!(metrics.version, "0.5.8");
        assert_eq!(metrics.uptime_seconds, 240.0);

        let algo = &metrics.algorithms[0];
        assert_eq!(algo.name, "equihash");
        assert_eq!(
            algo.shares,
            Shares {
                accepted: 15.0,
                rejected: 5.0,
                stale: 0.0
            }
        );
        assert_eq!(
            algo.rates.by_gpu,
            vec![422.49, 427.96, 431.08, 424.16, 421.73, 416.42]
        );
        assert_close(algo.rates.total, 2543.84);
        assert_eq!(algo.rates.total, algo.rates.by_gpu.iter().sum::<f64>());
    }

    #[test]
    fn malformed_json_polls_as_zeroes() {
        let metrics = poll("{\"id\":1,\"result\":[{\"sol_ps\":".to_string());

        assert_eq!(metrics.version, "");
        assert_eq!(metrics.uptime_seconds, 0.0);
        assert_eq!(metrics.algorithms.len(), 1);
        assert!(metrics.algorithms[0].rates.by_gpu.is_empty());
        assert_eq!(metrics.algorithms[0].rates.total, 0.0);
        assert!(metrics.algorithms[0].rates.total.is_sign_positive());
    }

    #[test]
    fn schema_mismatch_polls_as_zeroes() {
        let metrics = poll(r#"{"uptime":"long","result":"none"}"#.to_string());
        assert_eq!(metrics.uptime_seconds, 0.0);
        assert_eq!(metrics.algorithms[0].shares, Shares::default());
    }

    #[test]
    fn mistyped_field_keeps_the_rest() {
        let odd_gpu = gpu(0, 422.49, 1, 1)
            .replace(r#""temperature":59"#, r#""temperature":59.5"#)
            .replace(r#""latency":287"#, r#""latency":null"#);
        let reply = sample_reply().replacen(&gpu(0, 422.49, 1, 1), &odd_gpu, 1);
        let stat = Dstm.decode(vec![reply]).unwrap();
        assert_eq!(stat.result[0].temperature, 0);
        assert_eq!(stat.result[0].latency, 0);

        let metrics = Dstm.normalize(stat);
        assert_eq!(metrics.version, "0.5.8");
        assert_eq!(metrics.uptime_seconds, 240.0);
        assert_eq!(metrics.algorithms[0].rates.by_gpu.len(), 6);
        assert_eq!(metrics.algorithms[0].rates.by_gpu[0], 422.49);
        assert_eq!(metrics.algorithms[0].shares.accepted, 15.0);
    }

    #[test]
    fn mistyped_gpu_rate_is_zero() {
        let metrics = poll(
            r#"{"uptime":60,"version":"0.6","result":[{"sol_ps":"fast","accepted_shares":3},{"sol_ps":12.5}]}"#
                .to_string(),
        );

        let algo = &metrics.algorithms[0];
        assert_eq!(metrics.uptime_seconds, 60.0);
        assert_eq!(algo.rates.by_gpu, vec![0.0, 12.5]);
        assert_eq!(algo.shares.accepted, 3.0);
    }

    #[test]
    fn absent_fields_default_individually() {
        let metrics = poll(r#"{"uptime":30,"result":[{"sol_ps":10.5},{"accepted_shares":2}]}"#.to_string());

        let algo = &metrics.algorithms[0];
        assert_eq!(metrics.uptime_seconds, 30.0);
        assert_eq!(algo.rates.by_gpu, vec![10.5, 0.0]);
        assert_eq!(algo.shares.accepted, 2.0);
        assert_eq!(algo.shares.rejected, 0.0);
    }
}
