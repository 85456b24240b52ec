// src/collector/mod.rs
//! Collector contract
//!
//! Wraps a [`Protocol`] and a [`Transport`] into the uniform
//! `name()` / `collect()` capability the exposition layer polls once per
//! scrape.

use crate::network::{TcpTransport, Transport, TransportConfig};
use crate::protocol::{Ccminer, Claymore, Dstm, Protocol};
use crate::stats::Metrics;
use crate::types::MinerKind;
use crate::utils::error::ExporterError;

/// Polls one miner daemon
///
/// Implementations hold no state between calls: every `collect()` opens its
/// own connections and returns an independent [`Metrics`] value.
pub trait Collector: Send + Sync {
    /// Static identifier of the daemon family
    fn name(&self) -> &'static str;

    /// Performs one poll
    ///
    /// # Returns
    /// - `Ok(Metrics)` with at least one algorithm
    /// - `Err(ExporterError)` on the first transport or decode failure; no
    ///   partial metrics are returned
    fn collect(&self) -> Result<Metrics, ExporterError>;
}

/// A protocol bound to the transport it polls through
pub struct MinerCollector<P, T> {
    protocol: P,
    transport: T,
}

impl<P: Protocol, T: Transport> MinerCollector<P, T> {
    /// Creates a collector speaking `protocol` over `transport`
    pub fn new(protocol: P, transport: T) -> Self {
        MinerCollector {
            protocol,
            transport,
        }
    }
}

impl<P: Protocol, T: Transport> Collector for MinerCollector<P, T> {
    fn name(&self) -> &'static str {
        P::NAME
    }

    fn collect(&self) -> Result<Metrics, ExporterError> {
        let requests = self.protocol.requests();
        let mut replies = Vec::with_capacity(requests.len());
        for request in requests {
            replies.push(self.transport.send(request)?);
        }

        let record = self.protocol.decode(replies)?;
        let metrics = self.protocol.normalize(record);
        if metrics.algorithms.is_empty() {
            return Err(ExporterError::DecodeError(format!(
                "{} at {} reported no algorithms",
                P::NAME,
                self.transport.address()
            )));
        }

        Ok(metrics)
    }
}

/// Builds the collector for a daemon family listening on `address`
pub fn for_kind(kind: MinerKind, address: &str, config: &TransportConfig) -> Box<dyn Collector> {
    let transport = TcpTransport::new(address, config.clone());
    match kind {
        MinerKind::Ccminer => Box::new(MinerCollector::new(Ccminer, transport)),
        MinerKind::Dstm => Box::new(MinerCollector::new(Dstm, transport)),
        MinerKind::Claymore => Box::new(MinerCollector::new(Claymore, transport)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::io;
    use std::sync::Mutex;

    /// Replays canned replies and records what was sent
    struct ScriptedTransport {
        replies: Mutex<VecDeque<Result<String, io::ErrorKind>>>,
        sent: Mutex<Vec<Vec<u8>>>,
    }

    impl ScriptedTransport {
        fn new(replies: Vec<Result<&str, io::ErrorKind>>) -> Self {
            ScriptedTransport {
                replies: Mutex::new(
                    replies
                        .into_iter()
                        .map(|r| r.map(str::to_string))
                        .collect(),
                ),
                sent: Mutex::new(Vec::new()),
            }
        }

        fn sent(&self) -> Vec<String> {
            self.sent
                .lock()
                .unwrap()
                .iter()
                .map(|s| String::from_utf8_lossy(s).into_owned())
                .collect()
        }
    }

    impl Transport for ScriptedTransport {
        fn address(&self) -> &str {
            "scripted:0"
        }

        fn send(&self, payload: &[u8]) -> Result<String, ExporterError> {
            self.sent.lock().unwrap().push(payload.to_vec());
            match self.replies.lock().unwrap().pop_front() {
                Some(Ok(reply)) => Ok(reply),
                Some(Err(kind)) => Err(ExporterError::transport(
                    self.address(),
                    io::Error::from(kind),
                )),
                None => Err(ExporterError::transport(
                    self.address(),
                    io::Error::from(io::ErrorKind::UnexpectedEof),
                )),
            }
        }
    }

    #[test]
    fn ccminer_issues_three_queries_in_order() {
        let transport = ScriptedTransport::new(vec![
            Ok("VER=2.2.4;ALGO=cryptonight;UPTIME=90|"),
            Ok("ACC=3;REJ=0;STALE=1|"),
            Ok("GPU=0;KHS=0.31|GPU=1;KHS=0.27|"),
        ]);
        let collector = MinerCollector::new(Ccminer, transport);

        let metrics = collector.collect().unwrap();
        assert_eq!(collector.name(), "ccminer");
        assert_eq!(metrics.algorithms[0].rates.by_gpu, vec![0.31, 0.27]);
        assert_eq!(collector.transport.sent(), vec!["summary", "pool", "threads"]);
    }

    #[test]
    fn first_transport_failure_aborts_poll() {
        let transport = ScriptedTransport::new(vec![
            Ok("VER=2.2.4;ALGO=cryptonight;UPTIME=90|"),
            Err(io::ErrorKind::ConnectionReset),
            Ok("GPU=0;KHS=0.31|"),
        ]);
        let collector = MinerCollector::new(Ccminer, transport);

        match collector.collect() {
            Err(ExporterError::TransportError { source, .. }) => {
                assert_eq!(source.kind(), io::ErrorKind::ConnectionReset)
            }
            other => panic!("expected transport error, got {:?}", other),
        }
        // The third query is never issued
        assert_eq!(collector.transport.sent().len(), 2);
    }

    #[test]
    fn refused_connection_yields_no_metrics_for_every_protocol() {
        let refused = || ScriptedTransport::new(vec![Err(io::ErrorKind::ConnectionRefused)]);
        let collectors: Vec<Box<dyn Collector>> = vec![
            Box::new(MinerCollector::new(Ccminer, refused())),
            Box::new(MinerCollector::new(Dstm, refused())),
            Box::new(MinerCollector::new(Claymore, refused())),
        ];

        for collector in collectors {
            assert!(
                collector.collect().is_err(),
                "{} returned metrics",
                collector.name()
            );
        }
    }

    #[test]
    fn decode_failure_is_propagated() {
        let transport = ScriptedTransport::new(vec![Ok(r#"{"id":0,"result":["1.0","2"]}"#)]);
        let collector = MinerCollector::new(Claymore, transport);

        assert!(matches!(
            collector.collect(),
            Err(ExporterError::DecodeError(_))
        ));
    }

    #[test]
    fn repeated_polls_are_independent() {
        let reply = r#"{"uptime":10,"version":"0.5.8","result":[{"sol_ps":400.0,"accepted_shares":1}]}"#;
        let transport = ScriptedTransport::new(vec![Ok(reply), Ok(reply)]);
        let collector = MinerCollector::new(Dstm, transport);

        let first = collector.collect().unwrap();
        let second = collector.collect().unwrap();
        assert_eq!(first, second);
        assert_eq!(second.algorithms[0].shares.accepted, 1.0);
    }

    #[test]
    fn for_kind_selects_protocol() {
        let config = TransportConfig::default();
        assert_eq!(for_kind(MinerKind::Ccminer, "127.0.0.1:1", &config).name(), "ccminer");
        assert_eq!(for_kind(MinerKind::Dstm, "127.0.0.1:1", &config).name(), "dstm");
        assert_eq!(for_kind(MinerKind::Claymore, "127.0.0.1:1", &config).name(), "claymore");
    }
}
