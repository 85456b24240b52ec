// src/types.rs
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Supported miner daemon families
///
/// Each family speaks its own control protocol on its API port; the kind
/// selects which decoder a configured miner is polled with.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MinerKind {
    /// ccminer and forks
    ///
    /// Plain-text `KEY=VALUE;...` records, `|` between records.
    #[clap(name = "ccminer")]
    Ccminer,

    /// DSTM's ZM equihash miner
    ///
    /// One JSON document per line.
    #[clap(name = "dstm")]
    #[value(alias = "zm")]
    #[serde(alias = "zm")]
    Dstm,

    /// Claymore's dual Ethereum miner
    ///
    /// JSON-RPC whose result is a positional array of strings.
    #[clap(name = "claymore")]
    #[value(alias = "claymore-dual")]
    #[serde(alias = "claymore-dual")]
    Claymore,
}

impl fmt::Display for MinerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MinerKind::Ccminer => write!(f, "ccminer"),
            MinerKind::Dstm => write!(f, "dstm"),
            MinerKind::Claymore => write!(f, "claymore"),
        }
    }
}
