// src/cli/commands.rs
use crate::types::MinerKind;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Miner Exporter CLI - Prometheus exporter for GPU mining daemons
#[derive(Parser, Debug)]
#[command(name = "miner-exporter")]
#[command(version, about, long_about = None)]
pub struct Commands {
    /// The action to perform (serve metrics, probe a miner, or generate config)
    #[command(subcommand)]
    pub action: Action,
}

/// Top-level commands for the exporter
#[derive(Subcommand, Debug)]
pub enum Action {
    /// Serve metrics for the configured miners
    Serve(ServeOptions),

    /// Poll a single miner once and print the result as JSON
    Probe(ProbeOptions),

    /// Generate configuration file template
    Config(ConfigOptions),
}

/// Options for running the exporter
#[derive(Parser, Debug)]
pub struct ServeOptions {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Address to listen on for web interface and telemetry (overrides config)
    #[arg(short, long)]
    pub listen_address: Option<String>,

    /// Path under which to expose metrics (overrides config)
    #[arg(short, long)]
    pub telemetry_path: Option<String>,
}

/// Options for probing one miner
#[derive(Parser, Debug)]
pub struct ProbeOptions {
    /// Daemon family to speak to
    #[arg(short, long)]
    pub kind: MinerKind,

    /// API endpoint as host:port
    #[arg(short, long)]
    pub address: String,
}

/// Options for generating configuration files
#[derive(Parser, Debug)]
pub struct ConfigOptions {
    /// Output file path
    #[arg(short, long, default_value = "config.toml")]
    pub output: PathBuf,
}
