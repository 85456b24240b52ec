// src/main.rs
use clap::Parser;
use miner_exporter::exporter::{self, ServerState};
use miner_exporter::utils::init_cli_logging;
use miner_exporter::*;
use prometheus::Registry;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Runtime;

/// Main entry point for the miner exporter
///
/// # Returns
/// - `Ok(())` on successful execution
/// - `Err(ExporterError)` if any operation fails
///
/// # Flow
/// 1. Parses command line arguments
/// 2. Delegates to appropriate subcommand handler
/// 3. Propagates any errors upward
fn main() -> Result<(), ExporterError> {
    let cli = cli::Commands::parse();

    match cli.action {
        cli::Action::Serve(opts) => serve(opts),
        cli::Action::Probe(opts) => probe(opts),
        cli::Action::Config(opts) => generate_config(opts),
    }
}

/// Runs the exporter with given configuration options
///
/// # Arguments
/// * `opts` - Command line options for the server
///
/// # Operations
/// 1. Initializes logging
/// 2. Loads and validates configuration
/// 3. Builds one collector per configured miner
/// 4. Registers the exporter and serves HTTP until Ctrl-C
fn serve(opts: cli::ServeOptions) -> Result<(), ExporterError> {
    utils::init_logging();

    let mut config = config::load(&opts.config)?;
    // Apply CLI overrides
    if let Some(listen_address) = opts.listen_address {
        config.web.listen_address = listen_address;
    }
    if let Some(telemetry_path) = opts.telemetry_path {
        config.web.telemetry_path = telemetry_path;
    }
    config.validate()?;

    let addr: SocketAddr = config.web.listen_address.parse().map_err(|e| {
        ExporterError::ConfigError(format!(
            "Invalid listen address '{}': {}",
            config.web.listen_address, e
        ))
    })?;

    let targets: Vec<MinerTarget> = config
        .miners
        .iter()
        .map(|miner| {
            log::info!(
                "Polling {} miner '{}' at {}",
                miner.kind,
                miner.name,
                miner.address
            );
            MinerTarget::from_config(miner, &config.transport)
        })
        .collect();

    let registry = Registry::new();
    let poll_timeout = Duration::from_secs(config.web.scrape_timeout_secs);
    registry.register(Box::new(MinerExporter::new(targets, poll_timeout)?))?;

    let state = Arc::new(ServerState {
        registry,
        telemetry_path: config.web.telemetry_path.clone(),
    });

    // Runtime setup
    let rt = Runtime::new()?;
    rt.block_on(exporter::serve(addr, state))
}

/// Polls one miner and prints the normalized metrics
///
/// # Arguments
/// * `opts` - Miner kind and address to probe
///
/// # Returns
/// - `Ok(())` if the poll succeeded
/// - `Err(ExporterError)` with the transport or decode failure otherwise
fn probe(opts: cli::ProbeOptions) -> Result<(), ExporterError> {
    init_cli_logging();

    let collector = collector::for_kind(opts.kind, &opts.address, &TransportConfig::default());
    let metrics = collector.collect()?;

    println!("{}", serde_json::to_string_pretty(&metrics)?);
    Ok(())
}

/// Generates configuration template file
///
/// # Arguments
/// * `opts` - Configuration generation options
fn generate_config(opts: cli::ConfigOptions) -> Result<(), ExporterError> {
    let config = config::generate_template();
    std::fs::write(opts.output, config)?;
    Ok(())
}
