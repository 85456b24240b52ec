// src/config/config.rs
use crate::{network::TransportConfig, types::MinerKind, utils::error::ExporterError};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;

/// Main configuration structure for the exporter
///
/// Contains the HTTP listener settings, socket timeouts for polling and
/// the list of miners to poll on every scrape.
#[derive(Debug, Serialize, Deserialize)]
pub struct Config {
    /// HTTP listener settings
    #[serde(default)]
    pub web: WebConfig,

    /// Socket timeouts applied to every miner round trip
    #[serde(default)]
    pub transport: TransportConfig,

    /// Miners polled on every scrape
    #[serde(default)]
    pub miners: Vec<MinerConfig>,
}

/// HTTP listener configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebConfig {
    /// Address to listen on (default: 0.0.0.0:9278)
    #[serde(default = "default_listen_address")]
    pub listen_address: String,

    /// Path under which metrics are served (default: /metrics)
    #[serde(default = "default_telemetry_path")]
    pub telemetry_path: String,

    /// Deadline each miner's poll must meet within one scrape; a miner
    /// that misses it is exported as down (default: 10 seconds)
    #[serde(default = "default_scrape_timeout_secs")]
    pub scrape_timeout_secs: u64,
}

/// One miner daemon to poll
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MinerConfig {
    /// Label identifying the miner in exported series
    pub name: String,

    /// Daemon family, which selects the protocol
    pub kind: MinerKind,

    /// API endpoint as host:port
    pub address: String,
}

fn default_listen_address() -> String {
    "0.0.0.0:9278".into()
}

fn default_telemetry_path() -> String {
    "/metrics".into()
}

fn default_scrape_timeout_secs() -> u64 {
    10
}

impl Default for WebConfig {
    fn default() -> Self {
        WebConfig {
            listen_address: default_listen_address(),
            telemetry_path: default_telemetry_path(),
            scrape_timeout_secs: default_scrape_timeout_secs(),
        }
    }
}

impl Config {
    /// Loads configuration from a file
    ///
    /// # Arguments
    /// * `path` - Path to the configuration file (TOML format)
    ///
    /// # Returns
    /// * `Ok(Config)` - Successfully loaded and validated configuration
    /// * `Err(ExporterError)` - If file couldn't be read, parsed or validated
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ExporterError> {
        let path = path.into();
        let config_str = std::fs::read_to_string(&path).map_err(|e| {
            ExporterError::ConfigError(format!(
                "Failed to read config at {}: {}",
                path.display(),
                e
            ))
        })?;

        Self::from_toml(&config_str)
    }

    /// Parses and validates configuration from TOML text
    pub fn from_toml(config_str: &str) -> Result<Self, ExporterError> {
        let config: Config = toml::from_str(config_str)
            .map_err(|e| ExporterError::ConfigError(format!("Invalid config format: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks invariants serde cannot express
    ///
    /// # Errors
    /// Returns `ExporterError::ConfigError` if:
    /// - No miners are configured
    /// - A miner name is duplicated or a name/address is blank
    /// - The telemetry path does not start with `/`
    /// - The scrape timeout is zero
    pub fn validate(&self) -> Result<(), ExporterError> {
        if self.miners.is_empty() {
            return Err(ExporterError::ConfigError(
                "At least one [[miners]] entry is required".into(),
            ));
        }

        let mut names = HashSet::new();
        for miner in &self.miners {
            if miner.name.trim().is_empty() {
                return Err(ExporterError::ConfigError("Miner name is empty".into()));
            }
            if miner.address.trim().is_empty() {
                return Err(ExporterError::ConfigError(format!(
                    "Miner '{}' has no address",
                    miner.name
                )));
            }
            if !names.insert(miner.name.as_str()) {
                return Err(ExporterError::ConfigError(format!(
                    "Duplicate miner name '{}'",
                    miner.name
                )));
            }
        }

        if !self.web.telemetry_path.starts_with('/') {
            return Err(ExporterError::ConfigError(format!(
                "Telemetry path '{}' must start with '/'",
                self.web.telemetry_path
            )));
        }

        if self.web.scrape_timeout_secs == 0 {
            return Err(ExporterError::ConfigError(
                "scrape_timeout_secs must be positive".into(),
            ));
        }

        Ok(())
    }

    /// Generates a configuration template string
    ///
    /// # Returns
    /// String containing a commented TOML configuration template with one
    /// example entry per supported miner kind
    pub fn generate_template() -> String {
        let mut template = String::new();
        template.push_str("# Miner Exporter Configuration\n\n");
        template.push_str("[web]\n");
        template.push_str("listen_address = \"0.0.0.0:9278\"\n");
        template.push_str("telemetry_path = \"/metrics\"\n");
        template.push_str("# Deadline for polling all miners in one scrape\n");
        template.push_str("scrape_timeout_secs = 10\n\n");

        template.push_str("[transport]\n");
        template.push_str("connect_timeout_secs = 5\n");
        template.push_str("io_timeout_secs = 5\n\n");

        template.push_str("# Supported kinds: ccminer, dstm, claymore\n");
        template.push_str("[[miners]]\n");
        template.push_str("name = \"rig01\"\n");
        template.push_str("kind = \"claymore\"\n");
        template.push_str("address = \"127.0.0.1:3333\"\n\n");

        template.push_str("[[miners]]\n");
        template.push_str("name = \"rig02\"\n");
        template.push_str("kind = \"ccminer\"\n");
        template.push_str("address = \"127.0.0.1:4068\"\n\n");

        template.push_str("[[miners]]\n");
        template.push_str("name = \"rig03\"\n");
        template.push_str("kind = \"dstm\"\n");
        template.push_str("address = \"127.0.0.1:2222\"\n");

        template
    }
}
