// src/config/mod.rs
//! Configuration management for the miner exporter
//!
//! This module handles all configuration-related functionality including:
//! - Loading, parsing and validating configuration files
//! - Generating configuration templates
//!
//! The configuration uses TOML format and lists the miners to poll along
//! with the HTTP listener and socket timeout settings.

/// Core configuration implementation
///
/// Contains the [`Config`] struct and related types that define
/// the exporter's configuration structure and behavior.
pub mod config;

// Re-export key items for easy access
pub use config::{Config, MinerConfig, WebConfig};

use crate::utils::error::ExporterError;
use std::path::PathBuf;

/// Loads exporter configuration from a TOML file
///
/// # Arguments
/// * `path` - Path to the configuration file (anything convertible to PathBuf)
///
/// # Returns
/// * `Ok(Config)` - Successfully loaded configuration
/// * `Err(ExporterError)` - If the file couldn't be read, parsed or validated
pub fn load(path: impl Into<PathBuf>) -> Result<Config, ExporterError> {
    Config::load(path)
}

/// Generates a commented configuration template
///
/// # Returns
/// String containing a ready-to-use TOML configuration template
pub fn generate_template() -> String {
    Config::generate_template()
}
