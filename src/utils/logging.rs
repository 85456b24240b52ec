// src/utils/logging.rs

//! Logging configuration and utilities
//!
//! This module handles logging setup for the exporter, including:
//! - Server logging on stdout
//! - Quiet logging for one-shot CLI commands
//!
//! Uses `env_logger` under the hood with custom formatting and filtering.

use env_logger::{Builder, Target};
use log::LevelFilter;
use std::env;

/// Initializes the logging subsystem for the long-running exporter
///
/// # Configuration
/// - Logs to stdout
/// - Default log level: Info
/// - Custom timestamp and source location formatting
/// - Respects `RUST_LOG` environment variable if set
pub fn init_logging() {
    common_log_config(Target::Stdout, LevelFilter::Info).init();
}

/// Configures logging for one-shot commands such as `probe`
///
/// # Differences from Server Logging
/// - Logs to stderr so stdout stays machine readable
/// - Default log level: Warn (if RUST_LOG not set)
pub fn init_cli_logging() {
    common_log_config(Target::Stderr, LevelFilter::Warn).init();
}

/// Creates and configures a base logger builder with common settings
///
/// # Features
/// - Custom log format including:
///   - Timestamp (seconds since epoch)
///   - Log level
///   - Module path
///   - Line number
///   - Message
/// - `RUST_LOG` overrides the default level
///
/// # Returns
/// Partially configured `env_logger::Builder` instance
fn common_log_config(target: Target, default_level: LevelFilter) -> Builder {
    let mut builder = Builder::new();

    builder
        .format(|buf, record| {
            use std::io::Write;
            let ts = buf.timestamp_seconds();
            let level = record.level();
            let module = record.module_path().unwrap_or_default();
            let line = record.line().unwrap_or(0);

            writeln!(
                buf,
                "[{} {} {}:{}] {}",
                ts,
                level,
                module,
                line,
                record.args()
            )
        })
        .target(target);

    if env::var("RUST_LOG").is_ok() {
        builder.parse_env("RUST_LOG");
    } else {
        builder.filter_level(default_level);
    }

    builder
}
