// src/utils/mod.rs
//! Utilities module for common functionality
//!
//! This module contains shared utilities used throughout the exporter,
//! including error handling and logging infrastructure.

/// Error types and handling utilities
///
/// Contains the [`ExporterError`] enum which defines all possible error
/// conditions for the exporter, along with conversion implementations.
pub mod error;

/// Logging configuration and utilities
///
/// Provides logging initialization for the server and for one-shot commands.
pub mod logging;

// Re-export for easier access
pub use error::ExporterError;
pub use logging::{init_cli_logging, init_logging};
