// src/cli/mod.rs

//! Command-line interface definitions
//!
//! Subcommands are declared with `clap`'s derive API in [`commands`].

/// Subcommands and their options
pub mod commands;

pub use commands::{Action, Commands, ConfigOptions, ProbeOptions, ServeOptions};
