//! Canonical metrics model
//!
//! Every protocol decoder normalizes into these types, so the exposition
//! layer only ever sees one shape regardless of which daemon was polled:
//! - [`Metrics`]: version, uptime and the mined algorithms
//! - [`Algorithm`]: shares and rates for one hashing function
//! - [`Shares`] / [`Rates`]: the counters themselves
//!

/// Submodule containing the model types
pub mod model;

// Re-export main components
pub use model::{Algorithm, Metrics, Rates, Shares};
