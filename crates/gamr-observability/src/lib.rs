//! # gamr-observability
//!
//! Logging infrastructure for GAMR.
//!
//! This crate owns subscriber setup for the tracing ecosystem; library crates
//! only emit events.

pub mod logging;

pub use logging::{init_logging, init_logging_with_config, LoggingConfig};
