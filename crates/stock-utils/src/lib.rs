//! Shared utilities for the stock-signal workspace
//!
//! Currently this is the logging setup shared by the binaries and examples.

pub mod logging;

pub use logging::init_tracing;
