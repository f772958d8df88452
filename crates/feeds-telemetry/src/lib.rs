//! # Feeds Telemetry
//!
//! Structured logging for epoch feeds. The engine crate only emits `tracing`
//! events; binaries and test suites call [`init_tracing`] once to see them.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use feeds_telemetry::{init_tracing, TelemetryConfig};
//!
//! fn main() {
//!     init_tracing(&TelemetryConfig::from_env()).expect("Failed to init tracing");
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `FEEDS_LOG_LEVEL` / `RUST_LOG` | `info` | Level filter |
//! | `FEEDS_JSON_LOGS` | `false` (`true` in containers) | JSON output |
//! | `FEEDS_LOG_TARGET` | `true` | Include module path |
//! | `FEEDS_SERVICE_NAME` | `epoch-feeds` | Name in the startup event |

#![warn(missing_docs)]

mod config;
mod tracing_setup;

pub use config::TelemetryConfig;
pub use tracing_setup::{build_filter, init_tracing};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    /// The log level directive could not be parsed.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// A global subscriber was already installed.
    #[error("Tracing already initialized: {0}")]
    AlreadyInitialized(String),
}

/// Install tracing, ignoring an already installed subscriber.
///
/// Convenient for test suites where many tests race to initialize.
pub fn try_init_for_tests() {
    let _ = init_tracing(&TelemetryConfig::for_testing());
}
