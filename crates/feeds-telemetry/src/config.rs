//! Telemetry configuration from environment variables.

use std::env;

use serde::{Deserialize, Serialize};

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Service name attached to the startup event
    pub service_name: String,

    /// Log level filter (trace, debug, info, warn, error) or a full
    /// `EnvFilter` directive such as `epoch_feeds=debug,info`
    pub log_level: String,

    /// Whether to emit JSON formatted logs
    pub json_logs: bool,

    /// Whether to include the event target (module path)
    pub show_target: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "epoch-feeds".to_string(),
            log_level: "info".to_string(),
            json_logs: false,
            show_target: true,
        }
    }
}

impl TelemetryConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `FEEDS_SERVICE_NAME`: Service name (default: epoch-feeds)
    /// - `FEEDS_LOG_LEVEL` or `RUST_LOG`: Log level (default: info)
    /// - `FEEDS_JSON_LOGS`: Enable JSON logs (default: false in dev, true in containers)
    /// - `FEEDS_LOG_TARGET`: Show event targets (default: true)
    pub fn from_env() -> Self {
        let is_container =
            env::var("KUBERNETES_SERVICE_HOST").is_ok() || env::var("DOCKER_CONTAINER").is_ok();

        Self {
            service_name: env::var("FEEDS_SERVICE_NAME")
                .unwrap_or_else(|_| "epoch-feeds".to_string()),

            log_level: env::var("FEEDS_LOG_LEVEL")
                .or_else(|_| env::var("RUST_LOG"))
                .unwrap_or_else(|_| "info".to_string()),

            json_logs: env::var("FEEDS_JSON_LOGS")
                .map(|v| v.to_lowercase() == "true" || v == "1")
                .unwrap_or(is_container),

            show_target: env::var("FEEDS_LOG_TARGET")
                .map(|v| v.to_lowercase() != "false" && v != "0")
                .unwrap_or(true),
        }
    }

    /// Quiet configuration for test binaries.
    pub fn for_testing() -> Self {
        Self {
            service_name: "epoch-feeds-test".to_string(),
            log_level: "warn".to_string(),
            json_logs: false,
            show_target: false,
        }
    }
}
