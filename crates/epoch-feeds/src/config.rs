//! # Feed Handler Configuration

use std::env;

use serde::{Deserialize, Serialize};

use crate::algorithms::MIN_CHUNK_LENGTH;

/// Chunk size the default payload limit is derived from.
pub const DEFAULT_CHUNK_SIZE: usize = 4096;

/// Feed handler configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Largest payload `update` accepts, in bytes.
    pub max_payload_len: usize,

    /// Feeds tracked by the advisory epoch cache. Zero disables the cache.
    pub cache_capacity: usize,

    /// Authenticate every chunk read during lookup.
    ///
    /// Turning this off is only sound when the store already runs the
    /// handler as its admission check.
    pub verify_on_read: bool,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            max_payload_len: DEFAULT_CHUNK_SIZE - MIN_CHUNK_LENGTH,
            cache_capacity: 1000,
            verify_on_read: true,
        }
    }
}

impl FeedConfig {
    /// Create a config for testing (smaller values).
    pub fn for_testing() -> Self {
        Self {
            max_payload_len: 256,
            cache_capacity: 16,
            verify_on_read: true,
        }
    }

    /// Defaults overridden from the environment.
    ///
    /// # Environment Variables
    ///
    /// - `FEEDS_MAX_PAYLOAD_LEN`: payload limit in bytes (default: 3958)
    /// - `FEEDS_CACHE_CAPACITY`: epoch cache entries, 0 to disable (default: 1000)
    /// - `FEEDS_VERIFY_ON_READ`: authenticate chunks during lookup (default: true)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            max_payload_len: env::var("FEEDS_MAX_PAYLOAD_LEN")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_payload_len),

            cache_capacity: env::var("FEEDS_CACHE_CAPACITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.cache_capacity),

            verify_on_read: env::var("FEEDS_VERIFY_ON_READ")
                .map(|v| v.to_lowercase() != "false" && v != "0")
                .unwrap_or(defaults.verify_on_read),
        }
    }
}
