//! # Epoch Feeds
//!
//! Mutable, versioned feeds on top of an immutable content-addressed store.
//!
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Purpose
//!
//! A producer publishes time-stamped updates under a topic. Any reader who
//! knows only the producer's identity and the topic can locate the latest
//! update, or the update current at any past instant, with a number of store
//! reads logarithmic in the time range and without any index service.
//!
//! ## How it works
//!
//! | Piece | Role |
//! |-------|------|
//! | Epoch tree | Binary interval tree over time; each update occupies one node |
//! | Epoch transition | Picks the node for a new update from the previous one |
//! | Chunk codec | Address = H(user, topic, epoch); payload and signature inside |
//! | Signing | Chunks are self-certifying: signature binds the address |
//! | Lookup | Replays the transition walk against the store |
//!
//! ## Module Structure
//!
//! ```text
//! epoch-feeds/
//! ├── domain/          # Epoch, Feed, Request, Query, errors
//! ├── algorithms/      # next_epoch, codec, signing, lookup search
//! ├── ports/           # FeedApi (inbound) + store/clock/crypto traits (outbound)
//! ├── adapters/        # Stores, secp256k1, keccak, system clock
//! ├── application/     # FeedHandler orchestrating everything
//! ├── config.rs        # FeedConfig
//! └── metrics.rs       # FeedMetrics
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod algorithms;
pub mod application;
pub mod config;
pub mod domain;
pub mod metrics;
pub mod ports;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

// Re-exports
pub use adapters::{
    FileChunkStore, InMemoryChunkStore, Keccak256Hasher, Secp256k1Recovery, Secp256k1Signer,
    SystemTimeSource, ValidatingStore,
};
pub use algorithms::{
    authenticate, first_epoch, next_epoch, next_level, search, verify_update, EpochReader,
    SearchOutcome, UpdateChunk,
};
pub use application::{CachedUpdate, FeedHandler, UpdateValidator};
pub use config::FeedConfig;
pub use domain::{
    Address, CodecError, Epoch, Feed, FeedError, LookupResult, Query, Request, Signature,
    SignatureError, StoreError, Timestamp, Topic, UpdateId, User, HIGHEST_LEVEL, LOWEST_LEVEL,
};
pub use metrics::{FeedMetrics, FeedMetricsSnapshot};
pub use ports::{
    ChunkStore, ChunkValidator, FeedApi, Hasher, SignatureRecovery, Signer, TimeSource,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
