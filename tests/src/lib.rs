//! # Epoch Feeds Test Suite
//!
//! End-to-end flows across the engine, its store adapters and real
//! secp256k1 keys.
//!
//! ## Structure
//!
//! ```text
//! tests/
//! ├── src/
//! │   ├── fixtures.rs       # Handler and publishing helpers
//! │   └── integration/      # Scenario flows
//! │       ├── flows.rs      # Dense, sparse, conflict, tamper, cancellation
//! │       └── persistence.rs# File store restarts, validating store
//! └── benches/
//!     └── lookup_benchmarks.rs
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p feeds-tests
//! cargo bench -p feeds-tests
//! ```

pub mod fixtures;
pub mod integration;
