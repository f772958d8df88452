//! # Adapters Module
//!
//! Production implementations of the outbound ports.
//!
//! ## Modules
//!
//! - `crypto`: Keccak-256 hasher, secp256k1 signer and recovery
//! - `store`: in-memory, directory-backed and validating chunk stores
//! - `time`: system clock

pub mod crypto;
pub mod store;
pub mod time;

pub use crypto::{user_from_key, Keccak256Hasher, Secp256k1Recovery, Secp256k1Signer};
pub use store::{FileChunkStore, InMemoryChunkStore, ValidatingStore};
pub use time::SystemTimeSource;
