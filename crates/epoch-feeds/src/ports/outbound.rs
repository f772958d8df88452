//! # Outbound Ports (Driven Ports)
//!
//! Capabilities the engine needs from its host: a content-addressed chunk
//! store, a clock, a hash function, and a recoverable signature scheme.
//!
//! Production adapters live in `crate::adapters`; deterministic fakes for
//! tests live in `crate::test_utils`.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{Address, Hash, Signature, SignatureError, StoreError, Timestamp, User};

/// Load/save-by-address block store.
///
/// Saving the same `(address, bytes)` twice must be harmless. The engine never
/// deletes.
#[async_trait]
pub trait ChunkStore: Send + Sync {
    /// Fetch the bytes stored at `address`, `Ok(None)` on a miss.
    async fn load(&self, address: &Address) -> Result<Option<Vec<u8>>, StoreError>;

    /// Persist `bytes` under `address`.
    async fn save(&self, address: &Address, bytes: &[u8]) -> Result<(), StoreError>;
}

#[async_trait]
impl<T: ChunkStore + ?Sized> ChunkStore for Arc<T> {
    async fn load(&self, address: &Address) -> Result<Option<Vec<u8>>, StoreError> {
        (**self).load(address).await
    }

    async fn save(&self, address: &Address, bytes: &[u8]) -> Result<(), StoreError> {
        (**self).save(address, bytes).await
    }
}

/// Abstract interface for time operations (for testability).
pub trait TimeSource: Send + Sync {
    /// Get current timestamp in seconds since epoch.
    fn now(&self) -> Timestamp;
}

/// Hash function used for chunk addresses and signing digests.
pub trait Hasher: Send + Sync {
    /// Digest of `data`.
    fn hash(&self, data: &[u8]) -> Hash;
}

/// Producer-side signing capability.
pub trait Signer: Send + Sync {
    /// Identity that signatures from this signer recover to.
    fn user(&self) -> User;

    /// Sign a 32-byte digest.
    fn sign(&self, digest: &Hash) -> Result<Signature, SignatureError>;
}

/// Reader-side signature recovery.
pub trait SignatureRecovery: Send + Sync {
    /// Identity that produced `signature` over `digest`.
    fn recover_signer(&self, digest: &Hash, signature: &Signature) -> Result<User, SignatureError>;
}

/// Content-admission check a store can consult before accepting a chunk.
pub trait ChunkValidator: Send + Sync {
    /// Whether `bytes` is an authentic chunk for `address`. Never fails.
    fn validate(&self, address: &Address, bytes: &[u8]) -> bool;
}

impl<T: ChunkValidator + ?Sized> ChunkValidator for Arc<T> {
    fn validate(&self, address: &Address, bytes: &[u8]) -> bool {
        (**self).validate(address, bytes)
    }
}
