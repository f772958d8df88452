//! Chunk store held in process memory.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::domain::{Address, StoreError};
use crate::ports::ChunkStore;

/// In-memory chunk store.
///
/// Reads see every save that returned before them, which is what the
/// conflict check in `update` relies on.
#[derive(Debug, Default)]
pub struct InMemoryChunkStore {
    chunks: RwLock<HashMap<Address, Vec<u8>>>,
}

impl InMemoryChunkStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored chunks.
    pub fn len(&self) -> usize {
        self.chunks.read().len()
    }

    /// Whether the store holds no chunks.
    pub fn is_empty(&self) -> bool {
        self.chunks.read().is_empty()
    }

    /// Overwrite a chunk without any checks. Test hook for simulating a
    /// misbehaving store.
    pub fn corrupt(&self, address: Address, bytes: Vec<u8>) {
        self.chunks.write().insert(address, bytes);
    }
}

#[async_trait]
impl ChunkStore for InMemoryChunkStore {
    async fn load(&self, address: &Address) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.chunks.read().get(address).cloned())
    }

    async fn save(&self, address: &Address, bytes: &[u8]) -> Result<(), StoreError> {
        self.chunks.write().insert(*address, bytes.to_vec());
        Ok(())
    }
}
