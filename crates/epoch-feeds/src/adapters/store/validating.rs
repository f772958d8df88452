//! Store decorator that admits only chunks passing a validator.

use async_trait::async_trait;

use crate::domain::{Address, StoreError};
use crate::ports::{ChunkStore, ChunkValidator};

/// Store wrapper that only admits chunks its validator accepts.
///
/// With a `FeedHandler` as the validator, the wrapped store holds nothing but
/// authentic, correctly addressed update chunks.
#[derive(Debug)]
pub struct ValidatingStore<S, V> {
    inner: S,
    validator: V,
}

impl<S, V> ValidatingStore<S, V> {
    /// Wrap `inner`, admitting saves through `validator`.
    pub fn new(inner: S, validator: V) -> Self {
        Self { inner, validator }
    }

    /// The wrapped store.
    pub fn inner(&self) -> &S {
        &self.inner
    }
}

#[async_trait]
impl<S: ChunkStore, V: ChunkValidator> ChunkStore for ValidatingStore<S, V> {
    async fn load(&self, address: &Address) -> Result<Option<Vec<u8>>, StoreError> {
        self.inner.load(address).await
    }

    async fn save(&self, address: &Address, bytes: &[u8]) -> Result<(), StoreError> {
        if !self.validator.validate(address, bytes) {
            tracing::warn!(%address, "rejecting chunk that failed validation");
            return Err(StoreError::Rejected { address: *address });
        }
        self.inner.save(address, bytes).await
    }
}
