//! Chunk admission check detached from any store.

use std::sync::Arc;

use crate::algorithms::authenticate;
use crate::domain::Address;
use crate::ports::{ChunkValidator, Hasher, SignatureRecovery};

/// Stand-alone admission check for update chunks.
///
/// Holds only the hash and recovery capabilities, so a store can own one
/// without owning the handler that writes to it.
#[derive(Clone)]
pub struct UpdateValidator {
    hasher: Arc<dyn Hasher>,
    recovery: Arc<dyn SignatureRecovery>,
}

impl UpdateValidator {
    /// Validator using the given capabilities.
    pub fn new(hasher: Arc<dyn Hasher>, recovery: Arc<dyn SignatureRecovery>) -> Self {
        Self { hasher, recovery }
    }
}

impl ChunkValidator for UpdateValidator {
    fn validate(&self, address: &Address, bytes: &[u8]) -> bool {
        match authenticate(address, bytes, self.hasher.as_ref(), self.recovery.as_ref()) {
            Ok(_) => true,
            Err(e) => {
                tracing::debug!(%address, error = %e, "chunk failed validation");
                false
            }
        }
    }
}

impl std::fmt::Debug for UpdateValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpdateValidator").finish_non_exhaustive()
    }
}
