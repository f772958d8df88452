//! Deterministic stand-ins for the outbound ports.
//!
//! Compiled for this crate's tests and for downstream crates that enable the
//! `test-utils` feature.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;

use crate::domain::{
    Address, Hash, Signature, SignatureError, StoreError, Timestamp, User, SIGNATURE_LENGTH,
    USER_LENGTH,
};
use crate::ports::{ChunkStore, SignatureRecovery, Signer, TimeSource};

/// Manually driven clock.
#[derive(Debug, Default)]
pub struct FakeClock {
    now: AtomicU64,
}

impl FakeClock {
    /// Clock frozen at `now`.
    pub fn new(now: Timestamp) -> Self {
        Self {
            now: AtomicU64::new(now),
        }
    }

    /// Jump to `now`.
    pub fn set(&self, now: Timestamp) {
        self.now.store(now, Ordering::SeqCst);
    }

    /// Advance by `seconds`.
    pub fn fast_forward(&self, seconds: u64) {
        self.now.fetch_add(seconds, Ordering::SeqCst);
    }

    /// Advance by one second, returning the new time.
    pub fn tick(&self) -> Timestamp {
        self.now.fetch_add(1, Ordering::SeqCst) + 1
    }
}

impl TimeSource for FakeClock {
    fn now(&self) -> Timestamp {
        self.now.load(Ordering::SeqCst)
    }
}

/// Signer whose "signature" is `user || digest || zero padding`.
///
/// Pair with [`FakeRecovery`]. Offers no security at all.
#[derive(Debug, Clone, Copy)]
pub struct FakeSigner {
    user: User,
}

impl FakeSigner {
    /// Signer for the user `[seed; 20]`.
    pub fn new(seed: u8) -> Self {
        Self {
            user: User([seed; USER_LENGTH]),
        }
    }
}

impl Signer for FakeSigner {
    fn user(&self) -> User {
        self.user
    }

    fn sign(&self, digest: &Hash) -> Result<Signature, SignatureError> {
        let mut out = [0u8; SIGNATURE_LENGTH];
        out[..USER_LENGTH].copy_from_slice(self.user.as_bytes());
        out[USER_LENGTH..USER_LENGTH + 32].copy_from_slice(digest);
        Ok(Signature(out))
    }
}

/// Recovers the user embedded by [`FakeSigner`] if the digest matches.
#[derive(Debug, Default, Clone, Copy)]
pub struct FakeRecovery;

impl SignatureRecovery for FakeRecovery {
    fn recover_signer(&self, digest: &Hash, signature: &Signature) -> Result<User, SignatureError> {
        let bytes = signature.as_bytes();
        if &bytes[USER_LENGTH..USER_LENGTH + 32] != digest {
            return Err(SignatureError::RecoveryFailed);
        }
        let mut user = [0u8; USER_LENGTH];
        user.copy_from_slice(&bytes[..USER_LENGTH]);
        Ok(User(user))
    }
}

/// Store wrapper that fails every call while switched on.
#[derive(Debug)]
pub struct FlakyStore<S> {
    inner: S,
    failing: AtomicBool,
}

impl<S> FlakyStore<S> {
    /// Healthy wrapper around `inner`.
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            failing: AtomicBool::new(false),
        }
    }

    /// Start or stop failing.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("injected failure".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl<S: ChunkStore> ChunkStore for FlakyStore<S> {
    async fn load(&self, address: &Address) -> Result<Option<Vec<u8>>, StoreError> {
        self.check()?;
        self.inner.load(address).await
    }

    async fn save(&self, address: &Address, bytes: &[u8]) -> Result<(), StoreError> {
        self.check()?;
        self.inner.save(address, bytes).await
    }
}

/// Store whose calls never complete.
#[derive(Debug, Default, Clone, Copy)]
pub struct StallingStore;

#[async_trait]
impl ChunkStore for StallingStore {
    async fn load(&self, _address: &Address) -> Result<Option<Vec<u8>>, StoreError> {
        std::future::pending().await
    }

    async fn save(&self, _address: &Address, _bytes: &[u8]) -> Result<(), StoreError> {
        std::future::pending().await
    }
}
