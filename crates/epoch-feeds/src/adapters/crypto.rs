//! # secp256k1 / Keccak-256 Adapters
//!
//! Production implementations of the hashing and signature ports.
//!
//! ## Security Properties
//!
//! - RFC 6979 deterministic nonces (no RNG dependency for signing)
//! - Low-S normalization, recovery id in `{0, 1}`
//! - Secret bytes passed to `from_bytes` are zeroized after parsing; the
//!   held `SigningKey` wipes its scalar on drop

use k256::ecdsa::{RecoveryId, Signature as EcdsaSignature, SigningKey, VerifyingKey};
use zeroize::Zeroize;

use crate::domain::{keccak256, Hash, Signature, SignatureError, User, SIGNATURE_LENGTH};
use crate::ports::{Hasher, SignatureRecovery, Signer};

/// Keccak-256, the hash behind chunk addresses and signing digests.
#[derive(Debug, Default, Clone, Copy)]
pub struct Keccak256Hasher;

impl Hasher for Keccak256Hasher {
    fn hash(&self, data: &[u8]) -> Hash {
        keccak256(data)
    }
}

/// Identity of a public key: last 20 bytes of keccak256 of the uncompressed
/// point without its `0x04` prefix.
pub fn user_from_key(key: &VerifyingKey) -> User {
    let point = key.to_encoded_point(false);
    let hash = keccak256(&point.as_bytes()[1..]);

    let mut user = [0u8; 20];
    user.copy_from_slice(&hash[12..]);
    User(user)
}

/// Producer key.
pub struct Secp256k1Signer {
    signing_key: SigningKey,
    user: User,
}

impl Secp256k1Signer {
    /// Generate a random key.
    pub fn generate() -> Self {
        Self::from_key(SigningKey::random(&mut rand::thread_rng()))
    }

    /// Load a key from its 32-byte secret scalar.
    pub fn from_bytes(mut bytes: [u8; 32]) -> Result<Self, SignatureError> {
        let key = SigningKey::from_bytes((&bytes).into());
        bytes.zeroize();
        key.map(Self::from_key)
            .map_err(|e| SignatureError::SigningFailed(e.to_string()))
    }

    fn from_key(signing_key: SigningKey) -> Self {
        let user = user_from_key(signing_key.verifying_key());
        Self { signing_key, user }
    }
}

impl Signer for Secp256k1Signer {
    fn user(&self) -> User {
        self.user
    }

    fn sign(&self, digest: &Hash) -> Result<Signature, SignatureError> {
        let (signature, recovery_id) = self
            .signing_key
            .sign_prehash_recoverable(digest)
            .map_err(|e| SignatureError::SigningFailed(e.to_string()))?;

        let mut out = [0u8; SIGNATURE_LENGTH];
        out[..64].copy_from_slice(&signature.to_bytes());
        out[64] = recovery_id.to_byte();
        Ok(Signature(out))
    }
}

impl std::fmt::Debug for Secp256k1Signer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Secp256k1Signer")
            .field("user", &self.user)
            .finish_non_exhaustive()
    }
}

/// Recovers producer identities from `r || s || v` signatures.
#[derive(Debug, Default, Clone, Copy)]
pub struct Secp256k1Recovery;

impl SignatureRecovery for Secp256k1Recovery {
    fn recover_signer(&self, digest: &Hash, signature: &Signature) -> Result<User, SignatureError> {
        let bytes = signature.as_bytes();
        let v = bytes[64];
        let recovery_id = RecoveryId::from_byte(v).ok_or(SignatureError::InvalidRecoveryId(v))?;
        let sig =
            EcdsaSignature::from_slice(&bytes[..64]).map_err(|_| SignatureError::InvalidFormat)?;

        let key = VerifyingKey::recover_from_prehash(digest, &sig, recovery_id)
            .map_err(|_| SignatureError::RecoveryFailed)?;
        Ok(user_from_key(&key))
    }
}
