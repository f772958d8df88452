//! # Signing and Authentication
//!
//! A chunk is self-certifying: its ID hashes to its address, and its signature
//! over `H(address || timestamp || payload)` recovers to the feed owner. Both
//! checks use nothing but the chunk bytes and the address they were fetched
//! from.

use crate::domain::{Address, Epoch, Feed, FeedError, Request, SignatureError, UpdateId};
use crate::ports::{Hasher, SignatureRecovery, Signer};

use super::codec::{self, UpdateChunk};

impl Request {
    /// Sign the request, making `signer` the owner of its feed.
    ///
    /// The feed's user is replaced by the signer's identity before the digest
    /// is computed, so the address signed over is the one the chunk will live
    /// at.
    pub fn sign(
        &mut self,
        signer: &dyn Signer,
        hasher: &dyn Hasher,
    ) -> Result<(), SignatureError> {
        let feed = Feed::new(signer.user(), self.feed().topic);
        self.set_feed(feed);

        let address = codec::address(&self.id(), hasher);
        let digest = codec::signing_digest(&address, self.timestamp(), self.payload(), hasher);
        let signature = signer.sign(&digest)?;
        self.attach_signature(signature);
        Ok(())
    }

    /// Check that the signature recovers to the feed's user.
    pub fn verify(
        &self,
        recovery: &dyn SignatureRecovery,
        hasher: &dyn Hasher,
    ) -> Result<(), SignatureError> {
        let signature = self.signature().ok_or(SignatureError::Unsigned)?;
        let address = codec::address(&self.id(), hasher);
        let digest = codec::signing_digest(&address, self.timestamp(), self.payload(), hasher);

        let signer = recovery.recover_signer(&digest, signature)?;
        if signer != self.feed().user {
            return Err(SignatureError::SignerMismatch {
                expected: self.feed().user,
                actual: signer,
            });
        }
        Ok(())
    }

    /// Address and chunk bytes of a signed request.
    pub fn to_chunk(&self, hasher: &dyn Hasher) -> Result<(Address, Vec<u8>), FeedError> {
        let signature = self.signature().ok_or(SignatureError::Unsigned)?;
        Ok(codec::encode(
            &self.id(),
            self.timestamp(),
            self.payload(),
            signature,
            hasher,
        )?)
    }
}

/// Decode `bytes` and check that they are an authentic chunk for `address`.
pub fn authenticate(
    address: &Address,
    bytes: &[u8],
    hasher: &dyn Hasher,
    recovery: &dyn SignatureRecovery,
) -> Result<UpdateChunk, FeedError> {
    let chunk = codec::decode(bytes)?;

    let derived = codec::address(&chunk.id, hasher);
    if derived != *address {
        return Err(SignatureError::AddressMismatch {
            claimed: *address,
            derived,
        }
        .into());
    }

    let digest = codec::signing_digest(address, chunk.timestamp, &chunk.payload, hasher);
    let signer = recovery.recover_signer(&digest, &chunk.signature)?;
    if signer != chunk.id.feed.user {
        return Err(SignatureError::SignerMismatch {
            expected: chunk.id.feed.user,
            actual: signer,
        }
        .into());
    }
    Ok(chunk)
}

/// Like [`authenticate`], but also requires the chunk to sit at `(feed, epoch)`.
pub fn verify_update(
    feed: &Feed,
    epoch: Epoch,
    address: &Address,
    bytes: &[u8],
    hasher: &dyn Hasher,
    recovery: &dyn SignatureRecovery,
) -> Result<UpdateChunk, FeedError> {
    let expected = codec::address(&UpdateId::new(*feed, epoch), hasher);
    if expected != *address {
        return Err(SignatureError::AddressMismatch {
            claimed: *address,
            derived: expected,
        }
        .into());
    }
    authenticate(address, bytes, hasher, recovery)
}
