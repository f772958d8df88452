//! # Update Chunk Codec
//!
//! Byte layout of a persisted update:
//!
//! ```text
//! ID (61) | timestamp u64 BE (8) | payload_len u32 BE (4) | payload | signature (65)
//! ```
//!
//! The address of a chunk is the hash of its ID alone, so it is independent of
//! the payload and can be computed by any reader who knows the feed and epoch.

use crate::domain::{
    Address, CodecError, Epoch, Feed, Hash, Signature, Timestamp, UpdateId, ID_LENGTH,
    SIGNATURE_LENGTH,
};
use crate::ports::Hasher;

const TIMESTAMP_LENGTH: usize = 8;
const PAYLOAD_LEN_LENGTH: usize = 4;
const HEADER_LENGTH: usize = ID_LENGTH + TIMESTAMP_LENGTH + PAYLOAD_LEN_LENGTH;

/// Size of a chunk with an empty payload.
pub const MIN_CHUNK_LENGTH: usize = HEADER_LENGTH + SIGNATURE_LENGTH;

/// A decoded update chunk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UpdateChunk {
    /// Feed and epoch the chunk claims to occupy.
    pub id: UpdateId,
    /// Logical time of the update.
    pub timestamp: Timestamp,
    /// Opaque payload.
    pub payload: Vec<u8>,
    /// Producer signature over [`signing_digest`].
    pub signature: Signature,
}

impl UpdateChunk {
    /// Feed the chunk claims to belong to.
    pub fn feed(&self) -> Feed {
        self.id.feed
    }

    /// Epoch the chunk claims to occupy.
    pub fn epoch(&self) -> Epoch {
        self.id.epoch
    }
}

/// Chunk address of an update ID.
pub fn address(id: &UpdateId, hasher: &dyn Hasher) -> Address {
    Address(hasher.hash(&id.to_bytes()))
}

/// Digest a producer signs: `H(address || timestamp BE || payload)`.
pub fn signing_digest(
    address: &Address,
    timestamp: Timestamp,
    payload: &[u8],
    hasher: &dyn Hasher,
) -> Hash {
    let mut preimage = Vec::with_capacity(address.0.len() + TIMESTAMP_LENGTH + payload.len());
    preimage.extend_from_slice(address.as_bytes());
    preimage.extend_from_slice(&timestamp.to_be_bytes());
    preimage.extend_from_slice(payload);
    hasher.hash(&preimage)
}

/// Serialize an update, returning its address and chunk bytes.
///
/// # Errors
/// `CodecError::LengthMismatch` if the payload does not fit the `u32` length
/// field.
pub fn encode(
    id: &UpdateId,
    timestamp: Timestamp,
    payload: &[u8],
    signature: &Signature,
    hasher: &dyn Hasher,
) -> Result<(Address, Vec<u8>), CodecError> {
    let payload_len = u32::try_from(payload.len()).map_err(|_| CodecError::LengthMismatch {
        declared: u32::MAX as usize,
        actual: payload.len(),
    })?;

    let mut bytes = Vec::with_capacity(MIN_CHUNK_LENGTH + payload.len());
    bytes.extend_from_slice(&id.to_bytes());
    bytes.extend_from_slice(&timestamp.to_be_bytes());
    bytes.extend_from_slice(&payload_len.to_be_bytes());
    bytes.extend_from_slice(payload);
    bytes.extend_from_slice(signature.as_bytes());

    Ok((address(id, hasher), bytes))
}

/// Parse chunk bytes.
///
/// Strict: the declared payload length must account for every byte between
/// the header and the signature.
pub fn decode(bytes: &[u8]) -> Result<UpdateChunk, CodecError> {
    if bytes.len() < MIN_CHUNK_LENGTH {
        return Err(CodecError::Truncated {
            expected: MIN_CHUNK_LENGTH,
            actual: bytes.len(),
        });
    }

    let mut id_bytes = [0u8; ID_LENGTH];
    id_bytes.copy_from_slice(&bytes[..ID_LENGTH]);
    let id = UpdateId::from_bytes(&id_bytes)?;

    let mut ts_bytes = [0u8; TIMESTAMP_LENGTH];
    ts_bytes.copy_from_slice(&bytes[ID_LENGTH..ID_LENGTH + TIMESTAMP_LENGTH]);
    let timestamp = u64::from_be_bytes(ts_bytes);

    let mut len_bytes = [0u8; PAYLOAD_LEN_LENGTH];
    len_bytes.copy_from_slice(&bytes[ID_LENGTH + TIMESTAMP_LENGTH..HEADER_LENGTH]);
    let declared = u32::from_be_bytes(len_bytes) as usize;

    let actual = bytes.len() - MIN_CHUNK_LENGTH;
    if declared != actual {
        return Err(CodecError::LengthMismatch { declared, actual });
    }

    let payload_end = HEADER_LENGTH + declared;
    let mut signature = [0u8; SIGNATURE_LENGTH];
    signature.copy_from_slice(&bytes[payload_end..]);

    Ok(UpdateChunk {
        id,
        timestamp,
        payload: bytes[HEADER_LENGTH..payload_end].to_vec(),
        signature: Signature(signature),
    })
}
