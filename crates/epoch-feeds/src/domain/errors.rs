//! # Domain Errors
//!
//! Error types for the feed engine.
//!
//! Each failure mode the engine can report to its caller has exactly one
//! variant in [`FeedError`]. Lower layers (codec, signatures, store) have their
//! own enums that convert into it with `?`.

use thiserror::Error;

use super::epoch::Epoch;
use super::feed::Feed;
use super::value_objects::{Address, Timestamp, User};

/// Errors produced while encoding or decoding chunk bytes.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CodecError {
    /// Input ended before a fixed-size field could be read.
    #[error("Truncated chunk: need at least {expected} bytes, got {actual}")]
    Truncated {
        /// Bytes required to continue decoding
        expected: usize,
        /// Bytes actually available
        actual: usize,
    },

    /// Declared payload length disagrees with the bytes present.
    #[error("Payload length mismatch: header declares {declared}, chunk holds {actual}")]
    LengthMismatch {
        /// Length written in the chunk header
        declared: usize,
        /// Length implied by the chunk size
        actual: usize,
    },

    /// Epoch level is beyond the coarsest level of the tree.
    #[error("Epoch level {level} out of range (max {max})")]
    LevelOutOfRange {
        /// Offending level
        level: u8,
        /// Highest valid level
        max: u8,
    },

    /// Epoch base is not aligned to its level's interval.
    #[error("Epoch base {base} is not aligned to level {level}")]
    MisalignedBase {
        /// Offending base time
        base: Timestamp,
        /// Level the base should be aligned to
        level: u8,
    },

    /// Hex input could not be parsed.
    #[error("Invalid hex: {0}")]
    InvalidHex(String),
}

/// Errors from signing or signature recovery.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SignatureError {
    /// The signature bytes are not a valid encoding.
    #[error("Invalid signature format")]
    InvalidFormat,

    /// Recovery id must be 0 or 1.
    #[error("Invalid recovery ID: {0}")]
    InvalidRecoveryId(u8),

    /// No public key could be recovered from the signature.
    #[error("Failed to recover public key")]
    RecoveryFailed,

    /// The signature recovers to someone other than the feed owner.
    #[error("Signer mismatch: expected {expected}, got {actual}")]
    SignerMismatch {
        /// Owner declared by the feed
        expected: User,
        /// Identity recovered from the signature
        actual: User,
    },

    /// The chunk's ID does not hash to the address it was stored under.
    #[error("Address mismatch: chunk stored at {claimed} hashes to {derived}")]
    AddressMismatch {
        /// Address the chunk was presented under
        claimed: Address,
        /// Address recomputed from the chunk's ID
        derived: Address,
    },

    /// The request carries no signature.
    #[error("Request is not signed")]
    Unsigned,

    /// The signing capability failed.
    #[error("Signing failed: {0}")]
    SigningFailed(String),
}

/// Errors from the external chunk store.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// Underlying I/O failed.
    #[error("Store I/O error: {message}")]
    Io {
        /// Error description
        message: String,
    },

    /// The store is not reachable or refused service.
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// The store's admission check refused the chunk.
    #[error("Chunk {address} rejected by store validator")]
    Rejected {
        /// Address of the rejected chunk
        address: Address,
    },
}

/// Errors reported by feed operations.
#[derive(Debug, Error)]
pub enum FeedError {
    /// No update satisfies the query's time bound.
    #[error("No update for feed {feed} at or before {time_limit}")]
    NotFound {
        /// Feed that was searched
        feed: Feed,
        /// Latest acceptable update time
        time_limit: Timestamp,
    },

    /// A different update already occupies the target epoch.
    #[error("Epoch {epoch} of feed {feed} already holds a different update at {address}")]
    Conflict {
        /// Feed being updated
        feed: Feed,
        /// Occupied epoch
        epoch: Epoch,
        /// Chunk address of the occupied slot
        address: Address,
    },

    /// Signature missing, malformed, or from the wrong signer.
    #[error("Invalid signature: {0}")]
    InvalidSignature(#[from] SignatureError),

    /// Chunk bytes could not be decoded.
    #[error("Decode error: {0}")]
    Decode(#[from] CodecError),

    /// The external store failed.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// The caller cancelled the operation.
    #[error("Operation cancelled")]
    Cancelled,

    /// The request is not acceptable for publication.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// `get_content` was called before any lookup succeeded for the feed.
    #[error("No cached content for feed {feed}")]
    NoCachedContent {
        /// Feed that has no cached update
        feed: Feed,
    },
}

impl FeedError {
    /// True for the "nothing published yet / before first update" outcome.
    pub fn is_not_found(&self) -> bool {
        matches!(self, FeedError::NotFound { .. })
    }
}
