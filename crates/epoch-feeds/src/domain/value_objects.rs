//! # Domain Value Objects
//!
//! Fixed-width identifiers shared by every layer: producer identity, topic,
//! chunk address and recoverable signature.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};

use super::errors::CodecError;

/// 32-byte digest.
pub type Hash = [u8; 32];

/// Seconds since the Unix epoch.
pub type Timestamp = u64;

/// Length of a producer identity.
pub const USER_LENGTH: usize = 20;

/// Length of a topic.
pub const TOPIC_LENGTH: usize = 32;

/// Length of a chunk address.
pub const ADDRESS_LENGTH: usize = 32;

/// Length of a recoverable signature (`r || s || v`).
pub const SIGNATURE_LENGTH: usize = 65;

/// Keccak-256 of `data`.
pub fn keccak256(data: &[u8]) -> Hash {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    hasher.finalize().into()
}

fn parse_hex<const N: usize>(s: &str) -> Result<[u8; N], CodecError> {
    let s = s.strip_prefix("0x").unwrap_or(s);
    let bytes = hex::decode(s).map_err(|e| CodecError::InvalidHex(e.to_string()))?;
    bytes.try_into().map_err(|b: Vec<u8>| {
        CodecError::InvalidHex(format!("expected {} bytes, got {}", N, b.len()))
    })
}

/// Producer identity: an address derived from the producer's public key.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct User(pub [u8; USER_LENGTH]);

impl User {
    /// Raw bytes.
    pub fn as_bytes(&self) -> &[u8; USER_LENGTH] {
        &self.0
    }

    /// Parse from hex, with or without `0x`.
    pub fn from_hex(s: &str) -> Result<Self, CodecError> {
        parse_hex(s).map(Self)
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "User({})", self)
    }
}

/// Topic identifier, derived from a human-readable name.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Topic(pub [u8; TOPIC_LENGTH]);

impl Topic {
    /// Derive a topic as `keccak256(utf8(name) || disambiguator)`.
    ///
    /// Identical inputs always yield identical topics. The disambiguator lets
    /// several feeds share a name, e.g. one feed per piece of related content.
    pub fn new(name: &str, disambiguator: Option<&[u8]>) -> Self {
        let mut hasher = Keccak256::new();
        hasher.update(name.as_bytes());
        if let Some(extra) = disambiguator {
            hasher.update(extra);
        }
        Self(hasher.finalize().into())
    }

    /// Raw bytes.
    pub fn as_bytes(&self) -> &[u8; TOPIC_LENGTH] {
        &self.0
    }

    /// Parse from hex, with or without `0x`.
    pub fn from_hex(s: &str) -> Result<Self, CodecError> {
        parse_hex(s).map(Self)
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Topic({})", self)
    }
}

/// Storage address of an update chunk.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Address(pub [u8; ADDRESS_LENGTH]);

impl Address {
    /// Raw bytes.
    pub fn as_bytes(&self) -> &[u8; ADDRESS_LENGTH] {
        &self.0
    }

    /// Lowercase hex without prefix; used as a file name by disk stores.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from hex, with or without `0x`.
    pub fn from_hex(s: &str) -> Result<Self, CodecError> {
        parse_hex(s).map(Self)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({:02x?}...)", &self.0[..4])
    }
}

/// Recoverable signature, treated as an opaque fixed-size blob.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Signature(pub [u8; SIGNATURE_LENGTH]);

impl Signature {
    /// Raw bytes.
    pub fn as_bytes(&self) -> &[u8; SIGNATURE_LENGTH] {
        &self.0
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({:02x?}...)", &self.0[..4])
    }
}
