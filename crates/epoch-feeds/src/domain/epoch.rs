//! # Epoch Model
//!
//! An epoch is a node of a binary interval tree over the timeline. An epoch at
//! `level` spans `2^level` seconds starting at `base`, and `base` is always a
//! multiple of that span, so the intervals of one level tile the timeline and
//! every interval nests inside exactly one interval of each coarser level.
//!
//! ```text
//! level 63  [0 ........................................ 2^63)[2^63 ... 2^64)
//! level 62  [0 ................ 2^62)[2^62 ........... 2^63) ...
//! level 61  [0 ... 2^61)[2^61 ... 2^62) ...
//! ```
//!
//! The two root intervals together cover every `u64` timestamp, so a search
//! never has more than one earlier root to fall back to.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::errors::CodecError;
use super::value_objects::Timestamp;

/// Finest level: one-second intervals.
pub const LOWEST_LEVEL: u8 = 0;

/// Coarsest level: the root intervals of the tree (2^63 s each).
pub const HIGHEST_LEVEL: u8 = 63;

/// Serialized size of an epoch (`base: u64 BE || level: u8`).
pub const EPOCH_LENGTH: usize = 9;

/// Span in seconds of an interval at `level`.
pub const fn unit_duration(level: u8) -> u64 {
    1u64 << level
}

/// Floor `time` to the start of its interval at `level`.
pub const fn floor_to_level(time: Timestamp, level: u8) -> Timestamp {
    time & !(unit_duration(level) - 1)
}

/// A time interval `[base, base + 2^level)` in the epoch tree.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawEpoch")]
pub struct Epoch {
    base: Timestamp,
    level: u8,
}

/// Unchecked serde form; goes through the same checks as the wire form.
#[derive(Deserialize)]
struct RawEpoch {
    base: Timestamp,
    level: u8,
}

impl TryFrom<RawEpoch> for Epoch {
    type Error = CodecError;

    fn try_from(raw: RawEpoch) -> Result<Self, Self::Error> {
        Epoch::from_parts(raw.base, raw.level)
    }
}

impl Epoch {
    /// The epoch at `level` containing `time`.
    pub fn new(time: Timestamp, level: u8) -> Result<Self, CodecError> {
        if level > HIGHEST_LEVEL {
            return Err(CodecError::LevelOutOfRange {
                level,
                max: HIGHEST_LEVEL,
            });
        }
        Ok(Self::containing(time, level))
    }

    /// Infallible constructor for levels already known to be in range.
    pub(crate) const fn containing(time: Timestamp, level: u8) -> Self {
        Self {
            base: floor_to_level(time, level),
            level,
        }
    }

    /// Start of the interval.
    pub fn base(&self) -> Timestamp {
        self.base
    }

    /// Granularity; higher is coarser.
    pub fn level(&self) -> u8 {
        self.level
    }

    /// Length of the interval in seconds.
    pub fn duration(&self) -> u64 {
        unit_duration(self.level)
    }

    /// Whether `time` falls inside the interval.
    pub fn contains(&self, time: Timestamp) -> bool {
        time >= self.base && time - self.base < self.duration()
    }

    /// The enclosing interval one level up, or `None` at the root.
    pub fn parent(&self) -> Option<Self> {
        if self.level >= HIGHEST_LEVEL {
            return None;
        }
        Some(Self::containing(self.base, self.level + 1))
    }

    /// Ordering used to decide which of two known epochs is more recent:
    /// a later base wins, and on equal bases the finer epoch wins.
    pub fn is_after(&self, other: &Epoch) -> bool {
        if self.base == other.base {
            return self.level < other.level;
        }
        self.base > other.base
    }

    /// Wire form used inside update IDs.
    pub fn to_bytes(&self) -> [u8; EPOCH_LENGTH] {
        let mut out = [0u8; EPOCH_LENGTH];
        out[..8].copy_from_slice(&self.base.to_be_bytes());
        out[8] = self.level;
        out
    }

    /// Parse the wire form, rejecting out-of-range levels and unaligned bases.
    pub fn from_bytes(bytes: &[u8; EPOCH_LENGTH]) -> Result<Self, CodecError> {
        let mut base_bytes = [0u8; 8];
        base_bytes.copy_from_slice(&bytes[..8]);
        Self::from_parts(u64::from_be_bytes(base_bytes), bytes[8])
    }

    fn from_parts(base: Timestamp, level: u8) -> Result<Self, CodecError> {
        let epoch = Self::new(base, level)?;
        if epoch.base != base {
            return Err(CodecError::MisalignedBase { base, level });
        }
        Ok(epoch)
    }
}

impl fmt::Display for Epoch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.base, self.level)
    }
}

impl fmt::Debug for Epoch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Epoch(base={}, level={})", self.base, self.level)
    }
}
