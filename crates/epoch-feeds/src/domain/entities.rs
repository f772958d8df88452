//! # Domain Entities
//!
//! Requests on their way into a feed, queries against a feed, and lookup
//! results coming back out.

use super::epoch::{Epoch, HIGHEST_LEVEL};
use super::feed::{Feed, UpdateId};
use super::value_objects::{Address, Signature, Timestamp, Topic};

/// An update in progress.
///
/// Mutable until signed. Any mutation after signing drops the signature, so a
/// signed request always authenticates exactly the fields it carries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Request {
    feed: Feed,
    epoch: Epoch,
    timestamp: Timestamp,
    payload: Vec<u8>,
    signature: Option<Signature>,
}

impl Request {
    /// An unsigned request with an empty payload.
    pub fn new(feed: Feed, epoch: Epoch, timestamp: Timestamp) -> Self {
        Self {
            feed,
            epoch,
            timestamp,
            payload: Vec::new(),
            signature: None,
        }
    }

    /// The first update of a feed: root-level epoch containing `now`.
    ///
    /// The user half of the feed is filled in when the request is signed.
    pub fn first(topic: Topic, now: Timestamp) -> Self {
        let feed = Feed {
            topic,
            ..Feed::default()
        };
        Self::new(feed, Epoch::containing(now, HIGHEST_LEVEL), now)
    }

    /// Feed this request publishes to.
    pub fn feed(&self) -> &Feed {
        &self.feed
    }

    /// Target epoch.
    pub fn epoch(&self) -> Epoch {
        self.epoch
    }

    /// Logical time of the update.
    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    /// Update payload.
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Signature, once signed.
    pub fn signature(&self) -> Option<&Signature> {
        self.signature.as_ref()
    }

    /// Whether the request carries a signature.
    pub fn is_signed(&self) -> bool {
        self.signature.is_some()
    }

    /// Feed plus epoch.
    pub fn id(&self) -> UpdateId {
        UpdateId::new(self.feed, self.epoch)
    }

    /// Replace the payload.
    pub fn set_payload(&mut self, payload: impl Into<Vec<u8>>) {
        self.payload = payload.into();
        self.signature = None;
    }

    /// Force a different epoch than the one suggested.
    pub fn set_epoch(&mut self, epoch: Epoch) {
        self.epoch = epoch;
        self.signature = None;
    }

    /// Override the logical time of the update.
    pub fn set_timestamp(&mut self, timestamp: Timestamp) {
        self.timestamp = timestamp;
        self.signature = None;
    }

    pub(crate) fn set_feed(&mut self, feed: Feed) {
        self.feed = feed;
        self.signature = None;
    }

    pub(crate) fn attach_signature(&mut self, signature: Signature) {
        self.signature = Some(signature);
    }
}

/// A search for the newest update of a feed at or before a point in time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Query {
    /// Feed to search.
    pub feed: Feed,
    /// Latest acceptable update time; `None` means "now".
    pub time_limit: Option<Timestamp>,
    /// Epoch known from an earlier lookup, used as a starting point.
    pub hint: Option<Epoch>,
}

impl Query {
    /// The latest update of `feed`.
    pub fn latest(feed: Feed) -> Self {
        Self {
            feed,
            time_limit: None,
            hint: None,
        }
    }

    /// The update of `feed` that was current at `time_limit`.
    pub fn at(feed: Feed, time_limit: Timestamp) -> Self {
        Self {
            feed,
            time_limit: Some(time_limit),
            hint: None,
        }
    }

    /// Start the search from a previously resolved epoch.
    pub fn with_hint(mut self, hint: Epoch) -> Self {
        self.hint = Some(hint);
        self
    }
}

/// The update a lookup converged on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LookupResult {
    /// Epoch holding the update.
    pub epoch: Epoch,
    /// Logical time of the update.
    pub timestamp: Timestamp,
    /// Update payload.
    pub payload: Vec<u8>,
    /// Chunk address the update was read from.
    pub address: Address,
    /// Store reads the search issued.
    pub probes: usize,
}
