//! Advisory per-feed cache of the last known update.
//!
//! Entries only seed lookups and answer `get_content`. A missing or stale
//! entry makes a lookup slower, never wrong.

use std::num::NonZeroUsize;

use lru::LruCache;
use parking_lot::Mutex;

use crate::domain::{Address, Epoch, Feed, LookupResult, Timestamp};

/// Last update the handler saw for a feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedUpdate {
    /// Epoch holding the update.
    pub epoch: Epoch,
    /// Logical time of the update.
    pub timestamp: Timestamp,
    /// Update payload.
    pub payload: Vec<u8>,
    /// Chunk address.
    pub address: Address,
}

impl From<&LookupResult> for CachedUpdate {
    fn from(result: &LookupResult) -> Self {
        Self {
            epoch: result.epoch,
            timestamp: result.timestamp,
            payload: result.payload.clone(),
            address: result.address,
        }
    }
}

/// LRU side table keyed by feed; absent when capacity is zero.
pub(crate) struct EpochCache {
    entries: Option<Mutex<LruCache<Feed, CachedUpdate>>>,
}

impl EpochCache {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            entries: NonZeroUsize::new(capacity).map(|cap| Mutex::new(LruCache::new(cap))),
        }
    }

    pub(crate) fn get(&self, feed: &Feed) -> Option<CachedUpdate> {
        self.entries.as_ref()?.lock().get(feed).cloned()
    }

    pub(crate) fn hint(&self, feed: &Feed) -> Option<Epoch> {
        self.entries.as_ref()?.lock().get(feed).map(|e| e.epoch)
    }

    /// Store the result of a lookup, replacing whatever was there.
    ///
    /// Historical lookups move the entry backwards on purpose: `get_content`
    /// reports the last lookup, not the newest update.
    pub(crate) fn record(&self, feed: Feed, update: CachedUpdate) {
        if let Some(entries) = &self.entries {
            entries.lock().put(feed, update);
        }
    }

    /// Refresh an entry created by a lookup with a freshly published update,
    /// if the update is newer. Feeds never looked up stay absent.
    pub(crate) fn advance(&self, feed: Feed, update: CachedUpdate) {
        let Some(entries) = &self.entries else {
            return;
        };
        if let Some(current) = entries.lock().peek_mut(&feed) {
            if update.epoch.is_after(&current.epoch) {
                *current = update;
            }
        }
    }
}
