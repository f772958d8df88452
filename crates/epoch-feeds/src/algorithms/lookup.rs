//! # Lookup Search
//!
//! Finds the newest update at or before a time limit by walking the epoch
//! tree. The walk replays [`next_epoch`] from a known epoch (the hint, or
//! nothing): every probe that hits becomes the new starting point, so the
//! walk retraces the path a producer took when it assigned epochs. A miss means
//! the chain has no update past that point along this path, and the search
//! steps back in time to the interval just before the missed epoch.
//!
//! The search is generic over an [`EpochReader`] so it can run against the
//! store, against an in-memory map in tests, or against anything else that can
//! answer "is there an update at this epoch no later than `t`".

use async_trait::async_trait;

use crate::domain::{Epoch, FeedError, Timestamp};

use super::next_epoch::next_epoch;

/// Source of updates keyed by epoch.
#[async_trait]
pub trait EpochReader: Send + Sync {
    /// What a hit yields.
    type Value: Send;

    /// The update at `epoch`, provided its timestamp is at most `time_limit`.
    ///
    /// Absent, malformed and too-recent updates all read as `Ok(None)`; only
    /// failures that must abort the search (store outage, cancellation) are
    /// errors.
    async fn read(&self, epoch: Epoch, time_limit: Timestamp)
        -> Result<Option<Self::Value>, FeedError>;
}

/// An update the search settled on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Found<V> {
    /// Epoch holding the update.
    pub epoch: Epoch,
    /// What the reader returned for it.
    pub value: V,
}

/// Result of a search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOutcome<V> {
    /// Newest qualifying update, if any exists.
    pub found: Option<Found<V>>,
    /// Number of reads issued.
    pub probes: usize,
}

/// Search for the newest update at or before `time_limit`.
///
/// A hint whose base lies after the time limit is ignored. Any other hint,
/// stale or even wrong, only affects the number of probes, never the result.
pub async fn search<R: EpochReader>(
    reader: &R,
    time_limit: Timestamp,
    hint: Option<Epoch>,
) -> Result<SearchOutcome<R::Value>, FeedError> {
    let mut hint = hint.filter(|h| h.base() <= time_limit);
    let mut cursor = time_limit;
    let mut best: Option<Found<R::Value>> = None;
    let mut probes = 0usize;

    loop {
        let epoch = next_epoch(hint, cursor);
        probes += 1;
        tracing::trace!(%epoch, cursor, "probe");

        if let Some(value) = reader.read(epoch, time_limit).await? {
            let done = epoch.level() == 0 || Some(epoch) == hint;
            best = Some(Found { epoch, value });
            if done {
                return Ok(SearchOutcome { found: best, probes });
            }
            hint = Some(epoch);
            continue;
        }

        match hint {
            Some(last) if epoch.base() == last.base() => {
                // the miss nested under `last`: nothing follows it on this path
                if best.is_some() {
                    return Ok(SearchOutcome { found: best, probes });
                }
                probes += 1;
                if let Some(value) = reader.read(last, time_limit).await? {
                    return Ok(SearchOutcome {
                        found: Some(Found { epoch: last, value }),
                        probes,
                    });
                }
                // the hint itself is empty or too recent; start over before it
                cursor = last.base();
                hint = None;
            }
            _ => {
                if epoch.base() == 0 {
                    return Ok(SearchOutcome { found: best, probes });
                }
                cursor = epoch.base() - 1;
            }
        }
    }
}
