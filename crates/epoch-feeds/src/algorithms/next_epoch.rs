//! # Epoch Transition
//!
//! Chooses the epoch a new update must occupy given the epoch of the previous
//! one. Updates that follow closely land on finer epochs nested under the
//! previous update; updates after a long pause restart at a coarse epoch. The
//! number of distinct epochs a reader has to probe therefore grows with the
//! logarithm of the time range, not with the number of updates.

use crate::domain::{Epoch, Timestamp, HIGHEST_LEVEL, LOWEST_LEVEL};

/// Epoch of the very first update of a feed.
pub fn first_epoch(now: Timestamp) -> Epoch {
    Epoch::containing(now, HIGHEST_LEVEL)
}

/// Level for an update at `now` that follows an update at `last`.
///
/// The highest bit where `last.base` and `now` differ marks the smallest
/// interval containing both; the new update goes one level below the last one
/// when they share that interval, and at that bit's level otherwise.
pub fn next_level(last: Epoch, now: Timestamp) -> u8 {
    let mut mix = last.base() ^ now;
    if last.level() > LOWEST_LEVEL {
        // never refine by more than one level at a time
        mix |= 1u64 << (last.level() - 1);
    }

    if mix == 0 {
        return LOWEST_LEVEL;
    }
    (63 - mix.leading_zeros()) as u8
}

/// Epoch for an update at `now`, given the previous update's epoch if any.
pub fn next_epoch(previous: Option<Epoch>, now: Timestamp) -> Epoch {
    match previous {
        None => first_epoch(now),
        Some(last) => Epoch::containing(now, next_level(last, now)),
    }
}
