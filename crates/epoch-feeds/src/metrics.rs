//! Counters for feed handler operations
//!
//! Thread-safe and lock-free; read them through [`FeedMetrics::snapshot`].

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Metrics collector for a feed handler.
#[derive(Debug, Default)]
pub struct FeedMetrics {
    /// Updates written to the store
    pub updates_accepted: AtomicU64,
    /// Byte-identical resubmissions acknowledged without a write
    pub updates_idempotent: AtomicU64,
    /// Updates rejected because their epoch was taken
    pub conflicts: AtomicU64,
    /// Lookups performed
    pub lookups_performed: AtomicU64,
    /// Lookups that found an update
    pub lookups_found: AtomicU64,
    /// Lookups that found nothing at or before their time limit
    pub lookups_not_found: AtomicU64,
    /// Store reads issued by lookups
    pub probes: AtomicU64,
    /// Malformed or forged chunks skipped during lookup
    pub chunks_rejected: AtomicU64,
}

impl FeedMetrics {
    /// Create a new metrics collector
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a stored update
    pub fn record_update(&self) {
        self.updates_accepted.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an idempotent resubmission
    pub fn record_idempotent(&self) {
        self.updates_idempotent.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a conflict
    pub fn record_conflict(&self) {
        self.conflicts.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a finished lookup
    ///
    /// # Arguments
    /// * `probes` - Store reads the search issued
    /// * `found` - Whether an update was found
    pub fn record_lookup(&self, probes: usize, found: bool) {
        self.lookups_performed.fetch_add(1, Ordering::Relaxed);
        self.probes.fetch_add(probes as u64, Ordering::Relaxed);
        if found {
            self.lookups_found.fetch_add(1, Ordering::Relaxed);
        } else {
            self.lookups_not_found.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Record a chunk that failed decoding or authentication
    pub fn record_rejected_chunk(&self) {
        self.chunks_rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// Get current metrics snapshot
    pub fn snapshot(&self) -> FeedMetricsSnapshot {
        FeedMetricsSnapshot {
            updates_accepted: self.updates_accepted.load(Ordering::Relaxed),
            updates_idempotent: self.updates_idempotent.load(Ordering::Relaxed),
            conflicts: self.conflicts.load(Ordering::Relaxed),
            lookups_performed: self.lookups_performed.load(Ordering::Relaxed),
            lookups_found: self.lookups_found.load(Ordering::Relaxed),
            lookups_not_found: self.lookups_not_found.load(Ordering::Relaxed),
            probes: self.probes.load(Ordering::Relaxed),
            chunks_rejected: self.chunks_rejected.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of [`FeedMetrics`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[allow(missing_docs)]
pub struct FeedMetricsSnapshot {
    pub updates_accepted: u64,
    pub updates_idempotent: u64,
    pub conflicts: u64,
    pub lookups_performed: u64,
    pub lookups_found: u64,
    pub lookups_not_found: u64,
    pub probes: u64,
    pub chunks_rejected: u64,
}

impl FeedMetricsSnapshot {
    /// Mean store reads per lookup
    pub fn avg_probes(&self) -> f64 {
        if self.lookups_performed == 0 {
            return 0.0;
        }
        self.probes as f64 / self.lookups_performed as f64
    }
}
