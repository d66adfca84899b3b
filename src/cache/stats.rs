//! Cache Statistics Module
//!
//! Tracks cache usage: item count, stored bytes, gets, puts, hits and prunes.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

// == Cache Stats ==
/// Point-in-time snapshot of cache usage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Number of live entries
    pub items: usize,
    /// Total bytes held by live entries
    pub size: u64,
    /// Number of lookups
    pub gets: u64,
    /// Number of admitted stores
    pub puts: u64,
    /// Number of lookups that returned a value
    pub hits: u64,
    /// Number of entries evicted to make room
    pub prunes: u64,
}

impl CacheStats {
    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / gets, or 0.0 if no lookups have been made.
    pub fn hit_rate(&self) -> f64 {
        if self.gets == 0 {
            0.0
        } else {
            self.hits as f64 / self.gets as f64
        }
    }
}

// == Counters ==
/// Lifetime counters owned by the store.
///
/// `gets` and `hits` change under the shared read guard, so they are atomic.
/// `puts` and `prunes` only change under the exclusive write guard.
#[derive(Debug, Default)]
pub(crate) struct Counters {
    gets: AtomicU64,
    hits: AtomicU64,
    puts: u64,
    prunes: u64,
}

impl Counters {
    pub fn record_get(&self) {
        self.gets.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_put(&mut self) {
        self.puts += 1;
    }

    pub fn record_prune(&mut self) {
        self.prunes += 1;
    }

    /// Combines the counters with the store's live totals.
    pub fn snapshot(&self, items: usize, size: u64) -> CacheStats {
        CacheStats {
            items,
            size,
            gets: self.gets.load(Ordering::Relaxed),
            puts: self.puts,
            hits: self.hits.load(Ordering::Relaxed),
            prunes: self.prunes,
        }
    }
}
