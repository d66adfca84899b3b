//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with a staleness token.

use std::time::SystemTime;

use bytes::Bytes;

// == Cache Entry ==
/// Represents a single rendered output and the source version it came from.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The rendered bytes
    pub value: Bytes,
    /// Source modification time at render time
    pub token: SystemTime,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new cache entry.
    pub fn new(value: Bytes, token: SystemTime) -> Self {
        Self { value, token }
    }

    // == Size ==
    /// Number of bytes this entry counts against capacity.
    pub fn size(&self) -> u64 {
        self.value.len() as u64
    }

    // == Is Fresh ==
    /// Checks the stored token against the caller's.
    ///
    /// Only exact equality counts. A newer token means the source changed;
    /// an older one means the caller raced a rewrite. Both are misses.
    pub fn is_fresh(&self, token: SystemTime) -> bool {
        self.token == token
    }
}
