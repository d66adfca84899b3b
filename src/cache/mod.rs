//! Cache Module
//!
//! Provides an in-memory byte cache for rendered thumbnails, bounded by total
//! stored bytes, validated by source modification time, with random eviction.

mod entry;
mod key;
mod stats;
mod store;
mod victims;


use std::sync::Arc;

use tokio::sync::RwLock;

// Re-export public types
pub use entry::CacheEntry;
pub use key::{CacheKey, KEY_SEPARATOR};
pub use stats::CacheStats;
pub use store::CacheStore;
pub use victims::EvictionPool;

/// Cache store shared between handlers and background tasks.
pub type SharedCache = Arc<RwLock<CacheStore>>;

// == Public Constants ==
/// Default cache capacity in bytes (32 GiB)
pub const DEFAULT_CACHE_CAPACITY: u64 = 32 * 1024 * 1024 * 1024;
