//! Stale Sweep Task
//!
//! Background task that drops cached thumbnails whose source image was
//! replaced or deleted since they were rendered. Lookups already treat such
//! entries as misses; the sweep returns their bytes to the cache budget.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::cache::{CacheKey, SharedCache};
use crate::error::StorageError;
use crate::storage::Directory;

/// Removes every cached entry whose source is missing or whose token no
/// longer matches the source's modification time.
///
/// Sources are stat'ed without holding the cache lock. An entry is only
/// removed if it still holds the token it had in the snapshot, so anything
/// stored or re-rendered while the sweep runs is left alone.
///
/// # Returns
/// The number of entries removed.
pub async fn sweep_stale(cache: &SharedCache, images: &dyn Directory) -> usize {
    let snapshot: HashMap<String, SystemTime> =
        cache.read().await.tokens().into_iter().collect();

    let mut current: HashMap<String, Option<SystemTime>> = HashMap::new();
    for key in snapshot.keys() {
        let Some(source) = CacheKey::source_of(key) else {
            continue;
        };
        if current.contains_key(source) {
            continue;
        }
        match images.mod_time(source).await {
            Ok(token) => {
                current.insert(source.to_string(), Some(token));
            }
            Err(StorageError::NotFound(_)) => {
                current.insert(source.to_string(), None);
            }
            Err(err) => warn!("Sweep skipped {}: {}", source, err),
        }
    }

    let mut cache = cache.write().await;
    let stale: Vec<String> = cache
        .tokens()
        .into_iter()
        .filter(|(key, token)| {
            snapshot.get(key) == Some(token)
                && CacheKey::source_of(key)
                    .and_then(|source| current.get(source))
                    .is_some_and(|latest| *latest != Some(*token))
        })
        .map(|(key, _)| key)
        .collect();

    let removed = cache.remove(&stale).into_iter().flatten().count();
    for key in &stale {
        debug!("Swept stale entry {}", key);
    }
    removed
}

/// Spawns a background task that periodically sweeps stale cache entries.
///
/// # Arguments
/// * `cache` - Shared reference to the cache
/// * `images` - Directory the cached thumbnails were rendered from
/// * `interval_secs` - Interval in seconds between sweeps
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during graceful shutdown.
pub fn spawn_sweep_task(
    cache: SharedCache,
    images: Arc<dyn Directory>,
    interval_secs: u64,
) -> JoinHandle<()> {
    let interval = Duration::from_secs(interval_secs);

    tokio::spawn(async move {
        info!(
            "Starting stale sweep task with interval of {} seconds",
            interval_secs
        );

        loop {
            tokio::time::sleep(interval).await;

            let removed = sweep_stale(&cache, images.as_ref()).await;
            if removed > 0 {
                warn!("Stale sweep: removed {} entries", removed);
            } else {
                debug!("Stale sweep: no stale entries found");
            }
        }
    })
}
