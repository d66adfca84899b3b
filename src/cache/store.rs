//! Cache Store Module
//!
//! Capacity-bounded byte cache with exact-match staleness tokens and random
//! eviction.
//!
//! The store itself is not internally locked. It is shared as
//! `Arc<RwLock<CacheStore>>`: `put` and `remove` take `&mut self` and so run
//! under the write guard, while `get`, `find_keys` and `stats` take `&self`
//! and run under the read guard.

use std::collections::{BTreeSet, HashMap};
use std::time::SystemTime;

use bytes::Bytes;
use tracing::debug;

use crate::cache::stats::Counters;
use crate::cache::{CacheEntry, CacheStats, EvictionPool};
use crate::error::CacheError;

// == Cache Store ==
/// Byte cache bounded by total stored bytes.
#[derive(Debug)]
pub struct CacheStore {
    /// Key-value storage
    entries: HashMap<String, CacheEntry>,
    /// Keys eligible for random eviction
    pool: EvictionPool,
    /// Lifetime counters
    counters: Counters,
    /// Bytes held by live entries
    size: u64,
    /// Maximum bytes the store may hold
    capacity: u64,
}

impl CacheStore {
    // == Constructor ==
    /// Creates a new CacheStore holding at most `capacity` bytes.
    pub fn new(capacity: u64) -> Self {
        Self {
            entries: HashMap::new(),
            pool: EvictionPool::new(),
            counters: Counters::default(),
            size: 0,
            capacity,
        }
    }

    // == Put ==
    /// Stores `value` under `key`, tagged with the source's staleness token.
    ///
    /// A value larger than the whole capacity is never stored and `Ok(None)`
    /// is returned. Otherwise random entries other than `key` are evicted
    /// until the value fits, and the value previously stored under `key` (if
    /// any) is returned.
    ///
    /// # Errors
    /// `CacheError::CannotAdmit` if eviction runs out of candidates first.
    pub fn put(
        &mut self,
        key: impl Into<String>,
        value: Bytes,
        token: SystemTime,
    ) -> Result<Option<Bytes>, CacheError> {
        let key = key.into();
        let incoming = value.len() as u64;

        if incoming > self.capacity {
            debug!(
                "Declining to cache {} ({} bytes exceeds capacity {})",
                key, incoming, self.capacity
            );
            return Ok(None);
        }

        self.make_room(&key, incoming)?;

        let previous = self.entries.insert(key.clone(), CacheEntry::new(value, token));
        match &previous {
            Some(old) => self.size -= old.size(),
            None => self.pool.insert(&key),
        }
        self.size += incoming;
        self.counters.record_put();

        Ok(previous.map(|entry| entry.value))
    }

    // == Make Room ==
    /// Evicts random entries other than `key` until `incoming` bytes fit.
    ///
    /// Each iteration removes one entry, so the loop runs at most once per
    /// live entry before it either succeeds or reports `CannotAdmit`.
    fn make_room(&mut self, key: &str, incoming: u64) -> Result<(), CacheError> {
        let replaced = self.entries.get(key).map_or(0, CacheEntry::size);
        let mut rng = rand::thread_rng();
        let mut attempts = self.entries.len();

        while self.size - replaced + incoming > self.capacity {
            let victim = match self.pool.pick(key, &mut rng) {
                Some(victim) if attempts > 0 => victim.to_string(),
                _ => {
                    return Err(CacheError::CannotAdmit {
                        key: key.to_string(),
                        needed: self.size - replaced + incoming - self.capacity,
                    })
                }
            };
            attempts -= 1;

            if self.detach(&victim).is_some() {
                self.counters.record_prune();
                debug!("Evicted {} to admit {}", victim, key);
            }
        }

        Ok(())
    }

    // == Get ==
    /// Retrieves the value for `key` if it was stored with exactly `token`.
    ///
    /// Every call counts as a get. A present but stale entry is a miss and is
    /// left in place.
    pub fn get(&self, key: &str, token: SystemTime) -> Option<Bytes> {
        self.counters.record_get();

        let entry = self.entries.get(key).filter(|entry| entry.is_fresh(token))?;
        self.counters.record_hit();
        Some(entry.value.clone())
    }

    // == Remove ==
    /// Removes every listed key.
    ///
    /// Returns one slot per input key holding the removed value, or None
    /// where the key was absent.
    pub fn remove<I, K>(&mut self, keys: I) -> Vec<Option<Bytes>>
    where
        I: IntoIterator<Item = K>,
        K: AsRef<str>,
    {
        keys.into_iter()
            .map(|key| self.detach(key.as_ref()).map(|entry| entry.value))
            .collect()
    }

    /// Unlinks one entry and adjusts the byte total.
    fn detach(&mut self, key: &str) -> Option<CacheEntry> {
        let entry = self.entries.remove(key)?;
        self.pool.remove(key);
        self.size -= entry.size();
        Some(entry)
    }

    // == Find Keys ==
    /// Returns every live key starting with `prefix`.
    pub fn find_keys(&self, prefix: &str) -> BTreeSet<String> {
        self.entries
            .keys()
            .filter(|key| key.starts_with(prefix))
            .cloned()
            .collect()
    }

    // == Tokens ==
    /// Returns every live key with the token it was stored under.
    pub fn tokens(&self) -> Vec<(String, SystemTime)> {
        self.entries
            .iter()
            .map(|(key, entry)| (key.clone(), entry.token))
            .collect()
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        self.counters.snapshot(self.entries.len(), self.size)
    }

    // == Capacity ==
    /// Returns the configured capacity in bytes.
    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    // == Length ==
    /// Returns the current number of entries in the cache.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    // == Is Empty ==
    /// Returns true if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
