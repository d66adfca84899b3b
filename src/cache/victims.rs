//! Eviction Pool Module
//!
//! Tracks live keys so an eviction victim can be drawn uniformly at random.

use std::collections::HashMap;

use rand::Rng;

// == Eviction Pool ==
/// Dense key list with a slot index for O(1) insert, remove and random pick.
#[derive(Debug, Default)]
pub struct EvictionPool {
    /// Live keys in arbitrary order
    keys: Vec<String>,
    /// Position of each key in `keys`
    slots: HashMap<String, usize>,
}

impl EvictionPool {
    // == Constructor ==
    /// Creates a new empty pool.
    pub fn new() -> Self {
        Self::default()
    }

    // == Insert ==
    /// Adds a key. Adding a key twice is a no-op.
    pub fn insert(&mut self, key: &str) {
        if self.slots.contains_key(key) {
            return;
        }
        self.slots.insert(key.to_string(), self.keys.len());
        self.keys.push(key.to_string());
    }

    // == Remove ==
    /// Removes a key, returning whether it was tracked.
    pub fn remove(&mut self, key: &str) -> bool {
        let Some(slot) = self.slots.remove(key) else {
            return false;
        };
        self.keys.swap_remove(slot);
        if let Some(moved) = self.keys.get(slot) {
            self.slots.insert(moved.clone(), slot);
        }
        true
    }

    // == Pick ==
    /// Draws a key uniformly at random from every key except `exclude`.
    ///
    /// Returns None when `exclude` is the only key or the pool is empty.
    pub fn pick<R: Rng>(&self, exclude: &str, rng: &mut R) -> Option<&str> {
        let excluded = self.slots.get(exclude).copied();
        let candidates = self.keys.len() - usize::from(excluded.is_some());
        if candidates == 0 {
            return None;
        }

        let drawn = rng.gen_range(0..candidates);
        let index = match excluded {
            Some(slot) if drawn >= slot => drawn + 1,
            _ => drawn,
        };
        self.keys.get(index).map(String::as_str)
    }

    // == Length ==
    /// Returns the number of tracked keys.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    // == Is Empty ==
    /// Returns true if no keys are tracked.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_pool_new() {
        let pool = EvictionPool::new();
        assert!(pool.is_empty());
    }

    #[test]
    fn test_pool_insert_is_idempotent() {
        let mut pool = EvictionPool::new();
        pool.insert("a");
        pool.insert("a");
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn test_pool_remove_keeps_slots_consistent() {
        let mut pool = EvictionPool::new();
        pool.insert("a");
        pool.insert("b");
        pool.insert("c");

        assert!(pool.remove("a"));
        assert!(!pool.remove("a"));
        assert_eq!(pool.len(), 2);

        // "c" was moved into slot 0; removing it must still work
        assert!(pool.remove("c"));
        assert!(pool.remove("b"));
        assert!(pool.is_empty());
    }

    #[test]
    fn test_pick_empty_pool() {
        let pool = EvictionPool::new();
        assert_eq!(pool.pick("x", &mut rand::thread_rng()), None);
    }

    #[test]
    fn test_pick_only_excluded_key() {
        let mut pool = EvictionPool::new();
        pool.insert("only");
        assert_eq!(pool.pick("only", &mut rand::thread_rng()), None);
    }

    #[test]
    fn test_pick_never_returns_excluded() {
        let mut pool = EvictionPool::new();
        for key in ["a", "b", "c", "d"] {
            pool.insert(key);
        }

        let mut rng = rand::thread_rng();
        let mut seen = HashSet::new();
        for _ in 0..500 {
            let picked = pool.pick("b", &mut rng).unwrap();
            assert_ne!(picked, "b");
            seen.insert(picked.to_string());
        }
        // Every other key is reachable
        assert_eq!(seen.len(), 3);
    }
}
