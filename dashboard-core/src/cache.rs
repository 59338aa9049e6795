//! Short-TTL in-memory cache for upstream query results
//!
//! Entries expire after a fixed TTL and are dropped lazily on read. There is
//! no cross-request coordination: two concurrent misses for the same key
//! will both fetch, and the later insert wins.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Default TTL for cached upstream payloads (5 minutes)
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    inserted_at: Instant,
}

impl<V> CacheEntry<V> {
    fn is_fresh(&self, ttl: Duration) -> bool {
        self.inserted_at.elapsed() < ttl
    }
}

/// String-keyed cache with a single TTL for every entry
#[derive(Debug)]
pub struct TtlCache<V> {
    entries: RwLock<HashMap<String, CacheEntry<V>>>,
    ttl: Duration,
}

impl<V: Clone> TtlCache<V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Get a fresh value, evicting it if it has expired
    pub fn get(&self, key: &str) -> Option<V> {
        {
            let entries = self.entries.read();
            match entries.get(key) {
                Some(entry) if entry.is_fresh(self.ttl) => return Some(entry.value.clone()),
                Some(_) => {}
                None => return None,
            }
        }

        self.evict_if_stale(key)
    }

    /// Remove `key` if it is still stale under the write lock. An entry
    /// re-inserted after the read check is kept and returned.
    fn evict_if_stale(&self, key: &str) -> Option<V> {
        let mut entries = self.entries.write();
        match entries.get(key) {
            Some(entry) if entry.is_fresh(self.ttl) => Some(entry.value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    pub fn insert(&self, key: impl Into<String>, value: V) {
        self.entries.write().insert(
            key.into(),
            CacheEntry {
                value,
                inserted_at: Instant::now(),
            },
        );
    }

    /// Drop every expired entry, returning how many were removed
    pub fn purge_expired(&self) -> usize {
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|_, entry| entry.is_fresh(self.ttl));
        before - entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl<V: Clone> Default for TtlCache<V> {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_TTL)
    }
}
