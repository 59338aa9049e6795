//! Response cache shared by the services
//!
//! Values are stored as JSON so one cache can hold every view type. A miss
//! runs the fetch and stores its result; failures are never cached.

use dashboard_core::cache::DEFAULT_CACHE_TTL;
use dashboard_core::{DashboardError, DashboardResult, TtlCache};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

pub struct ResponseCache {
    entries: TtlCache<Value>,
}

impl ResponseCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: TtlCache::new(ttl),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.entries.ttl()
    }

    /// Return the cached value for `key`, or run `fetch` and cache its result
    pub async fn get_or_fetch<T, F, Fut>(&self, key: &str, fetch: F) -> DashboardResult<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = DashboardResult<T>>,
    {
        if let Some(cached) = self.entries.get(key) {
            match serde_json::from_value(cached) {
                Ok(value) => {
                    debug!("Cache hit: {}", key);
                    return Ok(value);
                }
                Err(e) => warn!("Discarding unreadable cache entry {}: {}", key, e),
            }
        }

        let value = fetch().await?;
        let encoded = serde_json::to_value(&value)
            .map_err(|e| DashboardError::internal(format!("Failed to encode {}: {}", key, e)))?;
        self.entries.insert(key, encoded);
        Ok(value)
    }

    /// Drop expired entries, returning how many were removed
    pub fn purge_expired(&self) -> usize {
        self.entries.purge_expired()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_TTL)
    }
}
