//! Stats Registry
//!
//! Operator-facing view over a shared [`CacheStore`]: read statistics, clear.

use std::sync::Arc;

use crate::cache::{CacheStats, CacheStore};

/// Read accessor over the cache statistics. Holds no state of its own.
#[derive(Debug)]
pub struct StatsRegistry<V> {
    cache: Arc<CacheStore<V>>,
}

impl<V> Clone for StatsRegistry<V> {
    fn clone(&self) -> Self {
        Self {
            cache: Arc::clone(&self.cache),
        }
    }
}

impl<V> StatsRegistry<V>
where
    V: Clone + Send + Sync + 'static,
{
    pub fn new(cache: Arc<CacheStore<V>>) -> Self {
        Self { cache }
    }

    /// Current statistics snapshot.
    pub async fn stats(&self) -> CacheStats {
        self.cache.stats().await
    }

    /// Full clear: drops every entry and resets the counters.
    pub async fn clear(&self) -> usize {
        self.cache.invalidate(None).await
    }
}
