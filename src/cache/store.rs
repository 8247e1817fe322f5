//! Cache Store Module
//!
//! Shared response cache: entry table behind a lock, category TTLs, and
//! per-key de-duplication of concurrent misses.

use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tracing::{debug, error, info};

use crate::cache::flight::InFlight;
use crate::cache::{CacheStats, CategoryPolicy, EntryTable};
use crate::clock::{Clock, SystemClock};
use crate::error::{GatewayError, Result};

// == Cache Store ==
/// Capacity-bounded, category-aware, time-expiring cache.
///
/// The table lock is never held across the fetch future, so a slow upstream
/// only delays callers of the same key.
#[derive(Debug)]
pub struct CacheStore<V> {
    table: RwLock<EntryTable<V>>,
    policy: CategoryPolicy,
    clock: Arc<dyn Clock>,
    in_flight: InFlight,
}

impl<V> CacheStore<V>
where
    V: Clone + Send + Sync + 'static,
{
    // == Constructor ==
    /// Creates a store holding at most `capacity` entries.
    pub fn new(capacity: usize, policy: CategoryPolicy, clock: Arc<dyn Clock>) -> Result<Self> {
        let table = EntryTable::new(capacity, clock.wall_now())?;

        Ok(Self {
            table: RwLock::new(table),
            policy,
            clock,
            in_flight: InFlight::new(),
        })
    }

    /// Store with the built-in category table and the system clock.
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        Self::new(capacity, CategoryPolicy::default(), Arc::new(SystemClock))
    }

    // == Get Or Fetch ==
    /// Returns the cached value for `key`, or runs `fetch` and caches its result.
    ///
    /// On success the value is stored for `ttl_override` (when non-zero) or the
    /// category TTL of the key. Failures are returned untouched and never stored.
    pub async fn get_or_fetch<F, Fut, E>(
        &self,
        key: &str,
        fetch: F,
        ttl_override: Option<Duration>,
    ) -> std::result::Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<V, E>>,
        E: From<GatewayError> + Display,
    {
        if key.is_empty() {
            return Err(GatewayError::InvalidKey.into());
        }

        if let Some(value) = self.lookup(key).await {
            debug!(key, "Cache hit");
            return Ok(value);
        }

        // Another caller may be fetching this key already; wait for it and re-check.
        let _flight = self.in_flight.claim(key).await;
        {
            let mut table = self.table.write().await;
            if let Some(value) = table.lookup(key, self.clock.now()) {
                debug!(key, "Cache hit after concurrent fetch");
                return Ok(value);
            }
            table.record_miss();
        }

        debug!(key, "Cache miss, fetching data");
        match fetch().await {
            Ok(value) => {
                let ttl = self.resolve_ttl(key, ttl_override);
                let mut table = self.table.write().await;
                if let Some(evicted) = table.insert(key, value.clone(), self.clock.now(), ttl) {
                    debug!(key, evicted = %evicted, "Evicted least recently used entry");
                }
                Ok(value)
            }
            Err(err) => {
                error!(key, error = %err, "Error fetching data");
                Err(err)
            }
        }
    }

    // == Invalidate ==
    /// Drops entries whose key contains `pattern`, or everything when `None`.
    ///
    /// Only the full clear resets hit/miss counters. Returns the number removed.
    pub async fn invalidate(&self, pattern: Option<&str>) -> usize {
        let removed = self
            .table
            .write()
            .await
            .invalidate(pattern, self.clock.wall_now());

        match pattern.filter(|p| !p.is_empty()) {
            Some(pattern) => info!("Cleared {} cache items matching \"{}\"", removed, pattern),
            None => info!("Cleared all {} cache items", removed),
        }
        removed
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub async fn stats(&self) -> CacheStats {
        self.table.read().await.stats()
    }

    /// Current number of entries, expired-but-unswept ones included.
    pub async fn len(&self) -> usize {
        self.table.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Keys with a fetch currently running or queued.
    pub fn fetches_in_flight(&self) -> usize {
        self.in_flight.len()
    }

    pub fn policy(&self) -> &CategoryPolicy {
        &self.policy
    }

    async fn lookup(&self, key: &str) -> Option<V> {
        let mut table = self.table.write().await;
        table.lookup(key, self.clock.now())
    }

    fn resolve_ttl(&self, key: &str, ttl_override: Option<Duration>) -> Duration {
        ttl_override
            .filter(|ttl| !ttl.is_zero())
            .unwrap_or_else(|| self.policy.ttl_for(key))
    }
}
