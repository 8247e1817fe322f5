//! Gateway Module
//!
//! Composes the throttle and the cache the way provider calls flow through
//! them: take a slot for the provider, then serve from cache or fetch.

use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::info;

use crate::cache::{CacheStats, CacheStore, CategoryPolicy, StatsRegistry};
use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::error::{GatewayError, Result};
use crate::throttle::{KeyedThrottle, QueueSnapshot};

// == Gateway ==
/// Service object holding the process-wide cache and throttle.
///
/// Built once at startup and handed to consumers by clone; every clone shares
/// the same state.
#[derive(Debug, Clone)]
pub struct Gateway {
    cache: Arc<CacheStore<Value>>,
    throttle: Arc<KeyedThrottle>,
}

impl Gateway {
    pub fn new(cache: CacheStore<Value>, throttle: KeyedThrottle) -> Self {
        Self {
            cache: Arc::new(cache),
            throttle: Arc::new(throttle),
        }
    }

    /// Builds the gateway from configuration on the system clock.
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::from_config_with_clock(config, Arc::new(SystemClock))
    }

    pub fn from_config_with_clock(config: &Config, clock: Arc<dyn Clock>) -> Result<Self> {
        config.validate()?;

        let policy = CategoryPolicy::with_fallback(config.default_ttl);
        let cache = CacheStore::new(config.max_entries, policy, clock.clone())?;

        let mut throttle = KeyedThrottle::new(config.throttle_policy()?, clock);
        for (identity, policy) in &config.throttle_overrides {
            throttle = throttle.with_policy(identity, *policy);
        }

        info!(
            max_entries = config.max_entries,
            overrides = config.throttle_overrides.len(),
            "Gateway initialized"
        );
        Ok(Self::new(cache, throttle))
    }

    // == Fetch ==
    /// Runs one provider call: throttled by `provider`, cached under `key`.
    ///
    /// A cache hit still passes through the provider's throttle slot.
    pub async fn fetch<F, Fut, E>(
        &self,
        provider: &str,
        key: &str,
        ttl_override: Option<Duration>,
        fetch: F,
    ) -> std::result::Result<Value, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<Value, E>>,
        E: From<GatewayError> + Display,
    {
        let cache = &self.cache;
        self.throttle
            .execute(provider, || async move {
                cache.get_or_fetch(key, fetch, ttl_override).await
            })
            .await
    }

    pub fn cache(&self) -> &Arc<CacheStore<Value>> {
        &self.cache
    }

    pub fn throttle(&self) -> &Arc<KeyedThrottle> {
        &self.throttle
    }

    pub fn stats_registry(&self) -> StatsRegistry<Value> {
        StatsRegistry::new(self.cache.clone())
    }

    pub async fn stats(&self) -> CacheStats {
        self.cache.stats().await
    }

    pub fn throttle_snapshots(&self) -> Vec<QueueSnapshot> {
        self.throttle.snapshots()
    }
}
