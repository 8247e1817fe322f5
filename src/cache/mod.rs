//! Cache Module
//!
//! Response cache with category TTLs, lazy expiry and LRU eviction.

mod category;
mod entry;
mod flight;
mod registry;
mod stats;
mod store;
mod table;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use category::{CategoryPolicy, DEFAULT_CATEGORIES, FALLBACK_TTL};
pub use entry::CacheEntry;
pub use registry::StatsRegistry;
pub use stats::{hit_ratio, CacheStats, StatsCounters};
pub use store::CacheStore;
pub use table::EntryTable;

// == Key Helpers ==
/// Builds a cache key in the `category:part:part` convention.
///
/// ```
/// use market_gateway::cache::cache_key;
/// assert_eq!(cache_key("ticker", &["binance", "BTC/USDT"]), "ticker:binance:BTC/USDT");
/// ```
pub fn cache_key(category: &str, parts: &[&str]) -> String {
    let mut key = String::from(category);
    for part in parts {
        key.push(':');
        key.push_str(part);
    }
    key
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_key_matches_category_prefix() {
        let key = cache_key("orderbook", &["kraken", "ETH/USD", "20"]);
        assert_eq!(key, "orderbook:kraken:ETH/USD:20");
        assert_eq!(
            CategoryPolicy::default().ttl_for(&key),
            std::time::Duration::from_secs(5)
        );
    }

    #[test]
    fn test_cache_key_without_parts() {
        assert_eq!(cache_key("markets", &[]), "markets");
    }
}
