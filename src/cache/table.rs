//! Entry Table Module
//!
//! Synchronous core of the cache: bounded storage ordered by recency, lazy TTL
//! expiry and LRU eviction. Every method runs to completion without yielding,
//! so callers only need to hold one lock around it.

use std::time::Duration;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use tokio::time::Instant;

use crate::cache::{CacheEntry, CacheStats, StatsCounters};
use crate::error::{GatewayError, Result};

// == Entry Table ==
/// Bounded key → entry map.
///
/// Iteration order of `entries` is access recency:
/// - Front = least recently used
/// - Back = most recently used
#[derive(Debug)]
pub struct EntryTable<V> {
    entries: IndexMap<String, CacheEntry<V>>,
    counters: StatsCounters,
    capacity: usize,
}

impl<V: Clone> EntryTable<V> {
    // == Constructor ==
    /// Creates an empty table holding at most `capacity` entries.
    pub fn new(capacity: usize, now: DateTime<Utc>) -> Result<Self> {
        if capacity == 0 {
            return Err(GatewayError::InvalidConfig(
                "cache capacity must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            entries: IndexMap::with_capacity(capacity.min(4096)),
            counters: StatsCounters::new(now),
            capacity,
        })
    }

    // == Lookup ==
    /// Returns the live value for `key`, recording a hit and marking it most
    /// recently used.
    ///
    /// An expired entry is dropped on the spot and reported as absent. Misses
    /// are not counted here; see [`EntryTable::record_miss`].
    pub fn lookup(&mut self, key: &str, now: Instant) -> Option<V> {
        let expired = self.entries.get(key)?.is_expired(now);
        if expired {
            self.entries.shift_remove(key);
            return None;
        }

        self.touch(key);
        self.counters.record_hit();
        self.entries.get(key).map(|entry| entry.value.clone())
    }

    pub fn record_miss(&mut self) {
        self.counters.record_miss();
    }

    // == Insert ==
    /// Stores `value` under `key` for `ttl`, replacing any previous entry.
    ///
    /// If the key is new and the table is full, the least recently used entry
    /// is evicted first. Returns the evicted key, if any.
    pub fn insert(&mut self, key: &str, value: V, now: Instant, ttl: Duration) -> Option<String> {
        let entry = CacheEntry::new(key, value, now, ttl);
        let is_overwrite = self.entries.shift_remove(key).is_some();

        let mut evicted = None;
        if !is_overwrite && self.entries.len() >= self.capacity {
            if let Some((evicted_key, _)) = self.entries.shift_remove_index(0) {
                self.counters.record_eviction();
                evicted = Some(evicted_key);
            }
        }

        self.entries.insert(key.to_string(), entry);
        evicted
    }

    // == Invalidate ==
    /// Removes entries and returns how many were dropped.
    ///
    /// With a pattern only keys containing it are removed and counters are
    /// left alone. Without one (or with an empty one) everything goes and the
    /// counters restart from `now`.
    pub fn invalidate(&mut self, pattern: Option<&str>, now: DateTime<Utc>) -> usize {
        match pattern.filter(|p| !p.is_empty()) {
            Some(pattern) => {
                let before = self.entries.len();
                self.entries.retain(|key, _| !key.contains(pattern));
                before - self.entries.len()
            }
            None => {
                let removed = self.entries.len();
                self.entries.clear();
                self.counters.reset(now);
                removed
            }
        }
    }

    // == Stats ==
    /// Returns a snapshot of the current statistics.
    pub fn stats(&self) -> CacheStats {
        CacheStats::snapshot(&self.counters, self.entries.len(), self.capacity)
    }

    /// Keys from least to most recently used.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    // == Touch ==
    /// Moves `key` to the most recently used end.
    fn touch(&mut self, key: &str) {
        if let Some((k, entry)) = self.entries.shift_remove_entry(key) {
            self.entries.insert(k, entry);
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    const TTL: Duration = Duration::from_secs(300);

    fn table(capacity: usize) -> EntryTable<String> {
        EntryTable::new(capacity, Utc::now()).unwrap()
    }

    fn put(table: &mut EntryTable<String>, key: &str, now: Instant) -> Option<String> {
        table.insert(key, format!("value-{key}"), now, TTL)
    }

    #[test]
    fn test_table_new() {
        let table = table(100);
        assert_eq!(table.len(), 0);
        assert!(table.is_empty());
        assert_eq!(table.capacity(), 100);
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let result = EntryTable::<String>::new(0, Utc::now());
        assert!(matches!(result, Err(GatewayError::InvalidConfig(_))));
    }

    #[test]
    fn test_insert_and_lookup() {
        let mut table = table(100);
        let now = Instant::now();

        put(&mut table, "key1", now);

        assert_eq!(table.lookup("key1", now), Some("value-key1".to_string()));
        assert_eq!(table.len(), 1);
        assert_eq!(table.stats().hits, 1);
    }

    #[test]
    fn test_lookup_absent_counts_nothing() {
        let mut table = table(100);

        assert_eq!(table.lookup("missing", Instant::now()), None);

        let stats = table.stats();
        assert_eq!(stats.hits, 0);
        assert_eq!(stats.misses, 0);
    }

    #[test]
    fn test_overwrite_keeps_single_entry() {
        let mut table = table(100);
        let now = Instant::now();

        table.insert("key1", "v1".to_string(), now, TTL);
        table.insert("key1", "v2".to_string(), now, TTL);

        assert_eq!(table.lookup("key1", now), Some("v2".to_string()));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_expired_entry_removed_on_lookup() {
        let mut table = table(100);
        let now = Instant::now();

        table.insert("key1", "v".to_string(), now, Duration::from_millis(100));

        assert!(table
            .lookup("key1", now + Duration::from_millis(99))
            .is_some());
        assert!(table
            .lookup("key1", now + Duration::from_millis(100))
            .is_none());
        assert_eq!(table.len(), 0);
    }

    #[test]
    fn test_expired_entries_count_toward_capacity() {
        let mut table = table(2);
        let now = Instant::now();

        table.insert("a", "v".to_string(), now, Duration::from_millis(10));
        table.insert("b", "v".to_string(), now, Duration::from_millis(10));

        // Nobody looked at them, so they still occupy the table
        assert_eq!(table.len(), 2);

        let later = now + Duration::from_secs(1);
        let evicted = table.insert("c", "v".to_string(), later, TTL);
        assert_eq!(evicted.as_deref(), Some("a"));
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_lru_eviction() {
        let mut table = table(2);
        let now = Instant::now();

        assert_eq!(put(&mut table, "A", now), None);
        assert_eq!(put(&mut table, "B", now), None);
        assert_eq!(put(&mut table, "C", now).as_deref(), Some("A"));

        assert_eq!(table.len(), 2);
        assert!(table.lookup("A", now).is_none());
        assert!(table.lookup("B", now).is_some());
        assert!(table.lookup("C", now).is_some());
        assert_eq!(table.stats().evictions, 1);
    }

    #[test]
    fn test_lookup_refreshes_recency() {
        let mut table = table(2);
        let now = Instant::now();

        put(&mut table, "A", now);
        put(&mut table, "B", now);
        table.lookup("A", now).unwrap();

        assert_eq!(put(&mut table, "C", now).as_deref(), Some("B"));
        assert_eq!(table.keys().collect::<Vec<_>>(), vec!["A", "C"]);
    }

    #[test]
    fn test_overwrite_refreshes_recency_without_eviction() {
        let mut table = table(2);
        let now = Instant::now();

        put(&mut table, "A", now);
        put(&mut table, "B", now);
        assert_eq!(put(&mut table, "A", now), None);

        assert_eq!(table.keys().collect::<Vec<_>>(), vec!["B", "A"]);
    }

    #[test]
    fn test_pattern_invalidation_keeps_counters() {
        let mut table = table(10);
        let now = Instant::now();

        put(&mut table, "ticker:x", now);
        put(&mut table, "ticker:y", now);
        put(&mut table, "markets:z", now);
        table.lookup("ticker:x", now);
        table.record_miss();

        let removed = table.invalidate(Some("ticker:"), Utc::now());

        assert_eq!(removed, 2);
        assert_eq!(table.keys().collect::<Vec<_>>(), vec!["markets:z"]);
        let stats = table.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
    }

    #[test]
    fn test_pattern_without_match_is_noop() {
        let mut table = table(10);
        put(&mut table, "ticker:x", Instant::now());

        assert_eq!(table.invalidate(Some("ohlcv:"), Utc::now()), 0);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_full_clear_resets_counters() {
        let created = Utc::now();
        let mut table = EntryTable::new(2, created).unwrap();
        let now = Instant::now();

        table.insert("a", 1, now, TTL);
        table.insert("b", 2, now, TTL);
        table.insert("c", 3, now, TTL);
        table.lookup("b", now);
        table.record_miss();

        let cleared_at = created + chrono::Duration::seconds(42);
        assert_eq!(table.invalidate(None, cleared_at), 2);

        let stats = table.stats();
        assert_eq!(stats.hits, 0);
        assert_eq!(stats.misses, 0);
        assert_eq!(stats.evictions, 0);
        assert_eq!(stats.size, 0);
        assert_eq!(stats.last_cleared, cleared_at);
    }

    #[test]
    fn test_empty_pattern_is_full_clear() {
        let mut table = table(10);
        put(&mut table, "a", Instant::now());
        table.record_miss();

        assert_eq!(table.invalidate(Some(""), Utc::now()), 1);
        assert_eq!(table.stats().misses, 0);
    }
}
