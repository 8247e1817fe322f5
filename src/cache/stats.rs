//! Cache Statistics Module
//!
//! Tracks cache performance metrics including hits, misses, and evictions.

use chrono::{DateTime, Utc};
use serde::Serialize;

// == Stats Counters ==
/// Mutable counters owned by the entry table.
#[derive(Debug, Clone)]
pub struct StatsCounters {
    /// Lookups answered from a live entry
    pub hits: u64,
    /// Lookups that had to invoke the fetch function
    pub misses: u64,
    /// Entries removed by LRU pressure
    pub evictions: u64,
    /// Last time the cache was fully cleared
    pub last_cleared: DateTime<Utc>,
}

impl StatsCounters {
    // == Constructor ==
    /// Creates counters at zero, stamped with `now` as the last clear.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            hits: 0,
            misses: 0,
            evictions: 0,
            last_cleared: now,
        }
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    // == Reset ==
    /// Zeroes every counter and records `now` as the clear time.
    pub fn reset(&mut self, now: DateTime<Utc>) {
        *self = Self::new(now);
    }
}

// == Cache Stats ==
/// Read-only snapshot handed to operators.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub hit_ratio: f64,
    pub evictions: u64,
    /// Entries currently held, expired-but-unswept ones included
    pub size: usize,
    pub capacity: usize,
    pub last_cleared: DateTime<Utc>,
}

impl CacheStats {
    /// Builds a snapshot from the live counters.
    pub fn snapshot(counters: &StatsCounters, size: usize, capacity: usize) -> Self {
        Self {
            hits: counters.hits,
            misses: counters.misses,
            hit_ratio: hit_ratio(counters.hits, counters.misses),
            evictions: counters.evictions,
            size,
            capacity,
            last_cleared: counters.last_cleared,
        }
    }
}

// == Hit Ratio ==
/// hits / (hits + misses), or 0.0 if no lookups have been made.
pub fn hit_ratio(hits: u64, misses: u64) -> f64 {
    let total = hits + misses;
    if total == 0 {
        0.0
    } else {
        hits as f64 / total as f64
    }
}
