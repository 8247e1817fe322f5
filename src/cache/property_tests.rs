//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check the table and store invariants against random
//! operation sequences.

use proptest::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::time::Instant;

use crate::cache::{CacheStore, CategoryPolicy, EntryTable};
use crate::clock::ManualClock;

// == Test Configuration ==
const TEST_CAPACITY: usize = 8;
const TEST_TTL: Duration = Duration::from_millis(500);

// == Strategies ==
/// Keys drawn from a small space so hits, overwrites and evictions all happen.
fn key_strategy() -> impl Strategy<Value = String> {
    (
        prop::sample::select(vec!["ticker:", "orderbook:", "markets:", "misc:"]),
        0u8..6,
    )
        .prop_map(|(prefix, n)| format!("{prefix}{n}"))
}

#[derive(Debug, Clone)]
enum CacheOp {
    Fetch { key: String },
    Advance { ms: u64 },
    InvalidatePattern { pattern: String },
    Clear,
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        6 => key_strategy().prop_map(|key| CacheOp::Fetch { key }),
        2 => (0u64..400).prop_map(|ms| CacheOp::Advance { ms }),
        1 => prop::sample::select(vec!["ticker:", "orderbook:", "1"])
            .prop_map(|p| CacheOp::InvalidatePattern { pattern: p.to_string() }),
        1 => Just(CacheOp::Clear),
    ]
}

/// Reference model: keys ordered least → most recently used, with expiry.
#[derive(Default)]
struct Model {
    entries: Vec<(String, Instant)>,
}

impl Model {
    /// Returns true on a hit.
    fn fetch(&mut self, key: &str, now: Instant, capacity: usize) -> bool {
        if let Some(pos) = self.entries.iter().position(|(k, _)| k == key) {
            let (k, expires) = self.entries.remove(pos);
            if now < expires {
                self.entries.push((k, expires));
                return true;
            }
        }
        if self.entries.len() >= capacity {
            self.entries.remove(0);
        }
        self.entries.push((key.to_string(), now + TEST_TTL));
        false
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // The table never holds more than its capacity, and agrees with a naive
    // LRU model on every hit/miss decision and on the final recency order.
    #[test]
    fn prop_table_matches_lru_model(ops in prop::collection::vec(cache_op_strategy(), 1..80)) {
        let mut table = EntryTable::new(TEST_CAPACITY, Utc::now()).unwrap();
        let mut model = Model::default();
        let mut now = Instant::now();
        let mut expected_hits = 0u64;
        let mut expected_misses = 0u64;

        for op in ops {
            match op {
                CacheOp::Fetch { key } => {
                    let hit = table.lookup(&key, now).is_some();
                    if !hit {
                        table.record_miss();
                        table.insert(&key, key.clone(), now, TEST_TTL);
                    }
                    let model_hit = model.fetch(&key, now, TEST_CAPACITY);
                    prop_assert_eq!(hit, model_hit, "Hit decision diverged for {}", key);
                    if hit { expected_hits += 1 } else { expected_misses += 1 }
                }
                CacheOp::Advance { ms } => now += Duration::from_millis(ms),
                CacheOp::InvalidatePattern { pattern } => {
                    let before = model.entries.len();
                    model.entries.retain(|(k, _)| !k.contains(&pattern));
                    let removed = table.invalidate(Some(&pattern), Utc::now());
                    prop_assert_eq!(removed, before - model.entries.len());
                }
                CacheOp::Clear => {
                    model.entries.clear();
                    table.invalidate(None, Utc::now());
                    expected_hits = 0;
                    expected_misses = 0;
                }
            }

            prop_assert!(
                table.len() <= TEST_CAPACITY,
                "Cache size {} exceeds capacity {}",
                table.len(),
                TEST_CAPACITY
            );
        }

        let stats = table.stats();
        prop_assert_eq!(stats.hits, expected_hits, "Hits mismatch");
        prop_assert_eq!(stats.misses, expected_misses, "Misses mismatch");
        prop_assert_eq!(stats.size, table.len());

        let model_keys: Vec<&str> = model.entries.iter().map(|(k, _)| k.as_str()).collect();
        prop_assert_eq!(table.keys().collect::<Vec<_>>(), model_keys);
    }

    // Through the async store, every miss corresponds to exactly one fetch call.
    #[test]
    fn prop_store_misses_equal_fetches(keys in prop::collection::vec(key_strategy(), 1..60)) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        let clock = Arc::new(ManualClock::new());
        let store = CacheStore::new(TEST_CAPACITY, CategoryPolicy::default(), clock.clone()).unwrap();
        let calls = AtomicUsize::new(0);

        runtime.block_on(async {
            for key in &keys {
                let counter = &calls;
                store
                    .get_or_fetch(
                        key,
                        move || async move {
                            counter.fetch_add(1, Ordering::SeqCst);
                            Ok::<_, anyhow::Error>(key.len())
                        },
                        None,
                    )
                    .await
                    .unwrap();
                clock.advance(Duration::from_millis(250));
            }
        });

        let stats = runtime.block_on(store.stats());
        prop_assert_eq!(stats.misses as usize, calls.load(Ordering::SeqCst));
        prop_assert_eq!(stats.hits + stats.misses, keys.len() as u64);
        prop_assert!(stats.size <= TEST_CAPACITY);
    }
}
