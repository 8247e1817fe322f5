//! Category Policy Module
//!
//! Maps cache keys to a default TTL through their prefix (`ticker:`, `orderbook:`, ...).

use std::time::Duration;

/// Fallback TTL for keys outside the known taxonomy.
pub const FALLBACK_TTL: Duration = Duration::from_secs(30);

/// Built-in prefix table for exchange market data.
pub const DEFAULT_CATEGORIES: &[(&str, Duration)] = &[
    ("ticker:", Duration::from_secs(10)),
    ("orderbook:", Duration::from_secs(5)),
    ("markets:", Duration::from_secs(60 * 60)),
    ("ohlcv:", Duration::from_secs(60)),
    ("trades:", Duration::from_secs(30)),
    ("status:", Duration::from_secs(5 * 60)),
];

// == Category Policy ==
/// Static prefix → TTL table with a single fallback.
///
/// Immutable once built; `ttl_for` is a pure function of the key and the table.
#[derive(Debug, Clone)]
pub struct CategoryPolicy {
    table: Vec<(String, Duration)>,
    fallback: Duration,
}

impl CategoryPolicy {
    /// Builds a policy from an explicit table.
    pub fn new<I, S>(table: I, fallback: Duration) -> Self
    where
        I: IntoIterator<Item = (S, Duration)>,
        S: Into<String>,
    {
        Self {
            table: table.into_iter().map(|(p, ttl)| (p.into(), ttl)).collect(),
            fallback,
        }
    }

    /// The built-in market data taxonomy with a custom fallback TTL.
    pub fn with_fallback(fallback: Duration) -> Self {
        Self::new(DEFAULT_CATEGORIES.iter().copied(), fallback)
    }

    // == TTL For ==
    /// Resolves the default TTL for `key`.
    ///
    /// The longest matching prefix wins; ties keep table order.
    pub fn ttl_for(&self, key: &str) -> Duration {
        self.table
            .iter()
            .filter(|(prefix, _)| key.starts_with(prefix.as_str()))
            .fold(None::<&(String, Duration)>, |best, candidate| match best {
                Some(b) if b.0.len() >= candidate.0.len() => Some(b),
                _ => Some(candidate),
            })
            .map(|(_, ttl)| *ttl)
            .unwrap_or(self.fallback)
    }

    pub fn fallback(&self) -> Duration {
        self.fallback
    }
}

impl Default for CategoryPolicy {
    fn default() -> Self {
        Self::with_fallback(FALLBACK_TTL)
    }
}
