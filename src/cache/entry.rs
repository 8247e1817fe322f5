//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.

use std::time::Duration;

use tokio::time::Instant;

// == Cache Entry ==
/// A stored upstream response plus its expiry metadata.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// Key the entry is stored under
    pub key: String,
    /// The stored value
    pub value: V,
    /// Instant the value was stored
    pub stored_at: Instant,
    /// Instant from which the value is considered expired; `None` when the
    /// TTL reaches past what the clock can represent
    pub expires_at: Option<Instant>,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates an entry stored at `now` that lives for `ttl`.
    pub fn new(key: impl Into<String>, value: V, now: Instant, ttl: Duration) -> Self {
        Self {
            key: key.into(),
            value,
            stored_at: now,
            expires_at: now.checked_add(ttl),
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired at `now`.
    ///
    /// An entry is live only while `now < expires_at`; once the TTL has fully
    /// elapsed it is expired.
    pub fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|expires_at| now >= expires_at)
    }
}
