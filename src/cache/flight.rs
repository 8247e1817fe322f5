//! In-flight fetch tracking
//!
//! One async lock per key that currently has a fetch running. Callers missing
//! the same key queue on it, so only the first one reaches the upstream while
//! the rest re-check the table once it is released.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::OwnedMutexGuard;

type KeyLock = Arc<tokio::sync::Mutex<()>>;

#[derive(Debug, Default)]
pub(crate) struct InFlight {
    locks: Mutex<HashMap<String, KeyLock>>,
}

impl InFlight {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Waits until no other fetch for `key` is running, then claims the key.
    pub(crate) async fn claim(&self, key: &str) -> FlightGuard<'_> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
            locks.entry(key.to_string()).or_default().clone()
        };
        let guard = lock.clone().lock_owned().await;

        FlightGuard {
            registry: self,
            key: key.to_string(),
            lock,
            guard: Some(guard),
        }
    }

    /// Number of keys with a running or queued fetch.
    pub(crate) fn len(&self) -> usize {
        self.locks.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

/// Exclusive claim on one key. Released on drop, including when the owning
/// future is cancelled mid-fetch.
pub(crate) struct FlightGuard<'a> {
    registry: &'a InFlight,
    key: String,
    lock: KeyLock,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        self.guard.take();

        let mut locks = self.registry.locks.lock().unwrap_or_else(|e| e.into_inner());
        // The map and this guard are the only holders: nobody is queued behind us.
        if Arc::strong_count(&self.lock) == 2 {
            locks.remove(&self.key);
        }
    }
}
