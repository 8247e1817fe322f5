//! Throttle Queue
//!
//! Dispatch gate for a single identity. Waiters line up on a fair async mutex
//! (FIFO), the head of the line takes a concurrency slot, waits out the
//! minimum spacing, stamps the dispatch time and lets the next waiter in.

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use serde::Serialize;
use tokio::sync::Semaphore;
use tokio::time::Instant;
use tracing::{debug, trace};

use crate::clock::Clock;
use crate::error::GatewayError;
use crate::throttle::ThrottlePolicy;

// == Queue Snapshot ==
/// Point-in-time view of one identity's queue.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueSnapshot {
    pub identity: String,
    pub pending: usize,
    pub in_flight: usize,
    pub max_concurrent: usize,
    pub min_interval_ms: u128,
}

// == Throttle Queue ==
#[derive(Debug)]
pub struct ThrottleQueue {
    identity: String,
    policy: ThrottlePolicy,
    /// FIFO admission; only the head of the line proceeds to dispatch
    gate: tokio::sync::Mutex<()>,
    slots: Semaphore,
    last_dispatch: Mutex<Option<Instant>>,
    pending: AtomicUsize,
    running: AtomicUsize,
    clock: Arc<dyn Clock>,
}

impl ThrottleQueue {
    pub fn new(identity: impl Into<String>, policy: ThrottlePolicy, clock: Arc<dyn Clock>) -> Self {
        Self {
            identity: identity.into(),
            policy,
            gate: tokio::sync::Mutex::new(()),
            slots: Semaphore::new(policy.max_concurrent()),
            last_dispatch: Mutex::new(None),
            pending: AtomicUsize::new(0),
            running: AtomicUsize::new(0),
            clock,
        }
    }

    // == Run ==
    /// Waits for this queue's turn, then runs `work` and returns its outcome as is.
    ///
    /// The slot is released when `work` finishes, whether it failed or not.
    pub async fn run<F, Fut, T, E>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: From<GatewayError>,
    {
        let waiting = CountGuard::enter(&self.pending);

        let _slot = {
            let _turn = self.gate.lock().await;
            let slot = self.slots.acquire().await.map_err(|e| {
                GatewayError::Internal(format!(
                    "throttle queue '{}' closed: {}",
                    self.identity, e
                ))
            })?;
            self.wait_for_spacing().await;
            slot
        };
        drop(waiting);

        trace!(identity = %self.identity, "Dispatching work");
        let _running = CountGuard::enter(&self.running);
        let outcome = work().await;
        trace!(identity = %self.identity, "Releasing slot");
        outcome
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    pub fn policy(&self) -> ThrottlePolicy {
        self.policy
    }

    /// Work units currently executing.
    pub fn in_flight(&self) -> usize {
        self.running.load(Ordering::SeqCst)
    }

    /// Work units waiting for their turn, spacing delay included.
    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }

    pub fn last_dispatch(&self) -> Option<Instant> {
        *self.last_dispatch.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn snapshot(&self) -> QueueSnapshot {
        QueueSnapshot {
            identity: self.identity.clone(),
            pending: self.pending(),
            in_flight: self.in_flight(),
            max_concurrent: self.policy.max_concurrent(),
            min_interval_ms: self.policy.min_interval().as_millis(),
        }
    }

    /// Sleeps until `min_interval` has passed since the previous dispatch, then
    /// records the new one. Called only by the holder of the gate.
    async fn wait_for_spacing(&self) {
        let min_interval = self.policy.min_interval();
        if let Some(last) = self.last_dispatch() {
            let ready_at = last + min_interval;
            let now = self.clock.now();
            if ready_at > now {
                let delay = ready_at - now;
                debug!(
                    identity = %self.identity,
                    delay_ms = delay.as_millis() as u64,
                    "Delaying dispatch to respect minimum interval"
                );
                self.clock.sleep(delay).await;
            }
        }

        let mut last = self.last_dispatch.lock().unwrap_or_else(|e| e.into_inner());
        *last = Some(self.clock.now());
    }
}

/// Holds one unit of a counter until dropped, cancellation included.
struct CountGuard<'a>(&'a AtomicUsize);

impl<'a> CountGuard<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for CountGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}
