//! Keyed Throttle
//!
//! Routes work units to a per-identity [`ThrottleQueue`], created on first use.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};

use tracing::info;

use crate::clock::{Clock, SystemClock};
use crate::error::GatewayError;
use crate::throttle::{QueueSnapshot, ThrottlePolicy, ThrottleQueue};

// == Keyed Throttle ==
/// Per-identity execution gate.
///
/// Identities are case-insensitive: `"Binance"` and `"binance"` share a queue.
/// Queues live as long as the throttle itself.
#[derive(Debug)]
pub struct KeyedThrottle {
    queues: Mutex<HashMap<String, Arc<ThrottleQueue>>>,
    default_policy: ThrottlePolicy,
    overrides: HashMap<String, ThrottlePolicy>,
    clock: Arc<dyn Clock>,
}

impl KeyedThrottle {
    pub fn new(default_policy: ThrottlePolicy, clock: Arc<dyn Clock>) -> Self {
        Self {
            queues: Mutex::new(HashMap::new()),
            default_policy,
            overrides: HashMap::new(),
            clock,
        }
    }

    /// Throttle on the system clock.
    pub fn with_default_policy(default_policy: ThrottlePolicy) -> Self {
        Self::new(default_policy, Arc::new(SystemClock))
    }

    /// Sets the policy for one identity. Applies to queues created afterwards.
    pub fn with_policy(mut self, identity: &str, policy: ThrottlePolicy) -> Self {
        self.overrides.insert(normalize(identity), policy);
        self
    }

    // == Execute ==
    /// Runs `work` under the policy of `identity` and returns exactly what it returns.
    ///
    /// Work for the same identity is admitted in arrival order; different
    /// identities never wait on each other.
    pub async fn execute<F, Fut, T, E>(&self, identity: &str, work: F) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: From<GatewayError>,
    {
        let queue = self.queue(identity)?;
        queue.run(work).await
    }

    /// Policy that applies (or will apply) to `identity`.
    pub fn policy_for(&self, identity: &str) -> ThrottlePolicy {
        let identity = normalize(identity);
        self.overrides
            .get(&identity)
            .copied()
            .unwrap_or(self.default_policy)
    }

    /// Identities that have been used so far, sorted.
    pub fn identities(&self) -> Vec<String> {
        let mut identities: Vec<String> = self.lock_queues().keys().cloned().collect();
        identities.sort();
        identities
    }

    /// Work units currently executing for `identity` (0 if never used).
    pub fn in_flight(&self, identity: &str) -> usize {
        self.lock_queues()
            .get(&normalize(identity))
            .map(|queue| queue.in_flight())
            .unwrap_or(0)
    }

    pub fn snapshots(&self) -> Vec<QueueSnapshot> {
        let mut snapshots: Vec<QueueSnapshot> =
            self.lock_queues().values().map(|q| q.snapshot()).collect();
        snapshots.sort_by(|a, b| a.identity.cmp(&b.identity));
        snapshots
    }

    fn queue(&self, identity: &str) -> Result<Arc<ThrottleQueue>, GatewayError> {
        if identity.trim().is_empty() {
            return Err(GatewayError::InvalidIdentity);
        }
        let identity = normalize(identity);

        let mut queues = self.lock_queues();
        let queue = queues.entry(identity.clone()).or_insert_with(|| {
            let policy = self.policy_for(&identity);
            info!(
                identity = %identity,
                max_concurrent = policy.max_concurrent(),
                min_interval_ms = policy.min_interval().as_millis() as u64,
                "Creating throttle queue"
            );
            Arc::new(ThrottleQueue::new(identity.clone(), policy, self.clock.clone()))
        });
        Ok(Arc::clone(queue))
    }

    fn lock_queues(&self) -> std::sync::MutexGuard<'_, HashMap<String, Arc<ThrottleQueue>>> {
        self.queues.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for KeyedThrottle {
    fn default() -> Self {
        Self::with_default_policy(ThrottlePolicy::default())
    }
}

fn normalize(identity: &str) -> String {
    identity.trim().to_lowercase()
}
