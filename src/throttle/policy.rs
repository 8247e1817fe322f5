//! Throttle Policy
//!
//! Per-identity concurrency ceiling and minimum spacing between dispatches.

use std::str::FromStr;
use std::time::Duration;

use crate::error::{GatewayError, Result};

/// Default concurrency ceiling per provider.
pub const DEFAULT_MAX_CONCURRENT: usize = 1;

/// Default spacing between two dispatches to the same provider.
pub const DEFAULT_MIN_INTERVAL: Duration = Duration::from_millis(100);

// == Throttle Policy ==
/// Scheduling limits applied to one identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThrottlePolicy {
    /// Work units allowed to run at once
    max_concurrent: usize,
    /// Minimum time between two consecutive dispatches
    min_interval: Duration,
}

impl ThrottlePolicy {
    /// Validated constructor; `max_concurrent` must be at least 1.
    pub fn new(max_concurrent: usize, min_interval: Duration) -> Result<Self> {
        if max_concurrent == 0 {
            return Err(GatewayError::InvalidPolicy(
                "max_concurrent must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            max_concurrent,
            min_interval,
        })
    }

    /// One at a time, no spacing.
    pub fn serial() -> Self {
        Self {
            max_concurrent: 1,
            min_interval: Duration::ZERO,
        }
    }

    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }
}

impl Default for ThrottlePolicy {
    fn default() -> Self {
        Self {
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            min_interval: DEFAULT_MIN_INTERVAL,
        }
    }
}

/// Parses `"<max_concurrent>:<min_interval_ms>"`, e.g. `"2:50"`.
impl FromStr for ThrottlePolicy {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self> {
        let (max, interval) = s.trim().split_once(':').ok_or_else(|| {
            GatewayError::InvalidPolicy(format!(
                "expected <max_concurrent>:<min_interval_ms>, got '{}'",
                s
            ))
        })?;

        let max_concurrent = max.trim().parse::<usize>().map_err(|e| {
            GatewayError::InvalidPolicy(format!("bad max_concurrent '{}': {}", max, e))
        })?;
        let interval_ms = interval.trim().parse::<u64>().map_err(|e| {
            GatewayError::InvalidPolicy(format!("bad min_interval_ms '{}': {}", interval, e))
        })?;

        Self::new(max_concurrent, Duration::from_millis(interval_ms))
    }
}
