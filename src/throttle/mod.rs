//! Throttle Module
//!
//! Per-provider request throttling: FIFO admission, bounded concurrency and a
//! minimum interval between dispatches, scoped to one identity each.

mod keyed;
mod policy;
mod queue;

pub use keyed::KeyedThrottle;
pub use policy::{ThrottlePolicy, DEFAULT_MAX_CONCURRENT, DEFAULT_MIN_INTERVAL};
pub use queue::{QueueSnapshot, ThrottleQueue};
