//! Market Gateway - throttled response cache for exchange data providers
//!
//! Calls into an upstream provider go through a per-provider throttle and a
//! bounded, time-expiring cache with category TTLs and LRU eviction.

pub mod api;
pub mod cache;
pub mod clock;
pub mod config;
pub mod error;
pub mod gateway;
pub mod models;
pub mod telemetry;
pub mod throttle;

pub use api::AppState;
pub use config::Config;
pub use error::GatewayError;
pub use gateway::Gateway;
