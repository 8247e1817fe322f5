//! Response DTOs for the operator API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

use crate::cache::CacheStats;
use crate::throttle::QueueSnapshot;

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Cache counters and occupancy
    pub cache: CacheStats,
    /// One entry per provider seen so far
    pub throttles: Vec<QueueSnapshot>,
}

impl StatsResponse {
    pub fn new(cache: CacheStats, throttles: Vec<QueueSnapshot>) -> Self {
        Self { cache, throttles }
    }
}

/// Response body for the clear endpoint (DELETE /cache)
#[derive(Debug, Clone, Serialize)]
pub struct ClearResponse {
    /// Success message
    pub message: String,
    /// Number of entries removed
    pub removed: usize,
    /// Pattern applied, absent for a full clear
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
}

impl ClearResponse {
    pub fn new(removed: usize, pattern: Option<&str>) -> Self {
        let message = match pattern {
            Some(p) => format!("Cleared {} cache items matching \"{}\"", removed, p),
            None => format!("Cleared all {} cache items", removed),
        };
        Self {
            message,
            removed,
            pattern: pattern.map(str::to_string),
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
