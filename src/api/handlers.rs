//! API Handlers
//!
//! HTTP request handlers for the operator endpoints.

use axum::{
    extract::{Query, State},
    Json,
};

use crate::gateway::Gateway;
use crate::models::{ClearQuery, ClearResponse, HealthResponse, StatsResponse};

/// Application state shared across all handlers.
///
/// Wraps the gateway; clones share the same cache and throttle.
#[derive(Clone)]
pub struct AppState {
    pub gateway: Gateway,
}

impl AppState {
    pub fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }

    /// Creates a new AppState from configuration.
    pub fn from_config(config: &crate::config::Config) -> crate::error::Result<Self> {
        Ok(Self::new(Gateway::from_config(config)?))
    }
}

/// Handler for GET /stats
///
/// Returns cache statistics and per-provider throttle state.
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let cache = state.gateway.stats_registry().stats().await;
    let throttles = state.gateway.throttle_snapshots();

    Json(StatsResponse::new(cache, throttles))
}

/// Handler for DELETE /cache
///
/// Clears the whole cache, or only keys containing `?pattern=`.
pub async fn clear_handler(
    State(state): State<AppState>,
    Query(query): Query<ClearQuery>,
) -> Json<ClearResponse> {
    let pattern = query.pattern();
    let removed = match pattern {
        Some(p) => state.gateway.cache().invalidate(Some(p)).await,
        None => state.gateway.stats_registry().clear().await,
    };

    Json(ClearResponse::new(removed, pattern))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
