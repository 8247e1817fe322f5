//! API Module
//!
//! Operator HTTP surface over the gateway.
//!
//! # Endpoints
//! - `GET /stats` - Cache statistics and throttle queues
//! - `DELETE /cache` - Clear the cache (optionally `?pattern=`)
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
