//! Request and Response models for the operator API
//!
//! DTOs serialized to and from the HTTP surface that exposes cache statistics
//! and invalidation.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::ClearQuery;
pub use responses::{ClearResponse, ErrorResponse, HealthResponse, StatsResponse};
