//! Error types for the gateway core
//!
//! Upstream failures raised by fetch or work closures are never wrapped here;
//! they travel back to the caller in the caller's own error type.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Gateway Error Enum ==
/// Errors produced by the gateway core itself.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// Cache key was empty
    #[error("Invalid cache key: key cannot be empty")]
    InvalidKey,

    /// Throttle identity was empty
    #[error("Invalid throttle identity: identity cannot be empty")]
    InvalidIdentity,

    /// Throttle policy rejected at construction time
    #[error("Invalid throttle policy: {0}")]
    InvalidPolicy(String),

    /// Configuration rejected at startup
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = match &self {
            GatewayError::InvalidKey | GatewayError::InvalidIdentity => StatusCode::BAD_REQUEST,
            GatewayError::InvalidPolicy(_) | GatewayError::InvalidConfig(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            GatewayError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, Json(ErrorResponse::new(self.to_string()))).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the gateway core.
pub type Result<T> = std::result::Result<T, GatewayError>;
