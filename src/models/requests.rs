//! Request DTOs for the operator API
//!
//! Defines the structure of incoming query parameters.

use serde::Deserialize;

/// Query string for the clear operation (DELETE /cache)
///
/// # Fields
/// - `pattern`: Optional substring; only keys containing it are removed
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClearQuery {
    #[serde(default)]
    pub pattern: Option<String>,
}

impl ClearQuery {
    /// Pattern to apply, with an empty value treated as absent.
    pub fn pattern(&self) -> Option<&str> {
        self.pattern.as_deref().filter(|p| !p.is_empty())
    }
}
