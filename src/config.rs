//! Configuration Module
//!
//! Handles loading and managing gateway configuration from environment variables.

use std::env;
use std::time::Duration;

use tracing::warn;

use crate::error::{GatewayError, Result};
use crate::throttle::ThrottlePolicy;

/// Gateway configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Maximum number of entries the cache can hold
    pub max_entries: usize,
    /// TTL for keys outside the known categories
    pub default_ttl: Duration,
    /// Concurrency ceiling per provider
    pub throttle_max_concurrent: usize,
    /// Minimum spacing between dispatches to one provider
    pub throttle_min_interval: Duration,
    /// Per-provider policies overriding the defaults above
    pub throttle_overrides: Vec<(String, ThrottlePolicy)>,
    /// Operator HTTP port
    pub server_port: u16,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_MAX_ENTRIES` - Maximum cache entries (default: 1000)
    /// - `CACHE_DEFAULT_TTL_MS` - Fallback TTL in milliseconds (default: 30000)
    /// - `THROTTLE_MAX_CONCURRENT` - Concurrent calls per provider (default: 1)
    /// - `THROTTLE_MIN_INTERVAL_MS` - Spacing between calls in milliseconds (default: 100)
    /// - `THROTTLE_OVERRIDES` - e.g. `kraken=1:3000,binance=2:50` (default: none)
    /// - `SERVER_PORT` - Operator HTTP port (default: 3000)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let throttle_overrides = match env::var("THROTTLE_OVERRIDES") {
            Ok(raw) => parse_overrides(&raw).unwrap_or_else(|e| {
                warn!("Ignoring THROTTLE_OVERRIDES: {}", e);
                Vec::new()
            }),
            Err(_) => Vec::new(),
        };

        Self {
            max_entries: env_parse("CACHE_MAX_ENTRIES").unwrap_or(defaults.max_entries),
            default_ttl: env_parse("CACHE_DEFAULT_TTL_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.default_ttl),
            throttle_max_concurrent: env_parse("THROTTLE_MAX_CONCURRENT")
                .unwrap_or(defaults.throttle_max_concurrent),
            throttle_min_interval: env_parse("THROTTLE_MIN_INTERVAL_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.throttle_min_interval),
            throttle_overrides,
            server_port: env_parse("SERVER_PORT").unwrap_or(defaults.server_port),
        }
    }

    /// Rejects values the gateway cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.max_entries == 0 {
            return Err(GatewayError::InvalidConfig(
                "CACHE_MAX_ENTRIES must be greater than zero".to_string(),
            ));
        }
        if self.default_ttl.is_zero() {
            return Err(GatewayError::InvalidConfig(
                "CACHE_DEFAULT_TTL_MS must be greater than zero".to_string(),
            ));
        }
        self.throttle_policy()?;
        Ok(())
    }

    /// Default throttle policy built from the flat settings.
    pub fn throttle_policy(&self) -> Result<ThrottlePolicy> {
        ThrottlePolicy::new(self.throttle_max_concurrent, self.throttle_min_interval)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_entries: 1000,
            default_ttl: Duration::from_secs(30),
            throttle_max_concurrent: 1,
            throttle_min_interval: Duration::from_millis(100),
            throttle_overrides: Vec::new(),
            server_port: 3000,
        }
    }
}

/// Parses `identity=max:interval_ms` pairs separated by commas.
pub fn parse_overrides(raw: &str) -> Result<Vec<(String, ThrottlePolicy)>> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(|item| {
            let (identity, policy) = item.split_once('=').ok_or_else(|| {
                GatewayError::InvalidConfig(format!("expected identity=policy, got '{}'", item))
            })?;
            let identity = identity.trim();
            if identity.is_empty() {
                return Err(GatewayError::InvalidConfig(format!(
                    "missing identity in '{}'",
                    item
                )));
            }
            Ok((identity.to_lowercase(), policy.parse::<ThrottlePolicy>()?))
        })
        .collect()
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.max_entries, 1000);
        assert_eq!(config.default_ttl, Duration::from_secs(30));
        assert_eq!(config.throttle_max_concurrent, 1);
        assert_eq!(config.throttle_min_interval, Duration::from_millis(100));
        assert!(config.throttle_overrides.is_empty());
        assert_eq!(config.server_port, 3000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_from_env_defaults() {
        // Clear any existing env vars to test defaults
        env::remove_var("CACHE_MAX_ENTRIES");
        env::remove_var("CACHE_DEFAULT_TTL_MS");
        env::remove_var("THROTTLE_MAX_CONCURRENT");
        env::remove_var("THROTTLE_MIN_INTERVAL_MS");
        env::remove_var("THROTTLE_OVERRIDES");
        env::remove_var("SERVER_PORT");

        let config = Config::from_env();
        assert_eq!(config.max_entries, 1000);
        assert_eq!(config.default_ttl, Duration::from_secs(30));
        assert_eq!(config.throttle_max_concurrent, 1);
        assert_eq!(config.server_port, 3000);
    }

    #[test]
    fn test_validate_rejects_zero_values() {
        let config = Config {
            max_entries: 0,
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(GatewayError::InvalidConfig(_))));

        let config = Config {
            default_ttl: Duration::ZERO,
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(GatewayError::InvalidConfig(_))));

        let config = Config {
            throttle_max_concurrent: 0,
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(GatewayError::InvalidPolicy(_))));
    }

    #[test]
    fn test_parse_overrides() {
        let overrides = parse_overrides("Kraken=1:3000, binance=2:50,").unwrap();
        assert_eq!(overrides.len(), 2);
        assert_eq!(overrides[0].0, "kraken");
        assert_eq!(overrides[0].1.min_interval(), Duration::from_secs(3));
        assert_eq!(overrides[1].0, "binance");
        assert_eq!(overrides[1].1.max_concurrent(), 2);

        assert!(parse_overrides("").unwrap().is_empty());
    }

    #[test]
    fn test_parse_overrides_errors() {
        assert!(matches!(
            parse_overrides("kraken"),
            Err(GatewayError::InvalidConfig(_))
        ));
        assert!(matches!(
            parse_overrides("=1:10"),
            Err(GatewayError::InvalidConfig(_))
        ));
        assert!(matches!(
            parse_overrides("kraken=0:10"),
            Err(GatewayError::InvalidPolicy(_))
        ));
    }
}
