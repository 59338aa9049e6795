//! Server configuration from the environment
//!
//! Read once at startup, after `.env.local` has been loaded. Empty API keys
//! are treated as unset.

use std::time::Duration;
use thiserror::Error;

const DEFAULT_PORT: u16 = 3001;
const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 15;
const DEFAULT_ARTEMIS_TIMEOUT_SECS: u64 = 10;
const DEFAULT_CACHE_TTL_SECS: u64 = 300;

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("{var} must be a non-negative integer, got {value:?}")]
    InvalidNumber { var: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Enables live Artemis data for the volume engine and user metrics
    pub artemis_api_key: Option<String>,
    /// Enables running saved Dune queries
    pub dune_api_key: Option<String>,
    pub port: u16,
    /// Request timeout for DefiLlama and Dune
    pub upstream_timeout: Duration,
    /// Deadline for the volume engine's live call
    pub artemis_timeout: Duration,
    pub cache_ttl: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            artemis_api_key: None,
            dune_api_key: None,
            port: DEFAULT_PORT,
            upstream_timeout: Duration::from_secs(DEFAULT_UPSTREAM_TIMEOUT_SECS),
            artemis_timeout: Duration::from_secs(DEFAULT_ARTEMIS_TIMEOUT_SECS),
            cache_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let key = |var: &str| lookup(var).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let number = |var: &'static str, default: u64| -> Result<u64, ConfigError> {
            match key(var) {
                None => Ok(default),
                Some(value) => value
                    .parse()
                    .map_err(|_| ConfigError::InvalidNumber { var, value }),
            }
        };

        let port = number("SERVER_PORT", u64::from(DEFAULT_PORT))?;
        let port = u16::try_from(port).map_err(|_| ConfigError::InvalidNumber {
            var: "SERVER_PORT",
            value: port.to_string(),
        })?;

        Ok(Self {
            artemis_api_key: key("ARTEMIS_API_KEY"),
            dune_api_key: key("DUNE_API_KEY"),
            port,
            upstream_timeout: Duration::from_secs(number(
                "UPSTREAM_TIMEOUT_SECS",
                DEFAULT_UPSTREAM_TIMEOUT_SECS,
            )?),
            artemis_timeout: Duration::from_secs(number(
                "ARTEMIS_TIMEOUT_SECS",
                DEFAULT_ARTEMIS_TIMEOUT_SECS,
            )?),
            cache_ttl: Duration::from_secs(number("CACHE_TTL_SECS", DEFAULT_CACHE_TTL_SECS)?),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|var| vars.get(var).cloned())
    }

    #[test]
    fn test_defaults() {
        assert_eq!(config_from(&[]).unwrap(), AppConfig::default());
    }

    #[test]
    fn test_empty_key_is_unset() {
        let config = config_from(&[("ARTEMIS_API_KEY", ""), ("DUNE_API_KEY", "  ")]).unwrap();
        assert_eq!(config.artemis_api_key, None);
        assert_eq!(config.dune_api_key, None);
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("ARTEMIS_API_KEY", "art-key"),
            ("SERVER_PORT", "8080"),
            ("ARTEMIS_TIMEOUT_SECS", "2"),
            ("CACHE_TTL_SECS", "60"),
        ])
        .unwrap();

        assert_eq!(config.artemis_api_key.as_deref(), Some("art-key"));
        assert_eq!(config.port, 8080);
        assert_eq!(config.artemis_timeout, Duration::from_secs(2));
        assert_eq!(config.cache_ttl, Duration::from_secs(60));
        assert_eq!(config.upstream_timeout, Duration::from_secs(15));
    }

    #[test]
    fn test_invalid_number() {
        assert_eq!(
            config_from(&[("UPSTREAM_TIMEOUT_SECS", "soon")]).unwrap_err(),
            ConfigError::InvalidNumber {
                var: "UPSTREAM_TIMEOUT_SECS",
                value: "soon".to_string()
            }
        );
        assert!(config_from(&[("SERVER_PORT", "70000")]).is_err());
    }
}
