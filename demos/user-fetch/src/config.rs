//! Configuration for the user API client.
//!
//! Read from environment variables; every setting has a default so the demo
//! runs without any configuration.
//!
//! | Variable             | Default                                        |
//! |----------------------|------------------------------------------------|
//! | `USERS_ENDPOINT`     | `https://jsonplaceholder.typicode.com/users`   |
//! | `USERS_TIMEOUT_SECS` | `10`                                           |

use std::time::Duration;
use thiserror::Error;

/// Endpoint queried when `USERS_ENDPOINT` is not set
pub const DEFAULT_ENDPOINT: &str = "https://jsonplaceholder.typicode.com/users";

/// Request timeout when `USERS_TIMEOUT_SECS` is not set
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Configuration error
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A variable is set but cannot be parsed
    #[error("Failed to parse {var}: {message}")]
    ParseError {
        /// Offending variable
        var: &'static str,
        /// Parser message
        message: String,
    },

    /// Configuration validation failed
    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

/// User API configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsersConfig {
    /// URL answering `GET` with a JSON array of user records
    pub endpoint: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl UsersConfig {
    /// Load configuration from the process environment
    ///
    /// # Errors
    ///
    /// Returns error if a variable is set to an invalid value
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    ///
    /// # Errors
    ///
    /// Returns error if a variable is set to an invalid value
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(endpoint) = lookup("USERS_ENDPOINT") {
            config.endpoint = endpoint;
        }

        if let Some(timeout) = lookup("USERS_TIMEOUT_SECS") {
            config.timeout_secs = timeout.trim().parse().map_err(|e: std::num::ParseIntError| {
                ConfigError::ParseError {
                    var: "USERS_TIMEOUT_SECS",
                    message: e.to_string(),
                }
            })?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    ///
    /// # Errors
    ///
    /// Returns error if configuration is invalid
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.endpoint.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "endpoint cannot be empty".to_string(),
            ));
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "timeout_secs must be > 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Get timeout as Duration
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for UsersConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_in(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |var| vars.get(var).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = UsersConfig::from_lookup(lookup_in(&[]));
        assert_eq!(config, Ok(UsersConfig::default()));
    }

    #[test]
    fn test_overrides() {
        let config = UsersConfig::from_lookup(lookup_in(&[
            ("USERS_ENDPOINT", "http://localhost:8080/users"),
            ("USERS_TIMEOUT_SECS", " 3 "),
        ]));

        assert_eq!(
            config,
            Ok(UsersConfig {
                endpoint: "http://localhost:8080/users".to_string(),
                timeout_secs: 3,
            })
        );
    }

    #[test]
    fn test_invalid_timeout() {
        let config = UsersConfig::from_lookup(lookup_in(&[("USERS_TIMEOUT_SECS", "soon")]));
        assert!(matches!(
            config,
            Err(ConfigError::ParseError {
                var: "USERS_TIMEOUT_SECS",
                ..
            })
        ));

        let config = UsersConfig::from_lookup(lookup_in(&[("USERS_TIMEOUT_SECS", "0")]));
        assert!(matches!(config, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_empty_endpoint_rejected() {
        let config = UsersConfig::from_lookup(lookup_in(&[("USERS_ENDPOINT", "")]));
        assert!(matches!(config, Err(ConfigError::ValidationError(_))));
    }
}
