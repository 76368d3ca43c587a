use std::env::{self, VarError};
use std::time::Duration;

use serde::{Deserialize, Deserializer};

use crate::error::ConfigError;

/// Backend used when neither the caller nor the environment names one.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_VALIDATION_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_HEALTH_PATH: &str = "/health";

pub const ENV_BASE_URL: &str = "CHAT_BACKEND_URL";
pub const ENV_VALIDATION_TIMEOUT: &str = "CHAT_BACKEND_VALIDATION_TIMEOUT";
pub const ENV_HEALTH_PATH: &str = "CHAT_BACKEND_HEALTH_PATH";

/// Configuration for [`GatewayClient`](crate::GatewayClient).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    pub base_url: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
        }
    }
}

impl GatewayConfig {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    /// Create configuration from environment variables
    ///
    /// Reads:
    /// - `CHAT_BACKEND_URL`: backend base URL (default: `http://localhost:8000`)
    ///
    /// # Errors
    /// `ConfigError::NotUnicode` if the variable is set to a non-UTF-8 value.
    pub fn from_env() -> Result<Self, ConfigError> {
        let base_url = read_var(ENV_BASE_URL)?
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_owned());
        Ok(Self { base_url })
    }
}

/// Configuration for [`ConnectionValidator`](crate::ConnectionValidator).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ValidatorConfig {
    /// Hard bound on the probe, from dispatch to response headers.
    #[serde(deserialize_with = "deserialize_duration")]
    pub timeout: Duration,
    /// Path appended to the normalized server URL.
    pub health_path: String,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_VALIDATION_TIMEOUT,
            health_path: DEFAULT_HEALTH_PATH.to_owned(),
        }
    }
}

impl ValidatorConfig {
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_health_path(mut self, path: impl Into<String>) -> Self {
        self.health_path = path.into();
        self
    }

    /// Create configuration from environment variables
    ///
    /// Reads:
    /// - `CHAT_BACKEND_VALIDATION_TIMEOUT`: humantime duration, e.g. `10s`
    /// - `CHAT_BACKEND_HEALTH_PATH`: probe path starting with `/`
    ///
    /// # Errors
    /// `ConfigError` if a variable is set but cannot be used.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(value) = read_var(ENV_VALIDATION_TIMEOUT)? {
            let timeout =
                humantime::parse_duration(value.trim()).map_err(|source| {
                    ConfigError::InvalidDuration {
                        var: ENV_VALIDATION_TIMEOUT,
                        value: value.clone(),
                        source,
                    }
                })?;
            if timeout.is_zero() {
                return Err(ConfigError::Invalid {
                    var: ENV_VALIDATION_TIMEOUT,
                    reason: "timeout must be greater than zero".to_owned(),
                });
            }
            config.timeout = timeout;
        }

        if let Some(path) = read_var(ENV_HEALTH_PATH)? {
            if !path.starts_with('/') {
                return Err(ConfigError::Invalid {
                    var: ENV_HEALTH_PATH,
                    reason: format!("`{path}` must start with `/`"),
                });
            }
            config.health_path = path;
        }

        Ok(config)
    }
}

fn read_var(var: &'static str) -> Result<Option<String>, ConfigError> {
    match env::var(var) {
        Ok(value) => Ok(Some(value)),
        Err(VarError::NotPresent) => Ok(None),
        Err(VarError::NotUnicode(_)) => Err(ConfigError::NotUnicode { var }),
    }
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    humantime::parse_duration(&raw).map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        assert_eq!(GatewayConfig::default().base_url, "http://localhost:8000");
        let validator = ValidatorConfig::default();
        assert_eq!(validator.timeout, Duration::from_secs(10));
        assert_eq!(validator.health_path, "/health");
    }

    #[test]
    fn gateway_from_env_falls_back_to_default() {
        temp_env::with_var_unset(ENV_BASE_URL, || {
            let config = GatewayConfig::from_env().unwrap();
            assert_eq!(config.base_url, DEFAULT_BASE_URL);
        });
        temp_env::with_var(ENV_BASE_URL, Some("  "), || {
            let config = GatewayConfig::from_env().unwrap();
            assert_eq!(config.base_url, DEFAULT_BASE_URL);
        });
    }

    #[test]
    fn gateway_from_env_reads_override() {
        temp_env::with_var(ENV_BASE_URL, Some("https://backend.internal"), || {
            let config = GatewayConfig::from_env().unwrap();
            assert_eq!(config.base_url, "https://backend.internal");
        });
    }

    #[test]
    fn validator_from_env_parses_humantime() {
        temp_env::with_vars(
            [
                (ENV_VALIDATION_TIMEOUT, Some("2s 500ms")),
                (ENV_HEALTH_PATH, Some("/api/health")),
            ],
            || {
                let config = ValidatorConfig::from_env().unwrap();
                assert_eq!(config.timeout, Duration::from_millis(2500));
                assert_eq!(config.health_path, "/api/health");
            },
        );
    }

    #[test]
    fn validator_from_env_rejects_bad_values() {
        temp_env::with_var(ENV_VALIDATION_TIMEOUT, Some("soon"), || {
            let err = ValidatorConfig::from_env().unwrap_err();
            assert!(matches!(err, ConfigError::InvalidDuration { .. }));
        });
        temp_env::with_var(ENV_VALIDATION_TIMEOUT, Some("0s"), || {
            let err = ValidatorConfig::from_env().unwrap_err();
            assert!(matches!(err, ConfigError::Invalid { .. }));
        });
        temp_env::with_vars(
            [
                (ENV_VALIDATION_TIMEOUT, None),
                (ENV_HEALTH_PATH, Some("health")),
            ],
            || {
                let err = ValidatorConfig::from_env().unwrap_err();
                assert!(matches!(err, ConfigError::Invalid { var: ENV_HEALTH_PATH, .. }));
            },
        );
    }

    #[test]
    fn validator_config_deserializes_from_json() {
        let config: ValidatorConfig =
            serde_json::from_str(r#"{"timeout": "250ms"}"#).unwrap();
        assert_eq!(config.timeout, Duration::from_millis(250));
        assert_eq!(config.health_path, "/health");
    }
}
