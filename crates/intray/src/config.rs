//! Client configuration loading and validation.

use std::path::{Path, PathBuf};

use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_poll_interval_secs() -> u64 {
    10
}

fn default_search_debounce_ms() -> u64 {
    300
}

fn default_page_size() -> u32 {
    25
}

fn default_retry_settle_ms() -> u64 {
    2000
}

fn default_retry_settle_attempts() -> u32 {
    3
}

/// Configuration for the review queue client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientConfig {
    /// Base URL of the ingestion platform.
    pub base_url: String,

    /// API token, either a literal value or an `env:VAR_NAME` reference
    /// resolved at client construction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,

    /// TCP connect timeout for API requests.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// Overall request timeout; a timeout is a transport failure.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Background poll interval while the queue view is visible.
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    /// Quiescence window applied to search-text edits.
    #[serde(default = "default_search_debounce_ms")]
    pub search_debounce_ms: u64,

    /// Jobs per page.
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Delay between re-reads while waiting for a retry to take effect.
    #[serde(default = "default_retry_settle_ms")]
    pub retry_settle_ms: u64,

    /// Maximum re-reads while waiting for a retry to take effect.
    #[serde(default = "default_retry_settle_attempts")]
    pub retry_settle_attempts: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            api_token: None,
            connect_timeout_secs: default_connect_timeout_secs(),
            request_timeout_secs: default_request_timeout_secs(),
            poll_interval_secs: default_poll_interval_secs(),
            search_debounce_ms: default_search_debounce_ms(),
            page_size: default_page_size(),
            retry_settle_ms: default_retry_settle_ms(),
            retry_settle_attempts: default_retry_settle_attempts(),
        }
    }
}

impl ClientConfig {
    /// Creates a configuration for the given platform URL with defaults
    /// for everything else.
    pub fn for_base_url(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            ..Default::default()
        }
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_url.trim().is_empty() {
            return Err(ConfigError::Validation {
                message: "baseUrl must not be empty".to_string(),
            });
        }
        if reqwest::Url::parse(&self.base_url).is_err() {
            return Err(ConfigError::Validation {
                message: format!("baseUrl is not a valid URL: {}", self.base_url),
            });
        }
        if self.page_size == 0 {
            return Err(ConfigError::Validation {
                message: "pageSize must be at least 1".to_string(),
            });
        }
        if self.poll_interval_secs == 0 {
            return Err(ConfigError::Validation {
                message: "pollIntervalSecs must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Resolves the configured API token into a secret.
    ///
    /// `env:VAR_NAME` values are read from the environment; a missing
    /// variable resolves to no token (the platform will reject the calls,
    /// which surfaces the misconfiguration at the first request).
    pub fn resolve_token(&self) -> Option<SecretString> {
        let raw = self.api_token.as_deref()?;
        if let Some(var) = raw.strip_prefix("env:") {
            match std::env::var(var) {
                Ok(value) => Some(SecretString::from(value)),
                Err(_) => {
                    log::warn!("API token environment variable '{var}' is not set");
                    None
                }
            }
        } else {
            Some(SecretString::from(raw.to_string()))
        }
    }
}

/// Loads and validates a configuration from a JSON file.
pub fn load_config(path: &Path) -> Result<ClientConfig, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;
    load_config_from_str(&contents)
}

/// Parses and validates a configuration from a JSON string.
pub fn load_config_from_str(contents: &str) -> Result<ClientConfig, ConfigError> {
    let config: ClientConfig = serde_json::from_str(contents)?;
    config.validate()?;
    Ok(config)
}

/// Default location of the client configuration file.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("intray").join("config.json"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_gets_defaults() {
        let config =
            load_config_from_str(r#"{"baseUrl": "https://platform.example.com"}"#).unwrap();
        assert_eq!(config.poll_interval_secs, 10);
        assert_eq!(config.search_debounce_ms, 300);
        assert_eq!(config.page_size, 25);
        assert_eq!(config.retry_settle_ms, 2000);
        assert_eq!(config.retry_settle_attempts, 3);
        assert!(config.api_token.is_none());
    }

    #[test]
    fn test_empty_base_url_is_rejected() {
        let result = load_config_from_str(r#"{"baseUrl": ""}"#);
        assert!(matches!(result, Err(ConfigError::Validation { .. })));
    }

    #[test]
    fn test_invalid_base_url_is_rejected() {
        let result = load_config_from_str(r#"{"baseUrl": "not a url"}"#);
        assert!(matches!(result, Err(ConfigError::Validation { .. })));
    }

    #[test]
    fn test_zero_page_size_is_rejected() {
        let result = load_config_from_str(
            r#"{"baseUrl": "https://platform.example.com", "pageSize": 0}"#,
        );
        assert!(matches!(result, Err(ConfigError::Validation { .. })));
    }

    #[test]
    fn test_malformed_json_is_a_parse_error() {
        let result = load_config_from_str("{not json");
        assert!(matches!(result, Err(ConfigError::ParseJson(_))));
    }

    #[test]
    fn test_literal_token_resolves() {
        let config = ClientConfig {
            api_token: Some("tok-123".to_string()),
            ..ClientConfig::for_base_url("https://platform.example.com")
        };
        assert!(config.resolve_token().is_some());
    }

    #[test]
    fn test_missing_env_token_resolves_to_none() {
        let config = ClientConfig {
            api_token: Some("env:INTRAY_TEST_TOKEN_THAT_DOES_NOT_EXIST".to_string()),
            ..ClientConfig::for_base_url("https://platform.example.com")
        };
        assert!(config.resolve_token().is_none());
    }
}
