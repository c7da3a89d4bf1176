//! Client configuration with YAML/TOML support

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Fixed address of the dashcam's Config.cgi endpoint
pub const DEFAULT_BASE_URI: &str = "http://192.72.1.1/cgi-bin/Config.cgi";

/// Device client configuration
///
/// Can be loaded from YAML, TOML, JSON, or constructed programmatically.
/// Every field has a default matching the stock firmware.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Connection settings
    #[serde(default)]
    pub connection: ConnectionConfig,

    /// Retry and timeout settings
    #[serde(default)]
    pub retry: RetryConfig,
}

/// Connection configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Full URI of the Config.cgi endpoint
    #[serde(default = "default_base_uri")]
    pub base_uri: String,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            base_uri: default_base_uri(),
        }
    }
}

fn default_base_uri() -> String {
    DEFAULT_BASE_URI.to_string()
}

/// Retry configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum attempts per request (default: 3)
    #[serde(default = "default_retry_count")]
    pub count: u32,

    /// Wait between failed attempts in milliseconds (default: 3s)
    #[serde(default = "default_retry_delay")]
    pub delay_ms: u64,

    /// Per-attempt timeout in milliseconds (default: 10s)
    #[serde(default = "default_request_timeout")]
    pub timeout_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            count: default_retry_count(),
            delay_ms: default_retry_delay(),
            timeout_ms: default_request_timeout(),
        }
    }
}

fn default_retry_count() -> u32 {
    3
}

fn default_retry_delay() -> u64 {
    3_000 // 3 seconds
}

fn default_request_timeout() -> u64 {
    10_000 // 10 seconds
}

impl RetryConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl ClientConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::IoError(e.to_string()))?;
        Self::from_yaml(&content)
    }

    /// Load configuration from a TOML file
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::IoError(e.to_string()))?;
        Self::from_toml(&content)
    }

    /// Parse configuration from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(yaml).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Parse configuration from TOML string
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Parse configuration from JSON string
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Serialize configuration to YAML
    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        serde_yaml::to_string(self).map_err(|e| ConfigError::SerializeError(e.to_string()))
    }

    /// Create a builder for programmatic configuration
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::new()
    }
}

/// Builder for ClientConfig
#[derive(Debug, Default)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the Config.cgi URI
    pub fn base_uri(mut self, uri: impl Into<String>) -> Self {
        self.config.connection.base_uri = uri.into();
        self
    }

    /// Set the maximum number of attempts
    pub fn retry_count(mut self, count: u32) -> Self {
        self.config.retry.count = count;
        self
    }

    /// Set the wait between failed attempts
    pub fn retry_delay(mut self, delay: Duration) -> Self {
        self.config.retry.delay_ms = delay.as_millis() as u64;
        self
    }

    /// Set the per-attempt timeout
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.config.retry.timeout_ms = timeout.as_millis() as u64;
        self
    }

    /// Build the configuration
    pub fn build(self) -> ClientConfig {
        self.config
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Serialize error: {0}")]
    SerializeError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.connection.base_uri, DEFAULT_BASE_URI);
        assert_eq!(config.retry.count, 3);
        assert_eq!(config.retry.delay(), Duration::from_secs(3));
        assert_eq!(config.retry.timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_yaml_parsing() {
        let yaml = r#"
connection:
  base_uri: "http://10.0.0.5/cgi-bin/Config.cgi"

retry:
  count: 5
  delay_ms: 250
"#;

        let config = ClientConfig::from_yaml(yaml).unwrap();
        assert_eq!(
            config.connection.base_uri,
            "http://10.0.0.5/cgi-bin/Config.cgi"
        );
        assert_eq!(config.retry.count, 5);
        assert_eq!(config.retry.delay_ms, 250);
        // Unspecified fields keep their defaults
        assert_eq!(config.retry.timeout_ms, 10_000);
    }

    #[test]
    fn test_toml_parsing() {
        let content = r#"
[retry]
count = 1
timeout_ms = 2000
"#;

        let config = ClientConfig::from_toml(content).unwrap();
        assert_eq!(config.connection.base_uri, DEFAULT_BASE_URI);
        assert_eq!(config.retry.count, 1);
        assert_eq!(config.retry.delay_ms, 3_000);
        assert_eq!(config.retry.timeout(), Duration::from_secs(2));
    }

    #[test]
    fn test_empty_json_is_default() {
        let config = ClientConfig::from_json("{}").unwrap();
        assert_eq!(config, ClientConfig::default());
    }

    #[test]
    fn test_invalid_yaml() {
        let result = ClientConfig::from_yaml("retry: [1, 2");
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_builder() {
        let config = ClientConfig::builder()
            .base_uri("http://127.0.0.1:8080/cgi-bin/Config.cgi")
            .retry_count(0)
            .retry_delay(Duration::from_millis(100))
            .request_timeout(Duration::from_secs(1))
            .build();

        assert_eq!(
            config.connection.base_uri,
            "http://127.0.0.1:8080/cgi-bin/Config.cgi"
        );
        assert_eq!(config.retry.count, 0);
        assert_eq!(config.retry.delay_ms, 100);
        assert_eq!(config.retry.timeout_ms, 1_000);
    }

    #[test]
    fn test_to_yaml() {
        let yaml = ClientConfig::default().to_yaml().unwrap();
        assert!(yaml.contains("base_uri"));
        assert!(yaml.contains("192.72.1.1"));
    }
}
