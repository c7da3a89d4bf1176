//! Configuration file handling for micam-cli

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use micam_client::ClientConfig;
use serde::{Deserialize, Serialize};

/// Configuration for the CLI tool
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Config.cgi URI of the device
    pub device: Option<String>,
    /// Maximum attempts per request
    pub retries: Option<u32>,
    /// Wait between failed attempts in milliseconds
    pub retry_delay_ms: Option<u64>,
    /// Per-attempt timeout in milliseconds
    pub timeout_ms: Option<u64>,
    /// Disable colored output
    pub no_color: Option<bool>,
}

/// Overrides given on the command line
#[derive(Debug, Clone, Default)]
pub struct ArgOverrides<'a> {
    pub device: Option<&'a str>,
    pub retries: Option<u32>,
    pub retry_delay_ms: Option<u64>,
    pub timeout_ms: Option<u64>,
    pub no_color: bool,
}

impl Config {
    /// Load configuration from the default config file
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Get the default config file path
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?
            .join("micam-cli");

        Ok(config_dir.join("config.toml"))
    }

    /// Merge CLI arguments over config file values
    pub fn merge_with_args(&self, args: &ArgOverrides<'_>) -> MergedConfig {
        let mut builder = ClientConfig::builder();

        if let Some(device) = args.device.map(String::from).or_else(|| self.device.clone()) {
            builder = builder.base_uri(device);
        }
        if let Some(retries) = args.retries.or(self.retries) {
            builder = builder.retry_count(retries);
        }
        if let Some(ms) = args.retry_delay_ms.or(self.retry_delay_ms) {
            builder = builder.retry_delay(Duration::from_millis(ms));
        }
        if let Some(ms) = args.timeout_ms.or(self.timeout_ms) {
            builder = builder.request_timeout(Duration::from_millis(ms));
        }

        MergedConfig {
            client: builder.build(),
            no_color: args.no_color || self.no_color.unwrap_or(false),
        }
    }
}

/// Fully resolved configuration after merging CLI args
#[derive(Debug, Clone)]
pub struct MergedConfig {
    pub client: ClientConfig,
    pub no_color: bool,
}
