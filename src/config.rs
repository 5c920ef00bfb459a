//! Application configuration loaded from environment variables.

use serde::Deserialize;
use tracing::info;

use crate::error::ConfigError;

/// Path of the accounts endpoint used as the connectivity probe.
pub const ACCOUNTS_PATH: &str = "/api/v1/accounts";

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // === Unipile Credentials ===
    /// Base URL of the Unipile API, without trailing slash.
    #[serde(default)]
    pub unipile_dsn: String,

    /// API key sent as `X-API-KEY`.
    #[serde(default)]
    pub unipile_api_key: String,

    /// Upstream request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub unipile_timeout_secs: u64,

    // === Server Configuration ===
    /// HTTP server port.
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_timeout_secs() -> u64 {
    15
}

fn default_port() -> u16 {
    5000
}

impl Config {
    /// Load configuration from environment, reading .env file first.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        let config: Self = envy::from_env()?;
        Ok(config.normalized())
    }

    /// Load configuration from an explicit set of variables.
    pub fn from_vars<I>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let config: Self = envy::from_iter(vars)?;
        Ok(config.normalized())
    }

    fn normalized(mut self) -> Self {
        self.unipile_dsn = self.unipile_dsn.trim_end_matches('/').to_string();
        info!("UNIPILE_DSN loaded: {}", !self.unipile_dsn.is_empty());
        info!("UNIPILE_API_KEY loaded: {}", !self.unipile_api_key.is_empty());
        self
    }

    /// Check if the configuration is valid.
    ///
    /// Only absent values (and a zero timeout) are rejected. A malformed URL
    /// or key is reported by the probe instead of stopping startup.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.unipile_dsn.is_empty() {
            return Err(ConfigError::Missing("UNIPILE_DSN"));
        }

        if self.unipile_api_key.is_empty() {
            return Err(ConfigError::Missing("UNIPILE_API_KEY"));
        }

        if self.unipile_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "UNIPILE_TIMEOUT_SECS must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Full URL of the accounts endpoint.
    pub fn accounts_url(&self) -> String {
        format!("{}{}", self.unipile_dsn, ACCOUNTS_PATH)
    }

    /// API key with everything but the last four characters masked.
    pub fn redacted_api_key(&self) -> String {
        let chars: Vec<char> = self.unipile_api_key.chars().collect();
        if chars.len() <= 4 {
            return "*".repeat(chars.len());
        }
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{}{}", "*".repeat(chars.len() - 4), tail)
    }
}
