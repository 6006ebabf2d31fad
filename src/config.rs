//! Runtime configuration
//!
//! Read once at startup and passed by reference to the components that need it.
//!
//! Environment variables:
//! - BRAINTRUST_API_KEY: API credential (required for any query)
//! - BRAINTRUST_API_URL: API base URL (default: https://api.braintrust.dev)
//! - BRAINTRUST_PROJECT_ID: Project whose logs are queried
//! - BRAINTRUST_OUTPUT_DIR: Directory for saved datasets (default: current directory)
//! - BRAINTRUST_TIMEOUT_SECS: Request timeout in seconds (default: 30)
//! - DEBUG: Set to "1" to log every executed query

use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "https://api.braintrust.dev";
pub const DEFAULT_PROJECT_ID: &str = "ec6cb39d-161d-4669-953f-444fd5c386f6";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Server configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: Option<String>,
    pub api_url: String,
    pub project_id: String,
    pub output_dir: PathBuf,
    pub timeout: Duration,
    pub debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: DEFAULT_API_URL.to_string(),
            project_id: DEFAULT_PROJECT_ID.to_string(),
            output_dir: PathBuf::from("."),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            debug: false,
        }
    }
}

impl Config {
    /// Build the configuration from process environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("BRAINTRUST_API_KEY").filter(|k| !k.trim().is_empty());

        let api_url = lookup("BRAINTRUST_API_URL")
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let project_id = lookup("BRAINTRUST_PROJECT_ID")
            .filter(|p| !p.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_PROJECT_ID.to_string());

        let output_dir = lookup("BRAINTRUST_OUTPUT_DIR")
            .filter(|d| !d.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));

        let timeout_secs = match lookup("BRAINTRUST_TIMEOUT_SECS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or_else(|| ConfigError::Invalid {
                    key: "BRAINTRUST_TIMEOUT_SECS",
                    value: raw.clone(),
                })?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        let debug = lookup("DEBUG").map(|v| v == "1").unwrap_or(false);

        Ok(Self {
            api_key,
            api_url,
            project_id,
            output_dir,
            timeout: Duration::from_secs(timeout_secs),
            debug,
        })
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}
