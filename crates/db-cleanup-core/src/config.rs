//! Provider connection settings
//!
//! Settings come from an optional TOML file with `${VAR}` expansion, and the
//! binary applies command-line overrides on top. A missing file yields the
//! defaults.
//!
//! ```toml
//! api_url = "${PROVIDER_API_URL:-https://api.prisma.io}"
//! timeout_secs = 60
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::error::{CleanupError, Result};

/// User agent string for provider HTTP requests
pub const USER_AGENT: &str = concat!("db-cleanup/", env!("CARGO_PKG_VERSION"));

/// Provider connection settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Base URL of the provider API, without the `/v1` suffix
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Deadline applied to each provider call, in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_api_url() -> String {
    "https://api.prisma.io".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl ProviderConfig {
    /// Load settings from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| CleanupError::ConfigFile {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        let expanded = Self::expand_env_vars(&content);

        toml::from_str(&expanded).map_err(|e| CleanupError::ConfigFile {
            path: path.display().to_string(),
            message: format!("parse error: {}", e),
        })
    }

    fn expand_env_vars(content: &str) -> String {
        // Unset variables stay as written instead of failing the load
        shellexpand::env_with_context_no_errors(content, |var| std::env::var(var).ok()).to_string()
    }

    /// Deadline for a single provider call
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Apply command-line overrides
    pub fn with_overrides(mut self, api_url: Option<String>, timeout_secs: Option<u64>) -> Self {
        if let Some(url) = api_url {
            self.api_url = url;
        }
        if let Some(secs) = timeout_secs {
            self.timeout_secs = secs;
        }
        self
    }

    /// Reject settings no run could succeed with
    pub fn validate(self) -> Result<Self> {
        if self.timeout_secs == 0 {
            return Err(CleanupError::Configuration(
                "timeout_secs must be greater than 0".to_string(),
            ));
        }
        Ok(self)
    }

    /// Base URL with any trailing slash removed
    pub fn base_url(&self) -> &str {
        self.api_url.trim_end_matches('/')
    }
}
