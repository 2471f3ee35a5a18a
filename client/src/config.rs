//! Configuration management for the client.

use std::env;
use std::time::Duration;

/// Default HTTP timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Client configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the board service, without trailing slash
    pub api_url: String,
    /// Bearer credential sent on every request
    pub token: String,
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn new(api_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Load `.env` if present, then read the environment.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_env()
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_url = env::var("KANBAN_API_URL").map_err(|_| ConfigError::MissingApiUrl)?;
        let token = env::var("KANBAN_API_TOKEN").map_err(|_| ConfigError::MissingToken)?;

        let timeout_secs = match env::var("KANBAN_HTTP_TIMEOUT_SECS") {
            Ok(raw) => raw.parse().map_err(|_| ConfigError::InvalidTimeout(raw))?,
            Err(_) => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Self::new(api_url, token).with_timeout(Duration::from_secs(timeout_secs)))
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("KANBAN_API_URL environment variable is required")]
    MissingApiUrl,

    #[error("KANBAN_API_TOKEN environment variable is required")]
    MissingToken,

    #[error("Invalid KANBAN_HTTP_TIMEOUT_SECS value: {0}")]
    InvalidTimeout(String),
}
