//! Error types for the client.

use crate::config::ConfigError;
use kanban_engine::RemoteFailure;

/// Errors surfaced by session operations.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// The board service rejected or never received the call
    #[error("Remote error: {0}")]
    Remote(#[from] RemoteFailure),

    /// The service answered, but the result does not fit the local board
    #[error("Engine error: {0}")]
    Engine(#[from] kanban_engine::Error),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

impl SyncError {
    /// Whether the caller must send the user through login again.
    pub fn requires_reauth(&self) -> bool {
        matches!(self, SyncError::Remote(failure) if failure.requires_reauth())
    }
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, SyncError>;
