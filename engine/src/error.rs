//! Error types for the kanban engine.

use crate::{CardId, SectionId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// All possible errors from the kanban engine.
///
/// Every variant is detected synchronously, before any state is touched, so
/// a caller receiving one can rely on the store being unchanged.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    // Gesture errors
    #[error("invalid drag: {0}")]
    Validation(String),

    // Lookup errors
    #[error("section not found: {0}")]
    SectionNotFound(SectionId),

    #[error("card not found: {0}")]
    CardNotFound(CardId),

    // State errors
    #[error("invalid board: {0}")]
    InvalidBoard(String),

    #[error("invalid snapshot: {0}")]
    InvalidSnapshot(String),
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Why the remote service did not persist a move.
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum RemoteFailure {
    /// Credential missing or rejected
    #[error("unauthorized")]
    Unauthorized,

    /// Entity deleted remotely before the move landed
    #[error("not found")]
    NotFound,

    /// Transport failure or timeout
    #[error("network error: {message}")]
    Network { message: String },

    #[error("server error {status}: {message}")]
    Server { status: u16, message: String },
}

impl RemoteFailure {
    /// Whether the non-core layer must send the user through login again.
    pub fn requires_reauth(&self) -> bool {
        matches!(self, RemoteFailure::Unauthorized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = Error::SectionNotFound(7);
        assert_eq!(err.to_string(), "section not found: 7");

        let err = Error::Validation("card drag without destination container".into());
        assert_eq!(
            err.to_string(),
            "invalid drag: card drag without destination container"
        );

        let err = Error::InvalidBoard("duplicate card 3".into());
        assert_eq!(err.to_string(), "invalid board: duplicate card 3");
    }

    #[test]
    fn remote_failure_display() {
        let failure = RemoteFailure::Server {
            status: 503,
            message: "maintenance".into(),
        };
        assert_eq!(failure.to_string(), "server error 503: maintenance");
        assert!(!failure.requires_reauth());
        assert!(RemoteFailure::Unauthorized.requires_reauth());
    }
}
