//! Request handlers for boards, sections and cards.
//!
//! Handlers validate their input before touching the database, then map a
//! missing row to `404`.

mod boards;
mod cards;
mod sections;

pub use boards::*;
pub use cards::*;
pub use sections::*;

use crate::error::{AppError, Result};

/// Column width of the stored titles.
pub const MAX_TITLE_LEN: usize = 255;

/// Trimmed title, or `400` if it is blank.
pub(crate) fn require_title(title: &str) -> Result<&str> {
    let title = title.trim();
    if title.is_empty() {
        return Err(AppError::BadRequest("Title must not be empty".into()));
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(AppError::BadRequest(format!(
            "Title must be at most {} characters",
            MAX_TITLE_LEN
        )));
    }
    Ok(title)
}

/// Target index from the wire, or `400` if it is negative.
pub(crate) fn require_position(position: i64) -> Result<usize> {
    usize::try_from(position).map_err(|_| {
        AppError::BadRequest(format!("Position must be non-negative, got {}", position))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn titles_are_trimmed() {
        assert_eq!(require_title("  Todo ").unwrap(), "Todo");
        assert!(require_title("   ").is_err());
        assert!(require_title(&"x".repeat(MAX_TITLE_LEN + 1)).is_err());
    }

    #[test]
    fn positions_must_be_non_negative() {
        assert_eq!(require_position(0).unwrap(), 0);
        assert_eq!(require_position(12).unwrap(), 12);
        assert!(matches!(require_position(-1), Err(AppError::BadRequest(_))));
    }
}
