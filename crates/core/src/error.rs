//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Every variant is recoverable: callers surface it as a status message and
/// carry on. Nothing in here is fatal to the process.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// An imported row (or cell) could not be parsed. `row` is 1-based and
    /// counts the header line, so it matches what a spreadsheet shows.
    #[error("parse error in row {row}: {message}")]
    Parse { row: usize, message: String },

    /// A required field or column is missing, or a value is out of range.
    #[error("validation failed: {0}")]
    Validation(String),

    /// An operation referenced a key that does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// An export or document was requested for data with zero rows.
    #[error("nothing to process: {0}")]
    Empty(String),

    /// The key already exists (e.g. the same tire at the same price in the cart).
    #[error("already present: {0}")]
    Duplicate(String),

    /// The admin gate is locked.
    #[error("unauthorized")]
    Unauthorized,
}

impl DomainError {
    pub fn parse(row: usize, msg: impl Into<String>) -> Self {
        Self::Parse {
            row,
            message: msg.into(),
        }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn empty(what: impl Into<String>) -> Self {
        Self::Empty(what.into())
    }

    pub fn duplicate(what: impl Into<String>) -> Self {
        Self::Duplicate(what.into())
    }

    /// Short machine-friendly name of the variant, used as a log field.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Parse { .. } => "parse",
            Self::Validation(_) => "validation",
            Self::NotFound(_) => "not_found",
            Self::Empty(_) => "empty",
            Self::Duplicate(_) => "duplicate",
            Self::Unauthorized => "unauthorized",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_mentions_row() {
        let err = DomainError::parse(7, "price 'abc' is not a number");
        assert_eq!(
            err.to_string(),
            "parse error in row 7: price 'abc' is not a number"
        );
        assert_eq!(err.kind(), "parse");
    }

    #[test]
    fn constructors_map_to_variants() {
        assert_eq!(
            DomainError::not_found("X"),
            DomainError::NotFound("X".to_string())
        );
        assert_eq!(DomainError::empty("master").kind(), "empty");
        assert_eq!(DomainError::duplicate("A_1.00").kind(), "duplicate");
    }
}
