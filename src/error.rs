//! Typed errors surfaced before any row is processed.

use thiserror::Error;

/// The input does not have the shape the aggregator needs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// One or more required header columns are absent.
    #[error("missing required column(s): {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    /// The input has no header row at all.
    #[error("input has no header row")]
    EmptyHeader,

    /// The configured delimiter is not a single ASCII character.
    #[error("invalid delimiter {0:?}: expected a single ASCII character or \"tab\"")]
    InvalidDelimiter(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_columns_message() {
        let err = ConfigurationError::MissingColumns(vec!["QTY".to_string(), "Postage".to_string()]);
        assert_eq!(err.to_string(), "missing required column(s): QTY, Postage");
    }
}
