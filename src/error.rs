//! Error types for sqlcage.

use thiserror::Error;

/// The main error type for sqlcage operations.
#[derive(Debug, Error)]
pub enum CageError {
    /// An identifier segment is empty or contains a double quote.
    #[error("Invalid identifier: '{0}'")]
    InvalidIdentifier(String),

    /// Unrecognized `[op]` token on a condition or mutation key.
    #[error("Invalid operator suffix '[{suffix}]' on key '{key}'")]
    InvalidOperatorSuffix { key: String, suffix: String },

    /// Relational comparison against a value that is neither numeric nor a date/time.
    #[error("Invalid comparison value for {column} [{op}]: {value}")]
    InvalidComparisonValue {
        column: String,
        op: &'static str,
        value: String,
    },

    /// Join key or relation descriptor could not be understood.
    #[error("Invalid join specification: {0}")]
    InvalidJoinSpec(String),

    /// Range operand is not a two element pair.
    #[error("Invalid range value for {column}: expected a pair, got {value}")]
    InvalidRangeValue { column: String, value: String },

    /// Insert/update payload has nothing to write.
    #[error("Mutation record for '{0}' has no encodable fields")]
    EmptyMutationRecord(String),

    /// Arithmetic update with a non-numeric operand.
    #[error("Arithmetic update {column} [{op}] needs a numeric value, got {value}")]
    InvalidArithmeticValue {
        column: String,
        op: char,
        value: String,
    },

    /// A value that cannot be rendered in this position.
    #[error("Invalid value: {0}")]
    InvalidValue(String),

    /// Malformed GROUP/ORDER/HAVING/LIMIT/LIKE/MATCH modifier.
    #[error("Invalid {modifier} modifier: {message}")]
    InvalidModifier {
        modifier: &'static str,
        message: String,
    },

    /// Failed to parse a key or request document.
    #[error("Parse error at position {position}: {message}")]
    Parse { position: usize, message: String },

    /// Connection error.
    #[error("Connection error: {0}")]
    Connection(String),

    /// Query execution error.
    #[error("Execution error: {0}")]
    Execution(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CageError {
    /// Create a parse error at the given position.
    pub fn parse(position: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            position,
            message: message.into(),
        }
    }

    /// Create a modifier error.
    pub fn modifier(modifier: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidModifier {
            modifier,
            message: message.into(),
        }
    }
}

/// Result type alias for sqlcage operations.
pub type CageResult<T> = Result<T, CageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CageError::parse(5, "unexpected character");
        assert_eq!(
            err.to_string(),
            "Parse error at position 5: unexpected character"
        );
    }

    #[test]
    fn test_operator_suffix_display() {
        let err = CageError::InvalidOperatorSuffix {
            key: "age[~]".to_string(),
            suffix: "~".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid operator suffix '[~]' on key 'age[~]'");
    }
}
