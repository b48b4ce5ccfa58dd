use std::path::PathBuf;
use thiserror::Error;

use crate::search::{QueryError, RankingError, WeightsError};
use crate::sources::SourceError;
use crate::timeline::GroupingError;

/// Main error type for Thoughtline
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed query text or out-of-range paging/limit values
    #[error(transparent)]
    Query(#[from] QueryError),

    /// Ranking could not complete
    #[error(transparent)]
    Ranking(#[from] RankingError),

    /// Timeline grouping failed or the group type is unsupported
    #[error(transparent)]
    Grouping(#[from] GroupingError),

    /// Scoring weights rejected
    #[error(transparent)]
    Weights(#[from] WeightsError),

    /// Candidate or timeline entry source failed
    #[error(transparent)]
    Source(#[from] SourceError),

    /// Configuration related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration validation errors
    #[error("Configuration validation failed: {errors:?}")]
    ConfigValidation { errors: Vec<ValidationError> },

    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Invalid configuration value
    #[error("Invalid configuration value at {path}: {message}")]
    InvalidConfigValue { path: String, message: String },

    /// IO errors
    #[error("IO error: {context}: {source}")]
    Io {
        source: std::io::Error,
        context: String,
    },

    /// TOML deserialization errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// TOML serialization errors
    #[error("TOML serialization error: {0}")]
    TomlSerialization(#[from] toml::ser::Error),

    /// JSON errors
    #[error("JSON error: {context}: {source}")]
    Json {
        source: serde_json::Error,
        context: String,
    },

    /// A built-in query syntax pattern failed to compile
    #[error("Pattern error: {0}")]
    Pattern(String),

    /// Generic errors
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    /// Whether the caller can fix the failure by changing its input
    pub fn is_client_error(&self) -> bool {
        matches!(self, Error::Query(_))
            || matches!(self, Error::Grouping(GroupingError::UnsupportedGroupType(_)))
    }
}

/// Configuration validation error
#[derive(Debug, Clone)]
pub struct ValidationError {
    /// Path to the configuration key that failed validation
    pub path: String,
    /// Error message describing the validation failure
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Result type for Thoughtline operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_errors_are_client_errors() {
        let err: Error = QueryError::Empty.into();
        assert!(err.is_client_error());
        assert_eq!(err.to_string(), "query text cannot be empty");
    }

    #[test]
    fn test_ranking_errors_are_server_errors() {
        let err: Error = RankingError::NonFiniteScore { position: 2 }.into();
        assert!(!err.is_client_error());
    }

    #[test]
    fn test_unsupported_group_type_is_client_error() {
        let err: Error = GroupingError::UnsupportedGroupType("weekly".to_string()).into();
        assert!(err.is_client_error());
    }
}
