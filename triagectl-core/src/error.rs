/// Structured error types for triagectl-core.
///
/// Uses `thiserror` so the store and queue report typed failures.
/// The binary crate (triagectl-cli) wraps these in `anyhow` for context,
/// but library consumers can match on the variant.

use std::error::Error as StdError;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for triagectl-core operations
#[derive(Error, Debug)]
pub enum TriageError {
    /// The database file could not be opened or its schema created
    #[error("Storage unavailable at {path:?}: {source}")]
    StorageUnavailable {
        path: PathBuf,
        /// SQLite error, or the I/O error from creating the parent directory
        source: Box<dyn StdError + Send + Sync>,
    },

    /// An INSERT or UPDATE failed
    #[error("Write failed: {source}")]
    Write { source: rusqlite::Error },

    /// A SELECT failed to prepare or step
    #[error("Query failed: {source}")]
    Query { source: rusqlite::Error },

    /// Caller-supplied data was rejected before reaching the store
    #[error("Invalid {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    /// Configuration error
    #[error("Configuration error: {reason}")]
    Config { reason: String },
}

/// Result type alias for triagectl-core operations
pub type Result<T> = std::result::Result<T, TriageError>;

impl TriageError {
    /// Create a storage-unavailable error for the given path
    pub fn storage_unavailable(
        path: impl Into<PathBuf>,
        source: impl Into<Box<dyn StdError + Send + Sync>>,
    ) -> Self {
        Self::StorageUnavailable {
            path: path.into(),
            source: source.into(),
        }
    }

    pub fn write(source: rusqlite::Error) -> Self {
        Self::Write { source }
    }

    pub fn query(source: rusqlite::Error) -> Self {
        Self::Query { source }
    }

    /// Create an invalid input error
    pub fn invalid_input(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Create a config error
    pub fn config(reason: impl Into<String>) -> Self {
        Self::Config {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TriageError::invalid_input("name", "must not be empty");
        assert_eq!(err.to_string(), "Invalid name: must not be empty");

        let err = TriageError::storage_unavailable(
            "/nonexistent/patients.db",
            rusqlite::Error::InvalidQuery,
        );
        assert!(err.to_string().contains("Storage unavailable"));
        assert!(err.to_string().contains("/nonexistent/patients.db"));

        let err = TriageError::storage_unavailable(
            "/nonexistent/patients.db",
            std::io::Error::new(std::io::ErrorKind::AlreadyExists, "File exists"),
        );
        assert!(err.to_string().contains("File exists"));
        assert!(err.source().is_some());
    }
}
