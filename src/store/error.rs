//! Storage error types.

use std::path::PathBuf;

/// Input rejected before it reaches the database.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    /// Question is empty after normalization.
    #[error("Question must not be empty")]
    EmptyQuestion,

    /// Answer is empty after normalization.
    #[error("Answer must not be empty")]
    EmptyAnswer,
}

/// Errors that can occur during store operations.
#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    /// Failed to open or create database.
    #[error("Failed to open database at {path}: {source}")]
    DatabaseOpen {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Failed to execute SQL.
    #[error("Database query failed: {0}")]
    Query(#[from] rusqlite::Error),

    /// Entry failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Blocking task was cancelled.
    #[error("Blocking task cancelled")]
    TaskCancelled,

    /// Failed to create parent directory.
    #[error("Failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_open_display() {
        let err = StoreError::DatabaseOpen {
            path: PathBuf::from("/tmp/knowledge.db"),
            source: rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error::new(1),
                Some("test".to_string()),
            ),
        };
        assert!(err.to_string().contains("Failed to open database"));
        assert!(err.to_string().contains("/tmp/knowledge.db"));
    }

    #[test]
    fn test_validation_is_transparent() {
        let err = StoreError::from(ValidationError::EmptyAnswer);
        assert_eq!(err.to_string(), "Answer must not be empty");
    }

    #[test]
    fn test_task_cancelled_display() {
        assert_eq!(StoreError::TaskCancelled.to_string(), "Blocking task cancelled");
    }

    #[test]
    fn test_create_dir_display() {
        let err = StoreError::CreateDir {
            path: PathBuf::from("/root/knowledge"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(err.to_string().contains("Failed to create directory"));
        assert!(err.to_string().contains("/root/knowledge"));
    }
}
