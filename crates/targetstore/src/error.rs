//! Error types for targetstore.
//!
//! This module defines all error types used throughout the targetstore crate.
//! Every failing operation signals exactly one of three broad kinds: a
//! validation failure, a missing record, or a storage failure.

use std::path::PathBuf;
use thiserror::Error;

use crate::validation::ValidationErrors;

/// The main error type for targetstore operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Record Errors ===
    /// One or more fields failed validation.
    #[error("validation failed: {0}")]
    Validation(ValidationErrors),

    /// No record exists with the requested id.
    #[error("target not found: {id}")]
    NotFound {
        /// The id that was looked up.
        id: String,
    },

    // === Storage Errors ===
    /// The backing file could not be read.
    #[error("failed to read targets from {path}: {source}")]
    StorageRead {
        /// Path to the backing file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The backing file could not be written.
    #[error("failed to write targets to {path}: {source}")]
    StorageWrite {
        /// Path to the backing file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// A row in the backing file could not be decoded.
    #[error("corrupt record in {path} at line {line}: {message}")]
    CorruptRecord {
        /// Path to the backing file.
        path: PathBuf,
        /// 1-based line number of the offending row.
        line: usize,
        /// Description of what went wrong.
        message: String,
    },

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // === Generic Errors ===
    /// An internal error occurred (bug).
    #[error("internal error: {0}")]
    Internal(String),
}

/// A specialized Result type for targetstore operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl From<ValidationErrors> for Error {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(errors)
    }
}

impl Error {
    /// Create a not-found error for the given id.
    #[must_use]
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound { id: id.into() }
    }

    /// Create a new internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Create a corrupt record error.
    #[must_use]
    pub fn corrupt_record(path: impl Into<PathBuf>, line: usize, message: impl Into<String>) -> Self {
        Self::CorruptRecord {
            path: path.into(),
            line,
            message: message.into(),
        }
    }

    /// Check if this error is a field validation failure.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Check if this error indicates a missing record.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this error came from the backing store.
    #[must_use]
    pub fn is_storage(&self) -> bool {
        matches!(
            self,
            Self::StorageRead { .. }
                | Self::StorageWrite { .. }
                | Self::CorruptRecord { .. }
                | Self::DirectoryCreate { .. }
                | Self::Io(_)
        )
    }

    /// The per-field validation messages, if this is a validation failure.
    #[must_use]
    pub fn validation_details(&self) -> Option<&ValidationErrors> {
        match self {
            Self::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::target::Field;

    fn sample_validation_errors() -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        errors.insert(Field::Latitude, "Must be between -90 and 90");
        errors
    }

    #[test]
    fn test_error_display() {
        let err = Error::not_found("abc-123");
        assert_eq!(err.to_string(), "target not found: abc-123");

        let err = Error::internal("test error");
        assert_eq!(err.to_string(), "internal error: test error");
    }

    #[test]
    fn test_validation_error_display() {
        let err = Error::Validation(sample_validation_errors());
        let msg = err.to_string();
        assert!(msg.starts_with("validation failed"));
        assert!(msg.contains("latitude"));
        assert!(msg.contains("Must be between -90 and 90"));
    }

    #[test]
    fn test_error_is_not_found() {
        assert!(Error::not_found("x").is_not_found());
        assert!(!Error::internal("x").is_not_found());
    }

    #[test]
    fn test_error_is_validation() {
        let err: Error = sample_validation_errors().into();
        assert!(err.is_validation());
        assert!(!err.is_not_found());
        assert!(!err.is_storage());
    }

    #[test]
    fn test_validation_details() {
        let err = Error::Validation(sample_validation_errors());
        let details = err.validation_details().unwrap();
        assert_eq!(
            details.get(Field::Latitude),
            Some("Must be between -90 and 90")
        );

        assert!(Error::not_found("x").validation_details().is_none());
    }

    #[test]
    fn test_storage_errors_are_storage() {
        let io_err = || std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");

        assert!(Error::StorageRead {
            path: PathBuf::from("/tmp/targets.csv"),
            source: io_err(),
        }
        .is_storage());
        assert!(Error::StorageWrite {
            path: PathBuf::from("/tmp/targets.csv"),
            source: io_err(),
        }
        .is_storage());
        assert!(Error::corrupt_record("/tmp/targets.csv", 3, "bad latitude").is_storage());
        assert!(Error::Io(io_err()).is_storage());
        assert!(!Error::not_found("x").is_storage());
    }

    #[test]
    fn test_corrupt_record_display() {
        let err = Error::corrupt_record("/data/targets.csv", 7, "invalid speed 'fast'");
        let msg = err.to_string();
        assert!(msg.contains("/data/targets.csv"));
        assert!(msg.contains("line 7"));
        assert!(msg.contains("invalid speed 'fast'"));
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_from_json_error() {
        let json_result: std::result::Result<i32, serde_json::Error> =
            serde_json::from_str("not valid json");
        if let Err(json_err) = json_result {
            let err: Error = json_err.into();
            assert!(matches!(err, Error::Json(_)));
        }
    }

    #[test]
    fn test_config_validation_error_display() {
        let err = Error::ConfigValidation {
            message: "data_path must not be empty".to_string(),
        };
        assert!(err.to_string().contains("data_path"));
    }

    #[test]
    fn test_directory_create_error_display() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err = Error::DirectoryCreate {
            path: PathBuf::from("/root/forbidden"),
            source: io_err,
        };
        let msg = err.to_string();
        assert!(msg.contains("/root/forbidden"));
    }
}
