//! Error types for toby-core

use thiserror::Error;
use toby_domain::ValidationError;

/// Result type alias for store operations
pub type Result<T> = std::result::Result<T, StoreError>;

/// Main error type for store operations.
///
/// Missing ids and declined confirmations are not errors; see [`crate::Outcome`].
#[derive(Error, Debug)]
pub enum StoreError {
    /// User input rejected before any mutation
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Import payload rejected
    #[error("Import error: {0}")]
    Import(#[from] ImportError),

    /// Persistence read failed
    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    /// Malformed JSON outside the import path (transfer payloads, persisted values)
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Persistence-specific errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PersistenceError {
    /// IO error
    #[error("IO error: {0}")]
    Io(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Backend rejected the request
    #[error("Backend error: {0}")]
    Backend(String),
}

/// Import error type
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ImportError {
    #[error("Empty input")]
    EmptyInput,
    #[error("Parse error: {message}")]
    Parse { message: String },
    #[error("Invalid format: {message}")]
    InvalidFormat { message: String },
}

impl From<std::io::Error> for PersistenceError {
    fn from(err: std::io::Error) -> Self {
        PersistenceError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for PersistenceError {
    fn from(err: serde_json::Error) -> Self {
        PersistenceError::Serialization(err.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}
