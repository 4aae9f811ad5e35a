//! Error types for vstamp
//!
//! The rewrite engine itself never fails; these errors come from the
//! surrounding glue: building schemas, loading configuration and looking up
//! registered models. We use `thiserror` for `Display` and `Error`.

use crate::path::PathParseError;
use std::io;
use thiserror::Error;

/// Result type alias for vstamp operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for vstamp
#[derive(Debug, Error)]
pub enum Error {
    /// A field path could not be parsed
    #[error("Invalid path: {0}")]
    InvalidPath(#[from] PathParseError),

    /// A schema definition is malformed
    #[error("Invalid schema: {0}")]
    InvalidSchema(String),

    /// The same field path was declared twice
    #[error("Duplicate field: {0}")]
    DuplicateField(String),

    /// Configuration could not be read or failed validation
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// No schema was registered under the given model name
    #[error("Unknown model: {0}")]
    UnknownModel(String),

    /// An operation name the hook layer does not intercept
    #[error("Unknown operation: {0}")]
    UnknownOperation(String),

    /// I/O error while reading or writing configuration
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    /// Create an [`Error::InvalidSchema`]
    pub fn invalid_schema(message: impl Into<String>) -> Self {
        Error::InvalidSchema(message.into())
    }

    /// Create an [`Error::InvalidConfig`]
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Error::InvalidConfig(message.into())
    }
}
