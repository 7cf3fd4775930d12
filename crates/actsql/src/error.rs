//! Error types for actsql

use thiserror::Error;

/// Result type alias for builder and driver operations
pub type DbResult<T> = Result<T, DbError>;

/// Errors surfaced by the builder or the driver collaborator
#[derive(Debug, Error)]
pub enum DbError {
    /// Malformed clause input or a missing mandatory parameter.
    ///
    /// Raised before any driver interaction; never retried.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The driver rejected the statement (syntax error, constraint
    /// violation, connection loss).
    ///
    /// Passed through as the driver reports it; this layer performs no
    /// retry and no SQL-level recovery.
    #[error("Driver error: {0}")]
    Driver(String),
}

impl DbError {
    /// Create an invalid-argument error
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Create a driver error
    pub fn driver(message: impl Into<String>) -> Self {
        Self::Driver(message.into())
    }

    /// Check if this is an invalid-argument error
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument(_))
    }

    /// Check if this is a driver error
    pub fn is_driver(&self) -> bool {
        matches!(self, Self::Driver(_))
    }
}
