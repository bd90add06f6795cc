//! Error types for the redshift-maint library.
//!
//! Uses hierarchical domain-specific errors following the thiserror pattern.

use thiserror::Error;

/// Result type alias for redshift-maint operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Maintenance dispatch error
    #[error("Maintenance error: {0}")]
    Maintenance(#[from] MaintenanceError),

    /// Connection-level error outside of a maintenance dispatch
    #[error("Connection error: {0}")]
    Connection(#[from] BackendError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Tracing subscriber could not be installed
    #[error("Telemetry error: {0}")]
    Telemetry(String),
}

/// Why a maintenance operation was refused before reaching the warehouse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnsupportedReason {
    /// The connection does not report the maintenance capability
    MissingCapability,
    /// The table identifier is empty or whitespace only
    BlankTableIdentifier,
}

impl std::fmt::Display for UnsupportedReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnsupportedReason::MissingCapability => {
                write!(f, "connection does not support maintenance operations")
            }
            UnsupportedReason::BlankTableIdentifier => write!(f, "table identifier is blank"),
        }
    }
}

/// Errors returned by the maintenance dispatcher.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MaintenanceError {
    /// Operation refused locally; nothing was sent to the connection
    #[error("Maintenance operation unsupported: {reason}")]
    Unsupported { reason: UnsupportedReason },

    /// The connection failed to execute the command
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    /// Existence pre-check found no such table
    #[error("Table not found: {0}")]
    TableNotFound(String),
}

impl MaintenanceError {
    /// Shorthand for an `Unsupported` error.
    pub fn unsupported(reason: UnsupportedReason) -> Self {
        MaintenanceError::Unsupported { reason }
    }

    /// Whether the dispatcher considers this error worth retrying.
    ///
    /// Always `false`: VACUUM and ANALYZE are expensive and a retry needs
    /// the caller's consent.
    pub fn is_retryable(&self) -> bool {
        false
    }
}

/// Failures reported by a [`MaintenanceConnection`](crate::connection::MaintenanceConnection).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BackendError {
    /// The user lacks the privilege to maintain the table
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// The table is locked or otherwise busy
    #[error("Object in use: {0}")]
    ObjectInUse(String),

    /// The table does not exist
    #[error("Object not found: {0}")]
    ObjectNotFound(String),

    /// Timed out before the server answered
    #[error("Timeout: {0}")]
    Timeout(String),

    /// Statement cancelled by the server or the client
    #[error("Cancelled: {0}")]
    Cancelled(String),

    /// Connection closed or network failure
    #[error("Transport error: {0}")]
    Transport(String),

    /// Any other server error, keyed by SQLSTATE
    #[error("Database error [{code}]: {message}")]
    Database { code: String, message: String },
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}
