//! Error types for iRODS administration operations.
//!
//! Remote failures carry the server's numeric status untouched; callers consult the server's
//! status code tables to interpret it. Local problems are reported as distinct variants.

use thiserror::Error;

/// Main error type for iRODS administration operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A general admin call returned a non-zero status
    #[error("Remote call failed with status {status}")]
    RemoteCall {
        /// Status returned by the remote admin service
        status: i32,
    },

    /// Unrecoverable local problem while preparing an administration request
    #[error("User management error: {0}")]
    UserManagement(String),

    /// Catalog query failed or returned malformed rows
    #[error("Query failed: {0}")]
    Query(String),

    /// Invalid request
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Operation timed out
    #[error("Timeout waiting for iRODS: {0}")]
    Timeout(String),
}

/// Specialized result type for iRODS administration operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Returns the error code for this error type.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::RemoteCall { .. } => "REMOTE_CALL_FAILED",
            Self::UserManagement(_) => "USER_MANAGEMENT_ERROR",
            Self::Query(_) => "QUERY_ERROR",
            Self::InvalidRequest(_) => "INVALID_REQUEST",
            Self::ConfigError(_) => "CONFIG_ERROR",
            Self::ValidationError(_) => "VALIDATION_ERROR",
            Self::Timeout(_) => "TIMEOUT",
        }
    }

    /// Returns the remote status when the error came from a general admin call.
    #[must_use]
    pub const fn status(&self) -> Option<i32> {
        match self {
            Self::RemoteCall { status } => Some(*status),
            _ => None,
        }
    }

    /// Returns true if this error should be logged as a serious error.
    #[must_use]
    pub const fn should_log(&self) -> bool {
        matches!(
            self,
            Self::UserManagement(_) | Self::ConfigError(_) | Self::Query(_)
        )
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::ConfigError(err.to_string())
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::ValidationError(err.to_string())
    }
}
