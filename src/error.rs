//! Error types for sqlapi.
//!
//! Every failure in resolving, binding, executing or normalizing a call ends
//! up as an [`ApiError`]. Startup-only failures (configuration, connecting to
//! the database) share the same enum so the binary can report them uniformly.

use thiserror::Error;

/// Main error type for sqlapi operations.
#[derive(Error, Debug)]
pub enum ApiError {
    /// The requested call has no template (or its name is not a valid call).
    #[error("Not found: {0}")]
    NotFound(String),

    /// A placeholder in the template has no value in the request.
    #[error("Binding error: {0}")]
    Binding(String),

    /// The database rejected or failed the query (syntax, connectivity, pool timeout).
    #[error("Query error: {0}")]
    Execution(String),

    /// A result column holds a value with no defined string conversion.
    #[error("Unsupported column type for '{column}': {kind}")]
    UnsupportedType { column: String, kind: String },

    /// Reading the template failed for a reason other than absence.
    #[error("Internal error: {0}")]
    Internal(String),

    /// Configuration errors (invalid config file, missing database URL, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Database connection errors at startup (host unreachable, auth failed, etc.)
    #[error("Connection error: {0}")]
    Connection(String),
}

impl ApiError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn binding(msg: impl Into<String>) -> Self {
        Self::Binding(msg.into())
    }

    pub fn execution(msg: impl Into<String>) -> Self {
        Self::Execution(msg.into())
    }

    pub fn unsupported_type(column: impl Into<String>, kind: impl Into<String>) -> Self {
        Self::UnsupportedType {
            column: column.into(),
            kind: kind.into(),
        }
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Returns the error category as a string for log lines.
    pub fn category(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "Not Found",
            Self::Binding(_) => "Binding Error",
            Self::Execution(_) => "Execution Error",
            Self::UnsupportedType { .. } => "Unsupported Type",
            Self::Internal(_) => "Internal Error",
            Self::Config(_) => "Configuration Error",
            Self::Connection(_) => "Connection Error",
        }
    }
}

/// Result type alias using ApiError.
pub type Result<T> = std::result::Result<T, ApiError>;
