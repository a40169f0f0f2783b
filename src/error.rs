//! Error types for tablekeeper.
//!
//! Every failure is classified as either [`Classification::Permanent`]
//! (invalid or unsupported declaration, never retried) or
//! [`Classification::Transient`] (database-side failure, safe to retry).
//! The dispatcher decides retry policy; this crate only classifies.

use thiserror::Error;

/// Retry classification for a [`ReconcileError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Malformed or unsupported declaration. Must not be retried.
    Permanent,
    /// Connectivity or execution-time failure. Safe to retry.
    Transient,
}

/// The main error type for reconciliation operations.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// A required spec field is absent or empty.
    #[error("spec item '{0}' is missing")]
    MissingField(&'static str),

    /// A column entry is malformed (empty name, empty type, or duplicate).
    #[error("invalid column entry: {0}")]
    InvalidColumn(String),

    /// The primary key names a column that is not declared.
    #[error("primary key column '{0}' is not declared in columns")]
    UnknownKeyColumn(String),

    /// A column type string contains characters that cannot be emitted into DDL.
    #[error("column '{column}' has unsafe type '{type_name}'")]
    UnsafeType { column: String, type_name: String },

    /// The diff would require dropping a column, which is unsupported.
    #[error("removing column '{0}' is not supported")]
    UnsupportedRemoval(String),

    /// Failed to reach the database or obtain a connection.
    #[error("connection error: {0}")]
    Connection(String),

    /// A statement failed at execution time.
    #[error("execution error: {0}")]
    Execution(String),
}

impl ReconcileError {
    /// Create an invalid-column error.
    pub fn invalid_column(message: impl Into<String>) -> Self {
        Self::InvalidColumn(message.into())
    }

    /// Classify this error for the dispatcher's retry policy.
    pub fn classification(&self) -> Classification {
        match self {
            Self::MissingField(_)
            | Self::InvalidColumn(_)
            | Self::UnknownKeyColumn(_)
            | Self::UnsafeType { .. }
            | Self::UnsupportedRemoval(_) => Classification::Permanent,
            Self::Connection(_) | Self::Execution(_) => Classification::Transient,
        }
    }

    /// True if the dispatcher may retry the event that produced this error.
    pub fn is_transient(&self) -> bool {
        self.classification() == Classification::Transient
    }
}

/// Result type alias for reconciliation operations.
pub type ReconcileResult<T> = Result<T, ReconcileError>;
