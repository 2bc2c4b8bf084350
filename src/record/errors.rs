//! Record error types

use thiserror::Error;

use crate::bundle::BundleError;

/// Result type for record operations
pub type RecordResult<T> = Result<T, RecordError>;

/// Record errors.
///
/// Validation variants are raised before any state is mutated.
#[derive(Debug, Error)]
pub enum RecordError {
    /// Write to a key outside a [`KeyLockedMap`](super::KeyLockedMap)'s fixed key set
    #[error("Unknown key: {0}")]
    UnknownKey(String),

    /// Strict append omitted a field that has no registered default
    #[error("No value passed for {0}, and no default value set")]
    MissingFieldNoDefault(String),

    /// Field not in the schema, or not present in the record
    #[error("Unknown field(s): {}", .0.join(", "))]
    UnknownField(Vec<String>),

    /// Field name that cannot be stored as a bundle entry
    #[error("Invalid field name: {0:?}")]
    InvalidFieldName(String),

    /// Bundle I/O or decoding failure
    #[error(transparent)]
    Bundle(#[from] BundleError),
}

impl RecordError {
    /// Shorthand for a single unknown field
    pub fn unknown_field(name: impl Into<String>) -> Self {
        RecordError::UnknownField(vec![name.into()])
    }

    /// Whether this error was raised by input validation (no I/O involved)
    pub fn is_validation(&self) -> bool {
        !matches!(self, RecordError::Bundle(_))
    }
}
