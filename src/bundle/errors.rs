//! Bundle error types
//!
//! Error codes:
//! - TABREC_ARCHIVE_READ_FAILED (ERROR severity)
//! - TABREC_ARCHIVE_WRITE_FAILED (ERROR severity)
//! - TABREC_ARCHIVE_CORRUPT (ERROR severity) - checksum, magic or decoding failure
//! - TABREC_INVALID_ENTRY_NAME (ERROR severity) - field name cannot be stored

use std::fmt;
use std::io;
use std::path::Path;

/// Bundle error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BundleErrorCode {
    /// Bundle file missing or unreadable
    ArchiveReadFailed,
    /// Bundle file could not be created or written
    ArchiveWriteFailed,
    /// Bundle bytes do not decode
    ArchiveCorrupt,
    /// Field name is not a valid entry name
    InvalidEntryName,
}

impl BundleErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            BundleErrorCode::ArchiveReadFailed => "TABREC_ARCHIVE_READ_FAILED",
            BundleErrorCode::ArchiveWriteFailed => "TABREC_ARCHIVE_WRITE_FAILED",
            BundleErrorCode::ArchiveCorrupt => "TABREC_ARCHIVE_CORRUPT",
            BundleErrorCode::InvalidEntryName => "TABREC_INVALID_ENTRY_NAME",
        }
    }

    /// Whether the code belongs to the read path
    pub fn is_read_side(&self) -> bool {
        matches!(
            self,
            BundleErrorCode::ArchiveReadFailed | BundleErrorCode::ArchiveCorrupt
        )
    }
}

impl fmt::Display for BundleErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Bundle error with context
#[derive(Debug)]
pub struct BundleError {
    code: BundleErrorCode,
    message: String,
    details: Option<String>,
    source: Option<io::Error>,
}

impl BundleError {
    /// Bundle could not be read, with the path as detail
    pub fn read_failed_at(path: &Path, source: io::Error) -> Self {
        Self {
            code: BundleErrorCode::ArchiveReadFailed,
            message: "Failed to read bundle".to_string(),
            details: Some(format!("path: {}", path.display())),
            source: Some(source),
        }
    }

    /// Bundle could not be written
    pub fn write_failed(message: impl Into<String>, source: io::Error) -> Self {
        Self {
            code: BundleErrorCode::ArchiveWriteFailed,
            message: message.into(),
            details: None,
            source: Some(source),
        }
    }

    /// Bundle bytes are malformed
    pub fn corrupt(message: impl Into<String>) -> Self {
        Self {
            code: BundleErrorCode::ArchiveCorrupt,
            message: message.into(),
            details: None,
            source: None,
        }
    }

    /// Bundle bytes are malformed at a known byte offset
    pub fn corrupt_at_offset(offset: usize, reason: impl Into<String>) -> Self {
        Self {
            code: BundleErrorCode::ArchiveCorrupt,
            message: reason.into(),
            details: Some(format!("byte_offset: {}", offset)),
            source: None,
        }
    }

    /// Bundle entry failed to decode
    pub fn corrupt_entry(entry: &str, reason: impl Into<String>) -> Self {
        Self {
            code: BundleErrorCode::ArchiveCorrupt,
            message: reason.into(),
            details: Some(format!("entry: {}", entry)),
            source: None,
        }
    }

    /// Field name cannot be used as an entry name
    pub fn invalid_entry_name(name: &str) -> Self {
        Self {
            code: BundleErrorCode::InvalidEntryName,
            message: "Field name cannot be stored in a bundle".to_string(),
            details: Some(format!("field: {:?}", name)),
            source: None,
        }
    }

    /// Returns the error code
    pub fn code(&self) -> BundleErrorCode {
        self.code
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns additional error details
    pub fn details(&self) -> Option<&str> {
        self.details.as_deref()
    }

    /// Returns true when the bundle file itself does not exist
    pub fn is_not_found(&self) -> bool {
        self.source
            .as_ref()
            .map(|e| e.kind() == io::ErrorKind::NotFound)
            .unwrap_or(false)
    }
}

impl fmt::Display for BundleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[ERROR] {}: {}", self.code, self.message)?;
        if let Some(ref details) = self.details {
            write!(f, " ({})", details)?;
        }
        if let Some(ref source) = self.source {
            write!(f, " (caused by: {})", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for BundleError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(|e| e as &(dyn std::error::Error + 'static))
    }
}

/// Result type for bundle operations
pub type BundleResult<T> = Result<T, BundleError>;
