//! Dataset error types

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::record::RecordError;

/// Result type for dataset operations
pub type DatasetResult<T> = Result<T, DatasetError>;

/// Dataset errors
#[derive(Debug, Error)]
pub enum DatasetError {
    /// `load` found no manifest file
    #[error("Manifest file not found: {}", .0.display())]
    MetadataFileMissing(PathBuf),

    /// `add_meta` on a key that is already present
    #[error("Meta key already exists: {0}")]
    DuplicateMetaKey(String),

    /// Manifest exists but is not a JSON object, or cannot be serialized
    #[error("Invalid manifest {}: {message}", .path.display())]
    Manifest { path: PathBuf, message: String },

    /// Directory scan or manifest write failure
    #[error("I/O error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A contained record failed to save or load
    #[error(transparent)]
    Record(#[from] RecordError),
}

impl DatasetError {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        DatasetError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn manifest(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        DatasetError::Manifest {
            path: path.into(),
            message: message.into(),
        }
    }
}
