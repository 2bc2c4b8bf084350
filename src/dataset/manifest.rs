//! Dataset manifest (metadata sidecar)
//!
//! A single JSON object stored at `<root>/npz_manifest.json`. Keys are
//! strings; values are arbitrary JSON.

use std::io;
use std::path::Path;

use serde_json::{Map, Value as JsonValue};

use super::errors::{DatasetError, DatasetResult};
use crate::bundle::write_file_atomic;

/// Dataset metadata
pub type Metadata = Map<String, JsonValue>;

/// Reads the manifest at `path`.
///
/// # Errors
///
/// - `MetadataFileMissing` if the file does not exist
/// - `Manifest` if it is not a JSON object
/// - `Io` on any other read failure
pub fn read_manifest(path: &Path) -> DatasetResult<Metadata> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(DatasetError::MetadataFileMissing(path.to_path_buf()))
        }
        Err(e) => return Err(DatasetError::io(path, e)),
    };

    match serde_json::from_str::<JsonValue>(&content) {
        Ok(JsonValue::Object(map)) => Ok(map),
        Ok(other) => Err(DatasetError::manifest(
            path,
            format!("expected a JSON object, found {}", json_kind(&other)),
        )),
        Err(e) => Err(DatasetError::manifest(path, format!("invalid JSON: {}", e))),
    }
}

/// Writes the manifest as pretty-printed JSON, atomically.
pub fn write_manifest(path: &Path, metadata: &Metadata) -> DatasetResult<()> {
    let json = serde_json::to_string_pretty(metadata)
        .map_err(|e| DatasetError::manifest(path, format!("failed to serialize: {}", e)))?;
    write_file_atomic(path, json.as_bytes()).map_err(|e| DatasetError::io(path, e))
}

fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "an array",
        JsonValue::Object(_) => "an object",
    }
}
