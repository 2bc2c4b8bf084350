//! Store configuration
//!
//! Loaded from a JSON file or built in code. Every field has a default, so
//! `{}` is a valid configuration.
//!
//! ```json
//! {
//!   "compressed": true,
//!   "extension": "trb",
//!   "record_stem": "record"
//! }
//! ```

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::observability::{log_event_with_fields, Event};

/// Default bundle file extension
pub const DEFAULT_EXTENSION: &str = "trb";

/// Default file stem of a record inside a dataset subdirectory
pub const DEFAULT_RECORD_STEM: &str = "record";

/// Dataset manifest file name
pub const MANIFEST_FILE_NAME: &str = "npz_manifest.json";

/// Storage configuration shared by records and datasets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Compress bundle payloads (on/off only)
    #[serde(default = "default_compressed")]
    pub compressed: bool,

    /// Bundle file extension, without the leading dot
    #[serde(default = "default_extension")]
    pub extension: String,

    /// File stem of the record stored in each dataset subdirectory
    #[serde(default = "default_record_stem")]
    pub record_stem: String,
}

fn default_compressed() -> bool {
    true
}

fn default_extension() -> String {
    DEFAULT_EXTENSION.to_string()
}

fn default_record_stem() -> String {
    DEFAULT_RECORD_STEM.to_string()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            compressed: default_compressed(),
            extension: default_extension(),
            record_stem: default_record_stem(),
        }
    }
}

impl StoreConfig {
    /// Default configuration with compression turned off.
    pub fn uncompressed() -> Self {
        Self {
            compressed: false,
            ..Self::default()
        }
    }

    /// Loads and validates a JSON configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ConfigError::new(format!("Failed to read config {}: {}", path.display(), e))
        })?;
        let config = Self::from_json(&content)?;

        log_event_with_fields(
            Event::ConfigLoaded,
            &[
                ("path", &path.display().to_string()),
                ("compressed", if config.compressed { "true" } else { "false" }),
            ],
        );
        Ok(config)
    }

    /// Parses and validates a JSON configuration string.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: StoreConfig = serde_json::from_str(json)
            .map_err(|e| ConfigError::new(format!("Invalid config JSON: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects extensions and stems that would not produce a plain file name.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_component("extension", &self.extension)?;
        check_component("record_stem", &self.record_stem)?;
        Ok(())
    }

    /// `.<extension>` suffix appended to record locations
    pub fn suffix(&self) -> String {
        format!(".{}", self.extension)
    }
}

fn check_component(field: &str, value: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::new(format!("{} must not be empty", field)));
    }
    if value.starts_with('.') {
        return Err(ConfigError::new(format!(
            "{} must not start with '.': {:?}",
            field, value
        )));
    }
    if value.contains(['/', '\\', '\0']) {
        return Err(ConfigError::new(format!(
            "{} must not contain path separators: {:?}",
            field, value
        )));
    }
    Ok(())
}

/// Configuration error
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    message: String,
}

impl ConfigError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[ERROR] TABREC_CONFIG_INVALID: {}", self.message)
    }
}

impl std::error::Error for ConfigError {}
