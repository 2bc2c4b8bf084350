//! Dataset: records under a common root plus shared metadata
//!
//! Layout:
//!
//! ```text
//! root/
//! ├── npz_manifest.json      (metadata, optional until `load`)
//! ├── r1/record.trb
//! └── r2/record.trb
//! ```
//!
//! Discovery runs once, at `open`, and is lenient: a subdirectory that does
//! not hold a readable bundle is logged and skipped. `load` is strict: a
//! missing manifest is an error.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde_json::Value as JsonValue;

use super::errors::{DatasetError, DatasetResult};
use super::manifest::{read_manifest, write_manifest, Metadata};
use crate::config::{StoreConfig, MANIFEST_FILE_NAME};
use crate::observability::{log_event_with_fields, Event};
use crate::record::Record;

/// A collection of records and a metadata sidecar.
#[derive(Debug, Clone)]
pub struct Dataset {
    root: PathBuf,
    records: Vec<Record>,
    metadata: Metadata,
    config: StoreConfig,
}

impl Dataset {
    /// Opens the dataset at `root` with the default configuration.
    pub fn open(root: impl Into<PathBuf>) -> DatasetResult<Self> {
        Self::open_with_config(root, StoreConfig::default())
    }

    /// Opens the dataset at `root`, discovering one record per subdirectory.
    ///
    /// A missing root yields an empty dataset. Records are ordered by
    /// subdirectory name. Record columns are not loaded; call `load`.
    ///
    /// # Errors
    ///
    /// - `Io` if the root exists but cannot be listed
    /// - `Manifest` if a manifest exists but is malformed
    pub fn open_with_config(root: impl Into<PathBuf>, config: StoreConfig) -> DatasetResult<Self> {
        let root = root.into();
        let records = discover(&root, &config)?;

        let manifest_path = root.join(MANIFEST_FILE_NAME);
        let metadata = match read_manifest(&manifest_path) {
            Ok(metadata) => metadata,
            Err(DatasetError::MetadataFileMissing(_)) => {
                log_event_with_fields(
                    Event::DatasetManifestMissing,
                    &[("path", &manifest_path.display().to_string())],
                );
                Metadata::new()
            }
            Err(e) => return Err(e),
        };

        Ok(Self {
            root,
            records,
            metadata,
            config,
        })
    }

    /// Builds a dataset from in-memory records, with empty metadata.
    pub fn from_records(root: impl Into<PathBuf>, records: Vec<Record>) -> Self {
        Self {
            root: root.into(),
            records,
            metadata: Metadata::new(),
            config: StoreConfig::default(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Path of the manifest file
    pub fn manifest_path(&self) -> PathBuf {
        self.root.join(MANIFEST_FILE_NAME)
    }

    /// Total rows across all records
    pub fn len(&self) -> usize {
        self.records.iter().map(Record::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn meta(&self, key: &str) -> Option<&JsonValue> {
        self.metadata.get(key)
    }

    /// Inserts a metadata entry.
    ///
    /// # Errors
    ///
    /// `DuplicateMetaKey` if `key` is present; the stored value is kept.
    pub fn add_meta(&mut self, key: impl Into<String>, value: impl Into<JsonValue>) -> DatasetResult<()> {
        let key = key.into();
        if self.metadata.contains_key(&key) {
            return Err(DatasetError::DuplicateMetaKey(key));
        }
        self.metadata.insert(key, value.into());
        Ok(())
    }

    /// Writes the manifest, then saves every record. Stops at the first failure.
    pub fn save(&self) -> DatasetResult<()> {
        write_manifest(&self.manifest_path(), &self.metadata)?;
        for record in &self.records {
            record.save()?;
        }

        log_event_with_fields(
            Event::DatasetSaved,
            &[
                ("root", &self.root.display().to_string()),
                ("records", &self.records.len().to_string()),
                ("rows", &self.len().to_string()),
            ],
        );
        Ok(())
    }

    /// Reads the manifest, then loads every record. Stops at the first failure.
    ///
    /// # Errors
    ///
    /// `MetadataFileMissing` if there is no manifest.
    pub fn load(&mut self) -> DatasetResult<()> {
        self.metadata = read_manifest(&self.manifest_path())?;
        for record in &mut self.records {
            record.load()?;
        }

        log_event_with_fields(
            Event::DatasetLoaded,
            &[
                ("root", &self.root.display().to_string()),
                ("records", &self.records.len().to_string()),
                ("rows", &self.len().to_string()),
            ],
        );
        Ok(())
    }
}

/// Same number of records, and records equal index by index.
/// Metadata is not compared.
impl PartialEq for Dataset {
    fn eq(&self, other: &Self) -> bool {
        self.records.len() == other.records.len()
            && self.records.iter().zip(&other.records).all(|(a, b)| a == b)
    }
}

/// Probes each immediate subdirectory of `root` as a record.
fn discover(root: &Path, config: &StoreConfig) -> DatasetResult<Vec<Record>> {
    let entries = match fs::read_dir(root) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(DatasetError::io(root, e)),
    };

    let mut subdirs: Vec<PathBuf> = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| DatasetError::io(root, e))?;
        let is_dir = entry
            .file_type()
            .map_err(|e| DatasetError::io(entry.path(), e))?
            .is_dir();
        if is_dir {
            subdirs.push(entry.path());
        }
    }
    subdirs.sort();

    let mut records = Vec::with_capacity(subdirs.len());
    for subdir in subdirs {
        match Record::probe(subdir.join(&config.record_stem), config) {
            Ok(record) => records.push(record),
            Err(e) => log_event_with_fields(
                Event::DatasetDiscoverySkipped,
                &[
                    ("path", &subdir.display().to_string()),
                    ("error", &e.to_string()),
                ],
            ),
        }
    }

    log_event_with_fields(
        Event::DatasetDiscovered,
        &[
            ("root", &root.display().to_string()),
            ("records", &records.len().to_string()),
        ],
    );
    Ok(records)
}
