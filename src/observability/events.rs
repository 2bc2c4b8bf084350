//! Observable lifecycle events
//!
//! Events are explicit and typed; the string form is what lands in the
//! `event` key of a log line.

use std::fmt;

/// Observable events for records and datasets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Configuration
    /// Store configuration loaded from a file
    ConfigLoaded,

    // Record persistence
    /// Record columns written to a bundle
    RecordSaved,
    /// Record columns restored from a bundle
    RecordLoaded,
    /// Bundle write failed
    RecordSaveFailed,
    /// Bundle read failed
    RecordLoadFailed,

    // Dataset
    /// Subdirectory scan finished
    DatasetDiscovered,
    /// A subdirectory did not open as a record and was skipped
    DatasetDiscoverySkipped,
    /// No manifest file found while opening a dataset
    DatasetManifestMissing,
    /// Manifest written
    DatasetSaved,
    /// Manifest and all records loaded
    DatasetLoaded,
}

impl Event {
    /// Returns the event name used in log lines
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::RecordSaved => "RECORD_SAVED",
            Event::RecordLoaded => "RECORD_LOADED",
            Event::RecordSaveFailed => "RECORD_SAVE_FAILED",
            Event::RecordLoadFailed => "RECORD_LOAD_FAILED",
            Event::DatasetDiscovered => "DATASET_DISCOVERED",
            Event::DatasetDiscoverySkipped => "DATASET_DISCOVERY_SKIPPED",
            Event::DatasetManifestMissing => "DATASET_MANIFEST_MISSING",
            Event::DatasetSaved => "DATASET_SAVED",
            Event::DatasetLoaded => "DATASET_LOADED",
        }
    }

    /// Whether the event reports a failure that was surfaced to the caller
    pub fn is_failure(&self) -> bool {
        matches!(self, Event::RecordSaveFailed | Event::RecordLoadFailed)
    }

    /// Whether the event reports a failure that was recovered locally
    pub fn is_recovered(&self) -> bool {
        matches!(
            self,
            Event::DatasetDiscoverySkipped | Event::DatasetManifestMissing
        )
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
