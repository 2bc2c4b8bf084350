//! Dataset subsystem
//!
//! Groups records stored in the subdirectories of one root and keeps a
//! JSON metadata manifest next to them.
//!
//! # Invariants
//!
//! - Discovery never fails on a single bad subdirectory
//! - Metadata keys are write-once through `add_meta`
//! - `save` writes the manifest before any record
//! - `load` requires the manifest

mod dataset;
mod errors;
mod manifest;

pub use dataset::Dataset;
pub use errors::{DatasetError, DatasetResult};
pub use manifest::{read_manifest, write_manifest, Metadata};
