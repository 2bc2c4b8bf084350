//! tabrec - append-only tabular records persisted as named-array bundles
//!
//! - `record`: schema-aware or schema-free column store with save/load
//! - `dataset`: records under one root plus a JSON metadata manifest
//! - `bundle`: the on-disk bundle format

pub mod bundle;
pub mod cli;
pub mod config;
pub mod dataset;
pub mod observability;
pub mod record;

pub use config::StoreConfig;
pub use dataset::{Dataset, DatasetError, DatasetResult};
pub use record::{KeyLockedMap, Record, RecordError, RecordResult, Row, Slot, Value};
