//! Record subsystem
//!
//! An append-only column store persisted as one bundle file.
//!
//! # Design Principles
//!
//! - Field invariants enforced at insertion time
//! - Failed appends never partially commit
//! - Strict records have a fixed, rectangular column set
//! - Save/load is lossless for ragged and heterogeneous values
//!
//! # Usage
//!
//! ```ignore
//! use tabrec::record::{Record, Row};
//!
//! let mut record = Record::builder("/data/ecg/r1")
//!     .field("ecg")
//!     .field_with_default("qrs", Vec::<i64>::new())
//!     .build()?;
//! record.append(Row::new().with("ecg", vec![1, 2, 3]))?;
//! record.save()?;
//!
//! let mut restored = Record::open("/data/ecg/r1");
//! restored.load()?;
//! assert_eq!(restored, record);
//! ```

mod errors;
mod locked_map;
mod record;
mod rows;
mod value;

pub use errors::{RecordError, RecordResult};
pub use locked_map::KeyLockedMap;
pub use record::{Record, RecordBuilder};
pub use rows::Rows;
pub use value::{Row, Slot, Value};
