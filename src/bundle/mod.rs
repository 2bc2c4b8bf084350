//! Named-array bundle format
//!
//! A bundle persists one record: one named entry per column, each entry an
//! ordered, possibly ragged sequence of values.
//!
//! ```text
//! +--------------------+
//! | Magic "TRB1"       | 4 bytes
//! +--------------------+
//! | Flags              | u8 (bit 0: payload zstd-compressed)
//! +--------------------+
//! | Payload Length     | u64 LE
//! +--------------------+
//! | Payload            | tar archive, one `<field>.col` entry per column
//! +--------------------+
//! | Checksum           | u32 LE, CRC32 of the payload as stored
//! +--------------------+
//! ```
//!
//! Column entry layout is documented in [`column`].
//!
//! # Invariants
//!
//! - Checksum verified on every full read
//! - Writes are atomic (temp file + rename)
//! - Entry order equals column order
//! - A `dtype` entry is never a column

mod checksum;
pub mod column;
mod errors;
mod reader;
mod writer;

pub use checksum::{compute_checksum, verify_checksum};
pub use errors::{BundleError, BundleErrorCode, BundleResult};
pub use reader::BundleReader;
pub use writer::BundleWriter;

pub(crate) use writer::write_file_atomic;

/// File magic
pub const MAGIC: [u8; 4] = *b"TRB1";

/// Flag bit: payload is zstd-compressed
pub const FLAG_COMPRESSED: u8 = 0x01;

/// Suffix of column entry names inside the archive
pub const ENTRY_SUFFIX: &str = ".col";

/// Reserved entry name; never loaded as a column and never written as one
pub const DTYPE_ENTRY: &str = "dtype";

/// zstd level used when compression is on
pub const ZSTD_LEVEL: i32 = 3;

/// Fixed-size bundle header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BundleHeader {
    /// Whether the payload is zstd-compressed
    pub compressed: bool,
    /// Payload size in bytes, as stored
    pub payload_len: u64,
}

impl BundleHeader {
    /// Encoded header size: magic + flags + payload length
    pub const SIZE: usize = 4 + 1 + 8;
}

/// Checks that a field name can be stored as an entry.
///
/// Rejects empty names, `.`/`..`, path separators, NUL and the reserved
/// `dtype` name.
pub fn validate_entry_name(name: &str) -> BundleResult<()> {
    let invalid = name.is_empty()
        || name == "."
        || name == ".."
        || name == DTYPE_ENTRY
        || name.contains(['/', '\\', '\0']);
    if invalid {
        return Err(BundleError::invalid_entry_name(name));
    }
    Ok(())
}
