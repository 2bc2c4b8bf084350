//! Bundle writer
//!
//! Writes are whole-file and atomic:
//! 1. Build the payload in memory
//! 2. Write and fsync `<path>.tmp`
//! 3. Rename over the final path
//! 4. fsync the parent directory (best effort)

use std::fs::{self, File, OpenOptions};
use std::io::{self, Cursor, Write};
use std::path::{Path, PathBuf};

use tar::{Builder, EntryType, Header};

use super::checksum::compute_checksum;
use super::column::encode_column;
use super::errors::{BundleError, BundleResult};
use super::{
    validate_entry_name, BundleHeader, ENTRY_SUFFIX, FLAG_COMPRESSED, MAGIC, ZSTD_LEVEL,
};
use crate::record::Value;

/// Writes a set of named columns to one bundle file.
#[derive(Debug, Clone)]
pub struct BundleWriter {
    path: PathBuf,
    compressed: bool,
}

impl BundleWriter {
    /// Creates a writer targeting `path`; compression is on by default.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            compressed: true,
        }
    }

    /// Enables or disables payload compression.
    pub fn compressed(mut self, compressed: bool) -> Self {
        self.compressed = compressed;
        self
    }

    /// Returns the target path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes every column, in iteration order, as one bundle.
    ///
    /// # Errors
    ///
    /// - `TABREC_INVALID_ENTRY_NAME` if a field name cannot be stored
    /// - `TABREC_ARCHIVE_WRITE_FAILED` on any I/O failure
    pub fn write<'a, I>(&self, columns: I) -> BundleResult<BundleHeader>
    where
        I: IntoIterator<Item = (&'a str, &'a [Value])>,
    {
        let archive = build_archive(columns)?;

        let payload = if self.compressed {
            zstd::encode_all(Cursor::new(archive.as_slice()), ZSTD_LEVEL)
                .map_err(|e| BundleError::write_failed("Failed to compress bundle payload", e))?
        } else {
            archive
        };

        let header = BundleHeader {
            compressed: self.compressed,
            payload_len: payload.len() as u64,
        };

        let mut bytes = Vec::with_capacity(BundleHeader::SIZE + payload.len() + 4);
        bytes.extend_from_slice(&MAGIC);
        bytes.push(if self.compressed { FLAG_COMPRESSED } else { 0 });
        bytes.extend_from_slice(&header.payload_len.to_le_bytes());
        bytes.extend_from_slice(&payload);
        bytes.extend_from_slice(&compute_checksum(&payload).to_le_bytes());

        write_file_atomic(&self.path, &bytes).map_err(|e| {
            BundleError::write_failed(
                format!("Failed to write bundle: {}", self.path.display()),
                e,
            )
        })?;

        Ok(header)
    }
}

/// Packs columns into an in-memory tar archive, one `<field>.col` entry each.
fn build_archive<'a, I>(columns: I) -> BundleResult<Vec<u8>>
where
    I: IntoIterator<Item = (&'a str, &'a [Value])>,
{
    let mut builder = Builder::new(Vec::new());

    for (name, values) in columns {
        validate_entry_name(name)?;
        let data = encode_column(values);

        let mut header = Header::new_gnu();
        header.set_entry_type(EntryType::Regular);
        header.set_size(data.len() as u64);
        header.set_mode(0o644);
        // Fixed mtime keeps bundles byte-identical for identical columns.
        header.set_mtime(0);

        builder
            .append_data(&mut header, format!("{}{}", name, ENTRY_SUFFIX), data.as_slice())
            .map_err(|e| {
                BundleError::write_failed(format!("Failed to add column to bundle: {}", name), e)
            })?;
    }

    builder
        .into_inner()
        .map_err(|e| BundleError::write_failed("Failed to finish bundle archive", e))
}

/// Writes `bytes` to `path` through a temp file and rename.
///
/// Creates missing parent directories.
pub(crate) fn write_file_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let mut temp_name = path.as_os_str().to_owned();
    temp_name.push(".tmp");
    let temp_path = PathBuf::from(temp_name);

    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&temp_path)?;
    file.write_all(bytes)?;
    file.sync_all()?;

    if let Err(e) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(e);
    }

    if let Some(parent) = path.parent() {
        if let Ok(dir) = File::open(parent) {
            let _ = dir.sync_all();
        }
    }

    Ok(())
}
