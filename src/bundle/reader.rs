//! Bundle reader
//!
//! Every read verifies, in order: magic, flags, payload length, checksum.
//! Only then is the payload decompressed and its entries decoded.

use std::collections::HashSet;
use std::fs::File;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};

use tar::Archive;

use super::checksum::compute_checksum;
use super::column::decode_column;
use super::errors::{BundleError, BundleResult};
use super::{BundleHeader, DTYPE_ENTRY, ENTRY_SUFFIX, FLAG_COMPRESSED, MAGIC};
use crate::record::Value;

/// A verified bundle file held in memory.
#[derive(Debug)]
pub struct BundleReader {
    path: PathBuf,
    header: BundleHeader,
    payload: Vec<u8>,
}

impl BundleReader {
    /// Reads and verifies the bundle at `path`.
    ///
    /// # Errors
    ///
    /// - `TABREC_ARCHIVE_READ_FAILED` if the file cannot be read
    /// - `TABREC_ARCHIVE_CORRUPT` if verification fails
    pub fn open(path: impl Into<PathBuf>) -> BundleResult<Self> {
        let path = path.into();
        let bytes = std::fs::read(&path).map_err(|e| BundleError::read_failed_at(&path, e))?;

        let header = parse_header(&bytes)?;
        let payload_end = (BundleHeader::SIZE as u64).saturating_add(header.payload_len);
        if payload_end.saturating_add(4) != bytes.len() as u64 {
            return Err(BundleError::corrupt_at_offset(
                bytes.len(),
                format!(
                    "Bundle size mismatch: header declares {} payload bytes, file has {}",
                    header.payload_len,
                    bytes.len()
                ),
            ));
        }
        let payload_end = payload_end as usize;

        let payload = &bytes[BundleHeader::SIZE..payload_end];
        let stored = u32::from_le_bytes([
            bytes[payload_end],
            bytes[payload_end + 1],
            bytes[payload_end + 2],
            bytes[payload_end + 3],
        ]);
        let computed = compute_checksum(payload);
        if computed != stored {
            return Err(BundleError::corrupt_at_offset(
                payload_end,
                format!(
                    "Checksum mismatch: computed {:08x}, stored {:08x}",
                    computed, stored
                ),
            ));
        }

        Ok(Self {
            header,
            payload: payload.to_vec(),
            path,
        })
    }

    /// Reads only the fixed-size header at `path`.
    ///
    /// Used to decide whether a location holds a bundle without loading it.
    pub fn probe(path: &Path) -> BundleResult<BundleHeader> {
        let mut file = File::open(path).map_err(|e| BundleError::read_failed_at(path, e))?;
        let mut buf = [0u8; BundleHeader::SIZE];
        file.read_exact(&mut buf)
            .map_err(|e| BundleError::read_failed_at(path, e))?;
        parse_header(&buf)
    }

    /// Returns the bundle path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the verified header
    pub fn header(&self) -> BundleHeader {
        self.header
    }

    /// Decodes every column entry in stored order.
    ///
    /// A `dtype` entry is skipped. Duplicate entry names are corruption.
    pub fn columns(&self) -> BundleResult<Vec<(String, Vec<Value>)>> {
        let archive_bytes = if self.header.compressed {
            zstd::decode_all(Cursor::new(self.payload.as_slice()))
                .map_err(|e| BundleError::corrupt(format!("Failed to decompress payload: {}", e)))?
        } else {
            self.payload.clone()
        };

        let archive_len = archive_bytes.len() as u64;
        let mut archive = Archive::new(Cursor::new(archive_bytes));
        let entries = archive
            .entries()
            .map_err(|e| BundleError::corrupt(format!("Unreadable bundle archive: {}", e)))?;

        let mut seen = HashSet::new();
        let mut columns = Vec::new();

        for entry in entries {
            let mut entry =
                entry.map_err(|e| BundleError::corrupt(format!("Unreadable bundle entry: {}", e)))?;

            let entry_path = entry
                .path()
                .map_err(|e| BundleError::corrupt(format!("Invalid entry path: {}", e)))?
                .to_string_lossy()
                .into_owned();

            let name = match entry_path.strip_suffix(ENTRY_SUFFIX) {
                Some(name) => name.to_string(),
                None if entry_path == DTYPE_ENTRY => continue,
                None => {
                    return Err(BundleError::corrupt_entry(
                        &entry_path,
                        "Entry is not a column",
                    ))
                }
            };
            if name == DTYPE_ENTRY {
                continue;
            }
            if !seen.insert(name.clone()) {
                return Err(BundleError::corrupt_entry(&name, "Duplicate column entry"));
            }

            // Entry sizes come from the archive itself and are untrusted.
            if entry.size() > archive_len {
                return Err(BundleError::corrupt_entry(
                    &name,
                    format!(
                        "Entry claims {} bytes, archive holds {}",
                        entry.size(),
                        archive_len
                    ),
                ));
            }
            let mut data = Vec::with_capacity(entry.size() as usize);
            entry
                .read_to_end(&mut data)
                .map_err(|e| BundleError::corrupt_entry(&name, format!("Truncated entry: {}", e)))?;

            let values = decode_column(&data)
                .map_err(|e| BundleError::corrupt_entry(&name, e.to_string()))?;
            columns.push((name, values));
        }

        Ok(columns)
    }
}

fn parse_header(bytes: &[u8]) -> BundleResult<BundleHeader> {
    if bytes.len() < BundleHeader::SIZE {
        return Err(BundleError::corrupt_at_offset(
            bytes.len(),
            "Bundle shorter than header",
        ));
    }
    if bytes[0..4] != MAGIC {
        return Err(BundleError::corrupt_at_offset(0, "Bad bundle magic"));
    }

    let flags = bytes[4];
    if flags & !FLAG_COMPRESSED != 0 {
        return Err(BundleError::corrupt_at_offset(
            4,
            format!("Unknown bundle flags: {:#04x}", flags),
        ));
    }

    let mut len_buf = [0u8; 8];
    len_buf.copy_from_slice(&bytes[5..13]);

    Ok(BundleHeader {
        compressed: flags & FLAG_COMPRESSED != 0,
        payload_len: u64::from_le_bytes(len_buf),
    })
}
