//! CSV mirror file
//!
//! The mirror is the durable copy of the store: one file, rewritten whole
//! on every flush. Writes go to a sibling temp file which is fsynced and
//! then renamed over the mirror, so a crash mid-write leaves the previous
//! contents intact.

use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::schema::AppleRecord;

use super::codec;
use super::errors::{StorageError, StorageResult};

/// Default mirror location, relative to the working directory
pub const DEFAULT_MIRROR_PATH: &str = "data/apple_stats.csv";

/// Handle on the mirror file and its temp sibling
#[derive(Debug, Clone)]
pub struct MirrorFile {
    path: PathBuf,
    temp_path: PathBuf,
}

impl MirrorFile {
    /// Create a handle; nothing is touched on disk.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let mut temp_name = path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| OsString::from("mirror"));
        temp_name.push(".tmp");
        let temp_path = path.with_file_name(temp_name);
        Self { path, temp_path }
    }

    /// Path of the mirror file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads every record from the mirror.
    ///
    /// A missing file is an empty store, not an error.
    ///
    /// # Errors
    ///
    /// `STORAGE_READ_FAILED` if the file exists but cannot be read, and
    /// `STORAGE_MALFORMED_CSV` / `STORAGE_SCHEMA_MISMATCH` if its contents
    /// do not decode into records.
    pub fn load(&self) -> StorageResult<Vec<AppleRecord>> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "mirror file absent, starting empty");
                return Ok(Vec::new());
            }
            Err(e) => {
                return Err(StorageError::read_failed(
                    format!("failed to read mirror {}", self.path.display()),
                    e,
                ))
            }
        };

        let table = codec::decode(&text)?;
        table.require_columns()?;
        table.rows().iter().map(codec::FlatRow::to_record).collect()
    }

    /// Replaces the mirror contents with `records`.
    ///
    /// Uses the atomic write pattern:
    /// 1. Write to temp file
    /// 2. fsync temp file
    /// 3. Rename temp over the mirror
    pub fn write<'a, I>(&self, records: I) -> StorageResult<()>
    where
        I: IntoIterator<Item = &'a AppleRecord>,
    {
        let text = codec::encode(records)?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                StorageError::io_error(
                    format!("failed to create mirror directory {}", parent.display()),
                    e,
                )
            })?;
        }

        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&self.temp_path)
            .map_err(|e| {
                StorageError::write_failed(
                    format!("failed to create {}", self.temp_path.display()),
                    e,
                )
            })?;

        file.write_all(text.as_bytes()).map_err(|e| {
            StorageError::write_failed(format!("failed to write {}", self.temp_path.display()), e)
        })?;

        file.sync_all().map_err(|e| {
            StorageError::write_failed(format!("failed to fsync {}", self.temp_path.display()), e)
        })?;

        fs::rename(&self.temp_path, &self.path).map_err(|e| {
            StorageError::write_failed(
                format!("failed to replace mirror {}", self.path.display()),
                e,
            )
        })?;

        // fsync the directory so the rename survives a crash
        if let Some(parent) = self.path.parent() {
            if let Ok(dir) = File::open(parent) {
                let _ = dir.sync_all();
            }
        }

        debug!(path = %self.path.display(), bytes = text.len(), "mirror written");
        Ok(())
    }
}
