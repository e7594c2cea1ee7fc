//! JSON file-based key-value storage.
//!
//! Stores each key as a separate `<key>.json` file. Writes go to a
//! temporary sibling first and are renamed into place, so a crash or a
//! concurrent reader never sees a truncated collection.

use super::KeyValueStore;
use crate::error::{StorageError, StorageResult};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Directory-backed store.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open (and create if needed) a store rooted at `dir`.
    pub fn open(dir: impl Into<PathBuf>) -> StorageResult<Self> {
        let dir = dir.into();

        fs::create_dir_all(&dir).map_err(|e| {
            StorageError::DirectoryError(format!("{}: {}", dir.display(), e))
        })?;

        debug!(dir = %dir.display(), "opened file store");
        Ok(Self { dir })
    }

    /// Root directory of this store.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Get the file path for a key.
    fn key_file(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        match fs::read_to_string(self.key_file(key)) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::ReadFailed {
                key: key.to_string(),
                reason: e.to_string(),
            }),
        }
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let file = self.key_file(key);
        let tmp = self.dir.join(format!(".{}.json.tmp", key));
        let write_failed = |e: std::io::Error| StorageError::WriteFailed {
            key: key.to_string(),
            reason: e.to_string(),
        };

        fs::write(&tmp, value).map_err(write_failed)?;
        fs::rename(&tmp, &file).map_err(write_failed)?;

        debug!(key, bytes = value.len(), "wrote key");
        Ok(())
    }

    fn contains(&self, key: &str) -> StorageResult<bool> {
        self.key_file(key)
            .try_exists()
            .map_err(|e| StorageError::ReadFailed {
                key: key.to_string(),
                reason: e.to_string(),
            })
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        match fs::remove_file(self.key_file(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::WriteFailed {
                key: key.to_string(),
                reason: e.to_string(),
            }),
        }
    }
}
