//! Persisted boolean flags.
//!
//! This module provides the [`FlagStore`] trait used to remember that the
//! detection routine already ran, with a JSON file implementation that
//! survives restarts and an in-memory one.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use thiserror::Error;

/// Errors reading or writing a flag store.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StoreError {
    /// The backing file could not be read or written.
    #[error("flag store I/O error at {path}: {source}")]
    Io {
        /// File being accessed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The backing file is not a JSON object of booleans.
    #[error("flag store at {path} is corrupt: {source}")]
    Parse {
        /// File being parsed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: serde_json::Error,
    },
}

/// Key-value store of booleans that outlives the process.
pub trait FlagStore: Send + Sync {
    /// Value of `key`, `false` if it was never set.
    fn get(&self, key: &str) -> Result<bool, StoreError>;

    /// Set `key` to `value`.
    fn set(&self, key: &str, value: bool) -> Result<(), StoreError>;
}

/// Flags kept in memory for the lifetime of the store.
#[derive(Debug, Default)]
pub struct MemoryFlagStore {
    flags: Mutex<BTreeMap<String, bool>>,
}

impl MemoryFlagStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl FlagStore for MemoryFlagStore {
    fn get(&self, key: &str) -> Result<bool, StoreError> {
        let flags = self.flags.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(flags.get(key).copied().unwrap_or(false))
    }

    fn set(&self, key: &str, value: bool) -> Result<(), StoreError> {
        let mut flags = self.flags.lock().unwrap_or_else(PoisonError::into_inner);
        flags.insert(key.to_string(), value);
        Ok(())
    }
}

/// Flags persisted as a JSON object in a single file.
///
/// A missing file reads as all flags unset. Writes go to a temporary file
/// that is then renamed over the original, so a crash mid-write leaves the
/// previous contents intact.
#[derive(Debug)]
pub struct FileFlagStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileFlagStore {
    /// Store flags in the file at `path`. Nothing is read or created until first use.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Location of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, bool>, StoreError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(source) => {
                return Err(StoreError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        serde_json::from_str(&content).map_err(|source| StoreError::Parse {
            path: self.path.clone(),
            source,
        })
    }

    fn save(&self, flags: &BTreeMap<String, bool>) -> Result<(), StoreError> {
        let io_err = |source: std::io::Error| StoreError::Io {
            path: self.path.clone(),
            source,
        };

        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(io_err)?;
        }

        let content = serde_json::to_string_pretty(flags).map_err(|source| StoreError::Parse {
            path: self.path.clone(),
            source,
        })?;

        let temp_path = self.path.with_extension("json.tmp");
        fs::write(&temp_path, content).map_err(io_err)?;
        fs::rename(&temp_path, &self.path).map_err(io_err)?;

        Ok(())
    }
}

impl FlagStore for FileFlagStore {
    fn get(&self, key: &str) -> Result<bool, StoreError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(self.load()?.get(key).copied().unwrap_or(false))
    }

    fn set(&self, key: &str, value: bool) -> Result<(), StoreError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut flags = self.load()?;
        flags.insert(key.to_string(), value);
        self.save(&flags)
    }
}

impl<T: FlagStore + ?Sized> FlagStore for std::sync::Arc<T> {
    fn get(&self, key: &str) -> Result<bool, StoreError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: bool) -> Result<(), StoreError> {
        (**self).set(key, value)
    }
}
