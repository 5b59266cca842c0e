use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error as ThisError;
use tracing::warn;

use crate::store::{Store, StringEntry};

/// A point-in-time copy of the whole key space: the string map and the list
/// map as sequences of pairs, plus the moment the copy was taken.
#[derive(Debug, Serialize, Deserialize)]
pub struct Snapshot {
    pub strings: Vec<(String, StringEntry)>,
    pub lists: Vec<(String, Vec<String>)>,
    pub timestamp: u64,
}

#[derive(Debug, ThisError)]
pub enum PersistenceError {
    #[error("snapshot io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("snapshot serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Snapshot persistence for a [`Store`]: `save` captures a consistent copy
/// and writes it to disk, `load` replaces the key space from a previous
/// save. Cloneable so the periodic saver, the command boundary, and the
/// shutdown path can each hold a handle.
#[derive(Clone)]
pub struct Rdb {
    path: Arc<PathBuf>,
}

impl Rdb {
    pub fn new(path: impl Into<PathBuf>) -> Rdb {
        Rdb {
            path: Arc::new(path.into()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Capture the store's key space and write it out.
    ///
    /// The copy is taken under the store's lock; serialization and file I/O
    /// happen after it is released. The bytes go to a temporary file that is
    /// synced and then renamed over the previous snapshot, so a failed save
    /// never corrupts the last good one.
    pub fn save(&self, store: &Store) -> Result<(), PersistenceError> {
        let snapshot = store.lock().export();
        let bytes = serde_json::to_vec(&snapshot)?;

        let tmp = self.path.with_extension("tmp");
        let mut file = File::create(&tmp)?;
        file.write_all(&bytes)?;
        file.sync_all()?;
        fs::rename(&tmp, self.path.as_ref())?;
        Ok(())
    }

    /// Replace the store's key space from the snapshot file, if there is one.
    ///
    /// A missing or empty file means "no data" and is not an error. A file
    /// that does not parse is logged and likewise treated as no data: the
    /// server always starts, at worst empty.
    pub fn load(&self, store: &Store) -> Result<bool, PersistenceError> {
        let bytes = match fs::read(self.path.as_ref()) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(false),
            Err(err) => return Err(err.into()),
        };
        if bytes.is_empty() {
            return Ok(false);
        }

        let snapshot: Snapshot = match serde_json::from_slice(&bytes) {
            Ok(snapshot) => snapshot,
            Err(err) => {
                warn!("Ignoring unreadable snapshot {:?}: {}", self.path, err);
                return Ok(false);
            }
        };

        store.lock().restore(snapshot);
        Ok(true)
    }
}
