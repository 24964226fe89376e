//! Single JSON file of string values, rewritten whole on every set.

use super::KeyValueStore;
use crate::error::StorageError;
use log::{debug, warn};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

pub struct FileStore {
    path: PathBuf,
    values: Mutex<BTreeMap<String, String>>,
}

impl FileStore {
    /// Open the store at `path`. A missing file is an empty store; an
    /// unreadable or malformed one is also treated as empty and will be
    /// replaced on the next write.
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let values = if path.exists() {
            match std::fs::read_to_string(path)
                .map_err(StorageError::from)
                .and_then(|json| serde_json::from_str(&json).map_err(StorageError::from))
            {
                Ok(values) => values,
                Err(e) => {
                    warn!("[store] ignoring unreadable store {:?}: {}", path, e);
                    BTreeMap::new()
                }
            }
        } else {
            BTreeMap::new()
        };
        debug!("[store] opened {:?} with {} keys", path, values.len());
        Ok(Self {
            path: path.to_path_buf(),
            values: Mutex::new(values),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_file(&self, values: &BTreeMap<String, String>) -> Result<(), StorageError> {
        let json = serde_json::to_string_pretty(values)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let values = self
            .values
            .lock()
            .map_err(|e| std::io::Error::other(e.to_string()))?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut values = self
            .values
            .lock()
            .map_err(|e| std::io::Error::other(e.to_string()))?;
        let mut next = values.clone();
        next.insert(key.to_string(), value.to_string());
        self.write_file(&next)?;
        *values = next;
        Ok(())
    }
}
