//! JSON file backed key-value store.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tracing::{debug, info};

use super::KeyValueStore;
use crate::error::Result;

// == Json File Store ==
/// Keeps the whole map in memory and rewrites one JSON file on every
/// mutation.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    entries: Map<String, Value>,
}

impl JsonFileStore {
    /// Opens the store at `path`. A missing file is an empty store; a file
    /// that is not a JSON object is an error.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let entries = match fs::read(&path) {
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(error) if error.kind() == ErrorKind::NotFound => Map::new(),
            Err(error) => return Err(error.into()),
        };

        info!(path = %path.display(), keys = entries.len(), "opened store");
        Ok(Self { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn restore(&mut self, key: &str, previous: Option<Value>) {
        match previous {
            Some(value) => self.entries.insert(key.to_string(), value),
            None => self.entries.remove(key),
        };
    }

    fn flush(&self) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        // Replace the file atomically.
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(&self.entries)?)?;
        fs::rename(&tmp, &self.path)?;
        debug!(path = %self.path.display(), "store flushed");
        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.entries.get(key).cloned())
    }

    /// On a failed write the in-memory map is restored, so it never holds
    /// data the file does not.
    fn set(&mut self, key: &str, value: Value) -> Result<()> {
        let previous = self.entries.insert(key.to_string(), value);
        if let Err(error) = self.flush() {
            self.restore(key, previous);
            return Err(error);
        }
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        let Some(previous) = self.entries.remove(key) else {
            return Ok(());
        };
        if let Err(error) = self.flush() {
            self.restore(key, Some(previous));
            return Err(error);
        }
        Ok(())
    }
}
