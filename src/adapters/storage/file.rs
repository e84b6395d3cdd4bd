//! JSON file store
//!
//! All keys live in one JSON object. The file is rewritten on every change
//! through a temporary sibling and a rename, so a crash leaves either the old
//! or the new contents.

use super::traits::KeyValueStore;
use crate::domain::{Result, RoundsError};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    values: Mutex<Map<String, Value>>,
}

impl FileStore {
    /// Open the store at `path`, creating parent directories as needed
    ///
    /// A missing file is an empty store. A file that is not a JSON object is
    /// an error rather than being silently replaced.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                RoundsError::Storage(format!(
                    "Failed to create state directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let values = if path.exists() {
            let contents = fs::read_to_string(&path).map_err(|e| {
                RoundsError::Storage(format!("Failed to read {}: {}", path.display(), e))
            })?;
            if contents.trim().is_empty() {
                Map::new()
            } else {
                match serde_json::from_str::<Value>(&contents)? {
                    Value::Object(map) => map,
                    _ => {
                        return Err(RoundsError::Storage(format!(
                            "State file {} does not contain a JSON object",
                            path.display()
                        )))
                    }
                }
            }
        } else {
            Map::new()
        };

        tracing::debug!(path = %path.display(), keys = values.len(), "Opened state file");

        Ok(Self {
            path,
            values: Mutex::new(values),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self) -> Result<MutexGuard<'_, Map<String, Value>>> {
        self.values
            .lock()
            .map_err(|_| RoundsError::Storage("state file lock poisoned".to_string()))
    }

    fn flush(&self, values: &Map<String, Value>) -> Result<()> {
        let contents = serde_json::to_string_pretty(values)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, contents).map_err(|e| {
            RoundsError::Storage(format!("Failed to write {}: {}", tmp.display(), e))
        })?;
        fs::rename(&tmp, &self.path).map_err(|e| {
            RoundsError::Storage(format!(
                "Failed to replace {}: {}",
                self.path.display(),
                e
            ))
        })
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: Value) -> Result<()> {
        let mut values = self.lock()?;
        values.insert(key.to_string(), value);
        self.flush(&values)
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut values = self.lock()?;
        if values.remove(key).is_some() {
            self.flush(&values)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_values_survive_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("state.json");

        let store = FileStore::open(&path).unwrap();
        store.set("day", Value::from("2024-05-01")).unwrap();
        store.set("auto_date", Value::from(false)).unwrap();
        drop(store);

        let reopened = FileStore::open(&path).unwrap();
        assert_eq!(reopened.get("day").unwrap(), Some(Value::from("2024-05-01")));
        assert_eq!(reopened.get("auto_date").unwrap(), Some(Value::from(false)));
    }

    #[test]
    fn test_remove_persists() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");

        let store = FileStore::open(&path).unwrap();
        store.set("session", serde_json::json!({"username": "esude"})).unwrap();
        store.remove("session").unwrap();

        let reopened = FileStore::open(&path).unwrap();
        assert!(reopened.get("session").unwrap().is_none());
    }

    #[test]
    fn test_rejects_non_object_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, "[1, 2, 3]").unwrap();

        assert!(matches!(FileStore::open(&path), Err(RoundsError::Storage(_))));
    }
}
