// SPDX-License-Identifier: AGPL-3.0
// Sunshine Library Core - Persisted store
//
// All durable state lives in one local JSON document keyed by collection
// name. Every write replaces a whole collection; there is no patch
// primitive and no transaction log.

use crate::types::{CoreError, CoreResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::fs;
use std::path::PathBuf;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Top-level keys of the persisted document
pub mod keys {
    pub const SCANNED_GAMES: &str = "scannedGames";
    pub const GAMES_TO_EXPORT: &str = "gamesToExport";
    pub const SETTINGS: &str = "settings";
}

/// Durable key-value persistence
pub trait Store: Send + Sync {
    fn get(&self, key: &str) -> CoreResult<Option<Value>>;
    fn set(&self, key: &str, value: Value) -> CoreResult<()>;
}

/// Typed access on top of [`Store`]
pub trait StoreExt: Store {
    /// Read `key`, falling back to `T::default()` when it is absent
    fn load_or_default<T: DeserializeOwned + Default>(&self, key: &str) -> CoreResult<T> {
        match self.get(key)? {
            None | Some(Value::Null) => Ok(T::default()),
            Some(value) => serde_json::from_value(value)
                .map_err(|e| CoreError::Serialization(format!("Failed to parse {}: {}", key, e))),
        }
    }

    fn save<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> CoreResult<()> {
        let value = serde_json::to_value(value)
            .map_err(|e| CoreError::Serialization(format!("Failed to serialize {}: {}", key, e)))?;
        self.set(key, value)
    }
}

impl<S: Store + ?Sized> StoreExt for S {}

fn read_lock<T>(lock: &RwLock<T>) -> CoreResult<RwLockReadGuard<'_, T>> {
    lock.read()
        .map_err(|_| CoreError::StoreIo("Store lock poisoned".to_string()))
}

fn write_lock<T>(lock: &RwLock<T>) -> CoreResult<RwLockWriteGuard<'_, T>> {
    lock.write()
        .map_err(|_| CoreError::StoreIo("Store lock poisoned".to_string()))
}

/// In-memory store, for tests and dry runs
#[derive(Debug, Default)]
pub struct MemoryStore {
    document: RwLock<Map<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Store for MemoryStore {
    fn get(&self, key: &str) -> CoreResult<Option<Value>> {
        Ok(read_lock(&self.document)?.get(key).cloned())
    }

    fn set(&self, key: &str, value: Value) -> CoreResult<()> {
        write_lock(&self.document)?.insert(key.to_string(), value);
        Ok(())
    }
}

/// JSON file store with an in-memory cache, persisted to disk on changes
pub struct JsonFileStore {
    document: RwLock<Map<String, Value>>,
    file_path: PathBuf,
}

impl JsonFileStore {
    /// Open the store at the platform config location
    pub fn open_default() -> CoreResult<Self> {
        Self::open(Self::default_path()?)
    }

    /// Open the store at `file_path`, loading it if it exists.
    ///
    /// A missing file is an empty document. A file that does not parse is
    /// an error rather than a silent reset, since it holds the library.
    pub fn open(file_path: impl Into<PathBuf>) -> CoreResult<Self> {
        let file_path = file_path.into();
        tracing::info!("Store file path: {:?}", file_path);

        let document = if file_path.exists() {
            let content = fs::read_to_string(&file_path)
                .map_err(|e| CoreError::StoreIo(format!("Failed to read store: {}", e)))?;
            if content.trim().is_empty() {
                Map::new()
            } else {
                serde_json::from_str(&content).map_err(|e| {
                    CoreError::Serialization(format!("Failed to parse store: {}", e))
                })?
            }
        } else {
            tracing::info!("No store file found, starting empty");
            Map::new()
        };

        Ok(Self {
            document: RwLock::new(document),
            file_path,
        })
    }

    /// Get the path to the default store file
    pub fn default_path() -> CoreResult<PathBuf> {
        let config_dir = directories::ProjectDirs::from("dev", "sunshine", "library")
            .ok_or_else(|| CoreError::StoreIo("Could not determine config directory".to_string()))?
            .config_dir()
            .to_path_buf();

        fs::create_dir_all(&config_dir)
            .map_err(|e| CoreError::StoreIo(format!("Failed to create config dir: {}", e)))?;

        Ok(config_dir.join("config.json"))
    }

    /// Write the document next to the target, then rename it into place so
    /// a failed write never leaves a truncated file behind
    fn persist(&self, document: &Map<String, Value>) -> CoreResult<()> {
        let content = serde_json::to_string_pretty(document)
            .map_err(|e| CoreError::Serialization(format!("Failed to serialize store: {}", e)))?;

        if let Some(parent) = self.file_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .map_err(|e| CoreError::StoreIo(format!("Failed to create store dir: {}", e)))?;
            }
        }

        let tmp_path = self.file_path.with_extension("json.tmp");
        fs::write(&tmp_path, content)
            .map_err(|e| CoreError::StoreIo(format!("Failed to write store: {}", e)))?;
        fs::rename(&tmp_path, &self.file_path).map_err(|e| {
            let _ = fs::remove_file(&tmp_path);
            CoreError::StoreIo(format!("Failed to replace store: {}", e))
        })?;

        Ok(())
    }
}

impl Store for JsonFileStore {
    fn get(&self, key: &str) -> CoreResult<Option<Value>> {
        Ok(read_lock(&self.document)?.get(key).cloned())
    }

    fn set(&self, key: &str, value: Value) -> CoreResult<()> {
        let mut document = write_lock(&self.document)?;
        let previous = document.insert(key.to_string(), value);

        if let Err(err) = self.persist(&document) {
            tracing::error!("Failed to persist {}: {}", key, err);
            match previous {
                Some(previous) => document.insert(key.to_string(), previous),
                None => document.remove(key),
            };
            return Err(err);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_memory_store_defaults() {
        let store = MemoryStore::new();
        let games: Vec<String> = store.load_or_default(keys::SCANNED_GAMES).unwrap();
        assert!(games.is_empty());

        store.save(keys::SCANNED_GAMES, &vec!["a".to_string()]).unwrap();
        let games: Vec<String> = store.load_or_default(keys::SCANNED_GAMES).unwrap();
        assert_eq!(games, vec!["a"]);
    }

    #[test]
    fn test_wrong_shape_is_serialization_error() {
        let store = MemoryStore::new();
        store.set(keys::SCANNED_GAMES, json!({ "not": "a list" })).unwrap();
        let err = store.load_or_default::<Vec<String>>(keys::SCANNED_GAMES).unwrap_err();
        assert!(matches!(err, CoreError::Serialization(_)));
    }

    #[test]
    fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let store = JsonFileStore::open(&path).unwrap();
        store.set(keys::SETTINGS, json!({ "language": "fr" })).unwrap();
        assert!(path.exists());

        let reopened = JsonFileStore::open(&path).unwrap();
        assert_eq!(
            reopened.get(keys::SETTINGS).unwrap(),
            Some(json!({ "language": "fr" }))
        );
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn test_file_store_rejects_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();

        let err = JsonFileStore::open(&path).err().unwrap();
        assert!(matches!(err, CoreError::Serialization(_)));
    }

    #[test]
    fn test_failed_write_keeps_previous_value() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let store = JsonFileStore::open(&path).unwrap();
        store.set(keys::GAMES_TO_EXPORT, json!(["first"])).unwrap();

        // A directory in place of the file makes the rename fail
        fs::remove_file(&path).unwrap();
        fs::create_dir(&path).unwrap();

        let err = store.set(keys::GAMES_TO_EXPORT, json!(["second"])).unwrap_err();
        assert_eq!(err.kind(), crate::types::ErrorKind::StoreIo);
        assert_eq!(store.get(keys::GAMES_TO_EXPORT).unwrap(), Some(json!(["first"])));
    }
}
