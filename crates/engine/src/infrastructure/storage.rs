//! Key-value storage adapters.

use directories::ProjectDirs;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use crate::infrastructure::ports::{StorageError, StoragePort};

/// File-backed storage.
///
/// Stores key-value pairs in a single JSON object file. The default location is:
/// - Linux: ~/.config/aistudio/storage.json
/// - macOS: ~/Library/Application Support/io.aistudio.studio/storage.json
/// - Windows: C:\Users\<User>\AppData\Roaming\aistudio\studio\config\storage.json
///
/// The whole map is cached in memory; every write rewrites the file through a
/// temporary sibling and a rename so a crash never leaves a half-written file.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    cache: RwLock<HashMap<String, String>>,
}

impl FileStorage {
    /// Open (or lazily create) the storage file at `path`.
    ///
    /// A missing file is empty storage. An unreadable or corrupt file is
    /// logged and treated as empty; it is replaced on the next write.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let cache = Self::read_map(&path);

        tracing::debug!(path = %path.display(), keys = cache.len(), "File storage initialized");

        Self {
            path,
            cache: RwLock::new(cache),
        }
    }

    /// Open the storage file in the platform config directory.
    pub fn open_default() -> Self {
        Self::open(Self::default_path())
    }

    pub fn default_path() -> PathBuf {
        match ProjectDirs::from("io", "aistudio", "studio") {
            Some(dirs) => dirs.config_dir().join("storage.json"),
            // Fallback to current directory if project dirs unavailable
            None => PathBuf::from("aistudio_storage.json"),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_map(path: &Path) -> HashMap<String, String> {
        let data = match fs::read_to_string(path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return HashMap::new(),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to read storage file");
                return HashMap::new();
            }
        };

        match serde_json::from_str::<HashMap<String, String>>(&data) {
            Ok(map) => map,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to parse storage file");
                HashMap::new()
            }
        }
    }

    fn persist(&self, map: &HashMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| StorageError::io("create_dir", e))?;
        }

        let json = serde_json::to_string_pretty(map).map_err(StorageError::serialization)?;

        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, json).map_err(|e| StorageError::io("write", e))?;
        fs::rename(&tmp_path, &self.path).map_err(|e| StorageError::io("rename", e))?;
        Ok(())
    }
}

impl StoragePort for FileStorage {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        let cache = self.cache.read().unwrap_or_else(PoisonError::into_inner);
        Ok(cache.get(key).cloned())
    }

    fn save(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        cache.insert(key.to_string(), value.to_string());
        self.persist(&cache)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        if cache.remove(key).is_none() {
            return Ok(());
        }
        self.persist(&cache)
    }
}

/// In-memory storage for tests and ephemeral runs.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-seed a key, e.g. with a payload written by an older build.
    pub fn with_entry(key: impl Into<String>, value: impl Into<String>) -> Self {
        let storage = Self::new();
        storage
            .entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.into(), value.into());
        storage
    }
}

impl StoragePort for MemoryStorage {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn save(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_empty_storage() {
        let dir = tempfile::tempdir().expect("tempdir");
        let storage = FileStorage::open(dir.path().join("storage.json"));

        assert_eq!(storage.load("ai-history").expect("load"), None);
    }

    #[test]
    fn saved_values_survive_reopen() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("storage.json");

        let storage = FileStorage::open(&path);
        storage.save("ai-history", "[]").expect("save");
        drop(storage);

        let reopened = FileStorage::open(&path);
        assert_eq!(
            reopened.load("ai-history").expect("load").as_deref(),
            Some("[]")
        );
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn corrupt_file_is_treated_as_empty_and_replaced() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("storage.json");
        fs::write(&path, "{not json").expect("write corrupt file");

        let storage = FileStorage::open(&path);
        assert_eq!(storage.load("ai-history").expect("load"), None);

        storage.save("ai-history", "[]").expect("save");
        let raw = fs::read_to_string(&path).expect("read back");
        let map: HashMap<String, String> = serde_json::from_str(&raw).expect("valid json");
        assert_eq!(map.get("ai-history").map(String::as_str), Some("[]"));
    }

    #[test]
    fn remove_deletes_key_from_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("storage.json");

        let storage = FileStorage::open(&path);
        storage.save("ai-history", "[]").expect("save");
        storage.save("other", "x").expect("save");
        storage.remove("ai-history").expect("remove");

        let reopened = FileStorage::open(&path);
        assert_eq!(reopened.load("ai-history").expect("load"), None);
        assert_eq!(reopened.load("other").expect("load").as_deref(), Some("x"));
    }

    #[test]
    fn memory_storage_round_trip() {
        let storage = MemoryStorage::with_entry("k", "v");
        assert_eq!(storage.load("k").expect("load").as_deref(), Some("v"));

        storage.save("k", "w").expect("save");
        assert_eq!(storage.load("k").expect("load").as_deref(), Some("w"));

        storage.remove("k").expect("remove");
        assert_eq!(storage.load("k").expect("load"), None);
    }
}
