//! `LocalStorage` backends.

use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::sync::Mutex;

use openvibe_core::error::{OpenVibeError, Result};
use openvibe_core::storage::LocalStorage;

use super::atomic_json::AtomicJsonFile;

type Items = BTreeMap<String, String>;

/// Stores every key in one JSON object file.
///
/// Each write is a locked read-modify-write followed by an atomic rename, so
/// two windows writing different keys never lose each other's updates.
pub struct FileLocalStorage {
    file: AtomicJsonFile<Items>,
}

impl FileLocalStorage {
    pub fn new(path: PathBuf) -> Self {
        Self {
            file: AtomicJsonFile::new(path),
        }
    }

    /// Returns every stored key/value pair.
    pub fn items(&self) -> Result<Items> {
        Ok(self.file.load()?.unwrap_or_default())
    }
}

impl LocalStorage for FileLocalStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.items()?.remove(key))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        tracing::debug!("[LocalStorage] set {} ({} bytes)", key, value.len());
        self.file.update(Items::new(), |items| {
            items.insert(key.to_string(), value.to_string());
        })
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        if !self.file.path().exists() {
            return Ok(());
        }
        tracing::debug!("[LocalStorage] remove {}", key);
        self.file.update(Items::new(), |items| {
            items.remove(key);
        })
    }
}

/// Process-local storage for tests and ephemeral windows.
#[derive(Default)]
pub struct MemoryLocalStorage {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryLocalStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.items
            .lock()
            .map_err(|_| OpenVibeError::storage("local storage lock poisoned"))
    }
}

impl LocalStorage for MemoryLocalStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        self.lock()?.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_storage_persists_across_instances() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("local_storage.json");

        let storage = FileLocalStorage::new(path.clone());
        storage.set_item("a", "1").unwrap();
        storage.set_item("b", "2").unwrap();
        storage.remove_item("a").unwrap();

        let reopened = FileLocalStorage::new(path);
        assert_eq!(reopened.get_item("a").unwrap(), None);
        assert_eq!(reopened.get_item("b").unwrap().as_deref(), Some("2"));
    }

    #[test]
    fn test_remove_on_missing_file_is_noop() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("local_storage.json");
        let storage = FileLocalStorage::new(path.clone());
        storage.remove_item("missing").unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_memory_storage() {
        let storage = MemoryLocalStorage::new();
        assert_eq!(storage.get_item("k").unwrap(), None);
        storage.set_item("k", "v").unwrap();
        assert_eq!(storage.get_item("k").unwrap().as_deref(), Some("v"));
        storage.remove_item("k").unwrap();
        assert_eq!(storage.get_item("k").unwrap(), None);
    }
}
