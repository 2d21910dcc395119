//! Atomic JSON file operations.
//!
//! Writes go to a sibling temp file which is fsynced and renamed over the
//! target, so readers only ever observe a complete document. Read-modify-write
//! cycles hold an exclusive lock file for their duration.

use std::fs::{self, File, OpenOptions};
use std::io::Write as IoWrite;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use openvibe_core::error::{OpenVibeError, Result};
use serde::{Serialize, de::DeserializeOwned};

/// Handle to a JSON document stored in a single file.
pub struct AtomicJsonFile<T> {
    path: PathBuf,
    _phantom: PhantomData<T>,
}

impl<T> AtomicJsonFile<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            _phantom: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the document. A missing or blank file yields `Ok(None)`.
    pub fn load(&self) -> Result<Option<T>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(None);
        }

        Ok(Some(serde_json::from_str(&content)?))
    }

    /// Replaces the document atomically.
    pub fn save(&self, data: &T) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let json = serde_json::to_string_pretty(data)?;

        let tmp_path = self.temp_path()?;
        let mut tmp_file = File::create(&tmp_path)?;
        tmp_file.write_all(json.as_bytes())?;
        tmp_file.sync_all()?;
        drop(tmp_file);

        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }

    /// Loads (or defaults), applies `f`, and saves, under an exclusive lock.
    ///
    /// A document that no longer parses is replaced by `default_value`.
    pub fn update<F>(&self, default_value: T, f: F) -> Result<()>
    where
        F: FnOnce(&mut T),
    {
        let _lock = FileLock::acquire(&self.path)?;
        let mut data = match self.load() {
            Ok(Some(data)) => data,
            Ok(None) => default_value,
            Err(e) if e.is_serialization() => {
                tracing::warn!(
                    "[AtomicJsonFile] Replacing unreadable {}: {}",
                    self.path.display(),
                    e
                );
                default_value
            }
            Err(e) => return Err(e),
        };
        f(&mut data);
        self.save(&data)
    }

    fn temp_path(&self) -> Result<PathBuf> {
        let parent = self
            .path
            .parent()
            .ok_or_else(|| OpenVibeError::io("Path has no parent directory"))?;
        let file_name = self
            .path
            .file_name()
            .ok_or_else(|| OpenVibeError::io("Path has no file name"))?;
        Ok(parent.join(format!(".{}.tmp", file_name.to_string_lossy())))
    }
}

/// Exclusive lock guard, released on drop.
///
/// The `.lock` file stays on disk; waiters block on that inode.
struct FileLock {
    #[allow(dead_code)]
    file: File,
}

impl FileLock {
    fn acquire(path: &Path) -> Result<Self> {
        let lock_path = path.with_extension("lock");
        if let Some(parent) = lock_path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)?;

        #[cfg(unix)]
        {
            use fs2::FileExt;
            file.lock_exclusive()
                .map_err(|e| OpenVibeError::storage(format!("Failed to acquire lock: {}", e)))?;
        }

        Ok(FileLock { file })
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        #[cfg(unix)]
        {
            use fs2::FileExt;
            let _ = self.file.unlock();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_loads_none() {
        let temp = TempDir::new().unwrap();
        let file: AtomicJsonFile<BTreeMap<String, String>> =
            AtomicJsonFile::new(temp.path().join("store.json"));
        assert!(file.load().unwrap().is_none());
    }

    #[test]
    fn test_update_creates_parent_and_leaves_no_temp_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("store.json");
        let file: AtomicJsonFile<BTreeMap<String, String>> = AtomicJsonFile::new(path.clone());

        file.update(BTreeMap::new(), |data| {
            data.insert("a".into(), "1".into());
        })
        .unwrap();

        let loaded = file.load().unwrap().unwrap();
        assert_eq!(loaded.get("a").map(String::as_str), Some("1"));
        assert!(!temp.path().join("nested").join(".store.json.tmp").exists());
        assert!(temp.path().join("nested").join("store.lock").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_concurrent_updates_are_not_lost() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("store.json");

        let writers: Vec<_> = (0..8)
            .map(|_| {
                let path = path.clone();
                std::thread::spawn(move || {
                    let file: AtomicJsonFile<BTreeMap<String, u64>> = AtomicJsonFile::new(path);
                    for _ in 0..25 {
                        file.update(BTreeMap::new(), |data| {
                            *data.entry("count".into()).or_insert(0) += 1;
                        })
                        .unwrap();
                    }
                })
            })
            .collect();
        for writer in writers {
            writer.join().unwrap();
        }

        let file: AtomicJsonFile<BTreeMap<String, u64>> = AtomicJsonFile::new(path);
        assert_eq!(file.load().unwrap().unwrap().get("count"), Some(&200));
    }

    #[test]
    fn test_corrupt_file_is_a_serialization_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("store.json");
        fs::write(&path, "{oops").unwrap();
        let file: AtomicJsonFile<BTreeMap<String, String>> = AtomicJsonFile::new(path);
        assert!(file.load().unwrap_err().is_serialization());

        file.update(BTreeMap::new(), |data| {
            data.insert("k".into(), "v".into());
        })
        .unwrap();
        assert_eq!(file.load().unwrap().unwrap().len(), 1);
    }
}
