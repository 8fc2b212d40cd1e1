//! Durable key-value storage for session data.
//!
//! Writes are synchronous: when `set` or `remove` returns, the value is
//! durable (for [`FileStorage`]) and the operation that triggered the write
//! can report completion.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, RwLock};

use crate::auth::error::StorageError;

/// Storage keys used for the persisted session.
pub mod keys {
    /// The bearer credential.
    pub const CREDENTIAL: &str = "token";
    /// The refresh credential.
    pub const REFRESH_CREDENTIAL: &str = "refresh_token";
    /// The serialized identity record.
    pub const IDENTITY: &str = "user";
}

/// A durable key-value store with get/set/remove semantics.
pub trait SessionStorage: Send + Sync + fmt::Debug {
    /// Reads a value.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the backing store cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Writes a value, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the write does not complete.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Removes a value. Removing a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the removal does not complete.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// In-process storage; contents are lost when the process exits.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RwLock<BTreeMap<String, String>>,
}

impl MemoryStorage {
    /// Creates empty storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates storage pre-populated with the given entries.
    #[must_use]
    pub fn with_entries<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: RwLock::new(
                entries
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }
}

impl SessionStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self.entries.read().map_err(|_| StorageError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.write().map_err(|_| StorageError::Poisoned)?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.write().map_err(|_| StorageError::Poisoned)?;
        entries.remove(key);
        Ok(())
    }
}

/// Storage backed by a single JSON object file.
///
/// The whole file is rewritten on every write. A missing file reads as empty.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStorage {
    /// Creates storage at the given file path. The file is created on first write.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Returns the backing file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, String>, StorageError> {
        match fs::read_to_string(&self.path) {
            Ok(text) if text.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(text) => Ok(serde_json::from_str(&text)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let text = serde_json::to_string_pretty(entries)?;
        fs::write(&self.path, text)?;
        Ok(())
    }

    fn update(
        &self,
        apply: impl FnOnce(&mut BTreeMap<String, String>),
    ) -> Result<(), StorageError> {
        let _guard = self.lock.lock().map_err(|_| StorageError::Poisoned)?;
        let mut entries = self.load()?;
        apply(&mut entries);
        self.save(&entries)
    }
}

impl SessionStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let _guard = self.lock.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(self.load()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.update(|entries| {
            entries.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.update(|entries| {
            entries.remove(key);
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        let unique: u64 = rand::random();
        std::env::temp_dir().join(format!("storefront-session-{name}-{unique:x}.json"))
    }

    #[test]
    fn test_memory_storage_get_set_remove() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.get(keys::CREDENTIAL).unwrap(), None);

        storage.set(keys::CREDENTIAL, "tok123").unwrap();
        assert_eq!(storage.get(keys::CREDENTIAL).unwrap(), Some("tok123".to_string()));

        storage.remove(keys::CREDENTIAL).unwrap();
        assert_eq!(storage.get(keys::CREDENTIAL).unwrap(), None);

        // Removing again is fine
        storage.remove(keys::CREDENTIAL).unwrap();
    }

    #[test]
    fn test_memory_storage_with_entries() {
        let storage = MemoryStorage::with_entries([(keys::CREDENTIAL, "a"), (keys::IDENTITY, "b")]);
        assert_eq!(storage.get(keys::IDENTITY).unwrap(), Some("b".to_string()));
    }

    #[test]
    fn test_file_storage_persists_across_instances() {
        let path = temp_path("persist");

        let first = FileStorage::new(&path);
        first.set(keys::CREDENTIAL, "tok123").unwrap();
        first.set(keys::REFRESH_CREDENTIAL, "ref456").unwrap();

        let second = FileStorage::new(&path);
        assert_eq!(second.get(keys::CREDENTIAL).unwrap(), Some("tok123".to_string()));

        second.remove(keys::CREDENTIAL).unwrap();
        assert_eq!(first.get(keys::CREDENTIAL).unwrap(), None);
        assert_eq!(first.get(keys::REFRESH_CREDENTIAL).unwrap(), Some("ref456".to_string()));

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_file_storage_missing_file_reads_empty() {
        let storage = FileStorage::new(temp_path("missing"));
        assert_eq!(storage.get(keys::IDENTITY).unwrap(), None);
    }

    #[test]
    fn test_file_storage_reports_corrupt_file() {
        let path = temp_path("corrupt");
        fs::write(&path, "{not json").unwrap();

        let storage = FileStorage::new(&path);
        assert!(matches!(
            storage.get(keys::CREDENTIAL),
            Err(StorageError::Serialization(_))
        ));

        let _ = fs::remove_file(&path);
    }
}
