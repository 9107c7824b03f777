//! Durable key-value storage for Zotero credentials.
//!
//! Credentials survive process restarts through three string keys. The
//! backing store is pluggable:
//! - [`KeyringStore`] keeps values in the OS keychain
//! - [`FileStore`] keeps them in a JSON file
//! - [`MemoryStore`] keeps them in process memory

mod file;
mod keychain;
mod memory;

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use self::file::FileStore;
pub use self::keychain::KeyringStore;
pub use self::memory::MemoryStore;

/// Storage key holding the resolved Zotero user id.
pub const KEY_USER_ID: &str = "zoteroUserId";

/// Storage key holding the personal API key.
pub const KEY_API_KEY: &str = "zoteroApiKey";

/// Storage key holding the `;`-joined list of group ids.
pub const KEY_USER_GROUPS: &str = "zoteroUserGroups";

/// Every key the client writes.
pub const ALL_KEYS: [&str; 3] = [KEY_USER_ID, KEY_API_KEY, KEY_USER_GROUPS];

/// Separator used when persisting the group list.
pub const GROUP_SEPARATOR: char = ';';

/// Errors raised by storage backends.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The OS keyring rejected the operation.
    #[error("Keyring error: {0}")]
    Keyring(String),

    /// The storage file could not be read or written.
    #[error("Storage IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The storage file exists but is not valid.
    #[error("Storage file is corrupt: {0}")]
    Corrupt(String),
}

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// A string key-value store that outlives the process.
pub trait KeyValueStore {
    /// Read a value. Missing keys yield `Ok(None)`.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write a value, replacing any previous one.
    fn set(&mut self, key: &str, value: &str) -> Result<()>;

    /// Remove a value. Removing a missing key is not an error.
    fn remove(&mut self, key: &str) -> Result<()>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        (**self).remove(key)
    }
}

/// Which storage backend to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// OS keychain.
    #[default]
    Keyring,
    /// JSON file in the configuration directory.
    File,
    /// Process memory only.
    Memory,
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StorageBackend::Keyring => "keyring",
            StorageBackend::File => "file",
            StorageBackend::Memory => "memory",
        };
        f.write_str(name)
    }
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "keyring" => Ok(StorageBackend::Keyring),
            "file" => Ok(StorageBackend::File),
            "memory" => Ok(StorageBackend::Memory),
            other => Err(format!(
                "unknown storage backend '{}' (expected keyring, file or memory)",
                other
            )),
        }
    }
}

/// Open the store for `backend`.
///
/// `path` only applies to the file backend; without it the file lives in the
/// platform configuration directory.
pub fn open(backend: StorageBackend, path: Option<&Path>) -> Result<Box<dyn KeyValueStore>> {
    let store: Box<dyn KeyValueStore> = match backend {
        StorageBackend::Keyring => Box::new(KeyringStore::new()),
        StorageBackend::File => match path {
            Some(path) => Box::new(FileStore::new(path)),
            None => Box::new(FileStore::in_config_dir()?),
        },
        StorageBackend::Memory => Box::new(MemoryStore::new()),
    };
    Ok(store)
}

/// Join group ids for persistence.
pub fn join_groups(groups: &[String]) -> String {
    groups.join(&GROUP_SEPARATOR.to_string())
}

/// Split a persisted group list. Empty segments are dropped.
pub fn split_groups(value: &str) -> Vec<String> {
    value
        .split(GROUP_SEPARATOR)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_and_split_groups() {
        let groups = vec!["12".to_string(), "34".to_string()];
        let joined = join_groups(&groups);
        assert_eq!(joined, "12;34");
        assert_eq!(split_groups(&joined), groups);
    }

    #[test]
    fn test_split_empty_value() {
        assert!(split_groups("").is_empty());
    }

    #[test]
    fn test_split_drops_empty_segments() {
        assert_eq!(split_groups(";5;;6;"), vec!["5", "6"]);
    }

    #[test]
    fn test_backend_from_str() {
        assert_eq!("keyring".parse(), Ok(StorageBackend::Keyring));
        assert_eq!("FILE".parse(), Ok(StorageBackend::File));
        assert_eq!("memory".parse(), Ok(StorageBackend::Memory));
        assert!("redis".parse::<StorageBackend>().is_err());
    }

    #[test]
    fn test_backend_display_round_trips() {
        for backend in [StorageBackend::Keyring, StorageBackend::File, StorageBackend::Memory] {
            assert_eq!(backend.to_string().parse(), Ok(backend));
        }
    }

    #[test]
    fn test_open_file_backend_uses_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("creds.json");

        let mut store = open(StorageBackend::File, Some(path.as_path())).unwrap();
        store.set(KEY_API_KEY, "k").unwrap();

        assert!(path.exists());
        assert_eq!(FileStore::new(&path).get(KEY_API_KEY).unwrap().as_deref(), Some("k"));
    }

    #[test]
    fn test_open_memory_backend() {
        let store = open(StorageBackend::Memory, None).unwrap();
        assert_eq!(store.get(KEY_USER_ID).unwrap(), None);
    }

    #[test]
    fn test_boxed_store_delegates() {
        let mut store: Box<dyn KeyValueStore> = Box::new(MemoryStore::new());
        store.set(KEY_USER_ID, "7").unwrap();
        assert_eq!(store.get(KEY_USER_ID).unwrap().as_deref(), Some("7"));
        store.remove(KEY_USER_ID).unwrap();
        assert_eq!(store.get(KEY_USER_ID).unwrap(), None);
    }
}
