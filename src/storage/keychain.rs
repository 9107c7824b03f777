//! OS keyring storage backend.
//!
//! Each storage key becomes one keyring entry under a shared service name,
//! so the API key never touches the filesystem in plain text.

use tracing::debug;

use super::{KeyValueStore, Result, StorageError};

/// The default keyring service name.
pub const KEYRING_SERVICE: &str = "zotero-client";

/// Storage backed by the platform keychain.
#[derive(Debug, Clone)]
pub struct KeyringStore {
    service: String,
}

impl KeyringStore {
    /// Create a store under the default service name.
    pub fn new() -> Self {
        Self::with_service(KEYRING_SERVICE)
    }

    /// Create a store under a custom service name.
    pub fn with_service(service: &str) -> Self {
        Self {
            service: service.to_string(),
        }
    }

    /// The keyring service name.
    pub fn service(&self) -> &str {
        &self.service
    }

    fn entry(&self, key: &str) -> Result<keyring::Entry> {
        keyring::Entry::new(&self.service, key)
            .map_err(|e| StorageError::Keyring(format!("failed to access keyring: {}", e)))
    }
}

impl Default for KeyringStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyValueStore for KeyringStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        match self.entry(key)?.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(StorageError::Keyring(format!(
                "failed to read '{}': {}",
                key, e
            ))),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entry(key)?
            .set_password(value)
            .map_err(|e| StorageError::Keyring(format!("failed to store '{}': {}", key, e)))?;
        debug!(service = %self.service, key, "Stored keyring entry");
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        match self.entry(key)?.delete_password() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(StorageError::Keyring(format!(
                "failed to delete '{}': {}",
                key, e
            ))),
        }
    }
}
