//! Caller-owned credential session.
//!
//! A [`Session`] pairs the in-memory [`Credentials`] with the durable store
//! they are persisted to. Every client operation borrows a session, and
//! anything that changes credentials needs `&mut Session`, so a credential
//! swap can never interleave with a request that is still using the old ones.

use tracing::{debug, info};

use crate::api::Credentials;
use crate::storage::{
    self, KeyValueStore, StorageError, ALL_KEYS, KEY_API_KEY, KEY_USER_GROUPS, KEY_USER_ID,
};

/// Credentials plus the store that persists them.
#[derive(Debug)]
pub struct Session<S> {
    store: S,
    credentials: Credentials,
}

impl<S: KeyValueStore> Session<S> {
    /// Create an empty session over `store`.
    ///
    /// Nothing is read from the store until [`Session::has_settings`] runs.
    pub fn new(store: S) -> Self {
        Self {
            store,
            credentials: Credentials::default(),
        }
    }

    /// The in-memory credentials.
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// The resolved user id, if any.
    pub fn user_id(&self) -> Option<&str> {
        self.credentials.user_id.as_deref()
    }

    /// The API key, if any.
    pub fn api_key(&self) -> Option<&str> {
        self.credentials.api_key.as_deref()
    }

    /// Cached group ids. Never touches the network.
    pub fn user_groups(&self) -> &[String] {
        &self.credentials.user_groups
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Restore credentials from durable storage.
    ///
    /// Returns `true` when both the user id and the API key are stored, in
    /// which case they become the in-memory credentials. The group list is
    /// restored whenever it is present.
    pub fn has_settings(&mut self) -> Result<bool, StorageError> {
        let user_id = non_empty(self.store.get(KEY_USER_ID)?);
        let api_key = non_empty(self.store.get(KEY_API_KEY)?);

        if let Some(groups) = self.store.get(KEY_USER_GROUPS)? {
            self.credentials.user_groups = storage::split_groups(&groups);
        }

        match (user_id, api_key) {
            (Some(user_id), Some(api_key)) => {
                debug!(user_id = %user_id, "Restored stored credentials");
                self.credentials.user_id = Some(user_id);
                self.credentials.api_key = Some(api_key);
                Ok(true)
            }
            _ => {
                debug!("No stored credentials");
                Ok(false)
            }
        }
    }

    /// Remove stored credentials and reset memory.
    pub fn clear_settings(&mut self) -> Result<(), StorageError> {
        for key in ALL_KEYS {
            self.store.remove(key)?;
        }
        self.credentials = Credentials::default();
        info!("Cleared Zotero credentials");
        Ok(())
    }

    /// Persist and then adopt a resolved user id and key.
    ///
    /// Memory is only updated once every store write succeeded. The cached
    /// group list is reset, since it belonged to the old user.
    pub(crate) fn save_credentials(
        &mut self,
        user_id: &str,
        api_key: &str,
    ) -> Result<(), StorageError> {
        self.store.set(KEY_USER_ID, user_id)?;
        self.store.set(KEY_API_KEY, api_key)?;
        self.store.remove(KEY_USER_GROUPS)?;
        self.credentials = Credentials::new(user_id, api_key);
        Ok(())
    }

    /// Replace and persist the group list.
    pub(crate) fn save_user_groups(&mut self, groups: Vec<String>) -> Result<(), StorageError> {
        self.store
            .set(KEY_USER_GROUPS, &storage::join_groups(&groups))?;
        self.credentials.user_groups = groups;
        Ok(())
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::testing::FailingStore;
    use crate::storage::MemoryStore;

    fn store_with(pairs: &[(&str, &str)]) -> MemoryStore {
        let mut store = MemoryStore::new();
        for (k, v) in pairs {
            store.set(k, v).unwrap();
        }
        store
    }

    #[test]
    fn test_new_session_is_empty() {
        let session = Session::new(MemoryStore::new());
        assert_eq!(session.user_id(), None);
        assert_eq!(session.api_key(), None);
        assert!(session.user_groups().is_empty());
    }

    #[test]
    fn test_has_settings_restores_state() {
        let store = store_with(&[
            (KEY_USER_ID, "42"),
            (KEY_API_KEY, "key"),
            (KEY_USER_GROUPS, "1;2;3"),
        ]);
        let mut session = Session::new(store);

        assert!(session.has_settings().unwrap());
        assert_eq!(session.user_id(), Some("42"));
        assert_eq!(session.api_key(), Some("key"));
        assert_eq!(session.user_groups(), ["1", "2", "3"]);
    }

    #[test]
    fn test_has_settings_false_without_key() {
        let mut session = Session::new(store_with(&[(KEY_USER_ID, "42")]));
        assert!(!session.has_settings().unwrap());
        assert_eq!(session.user_id(), None);
    }

    #[test]
    fn test_has_settings_false_without_user_id() {
        let mut session = Session::new(store_with(&[(KEY_API_KEY, "key")]));
        assert!(!session.has_settings().unwrap());
        assert_eq!(session.api_key(), None);
    }

    #[test]
    fn test_has_settings_false_on_empty_store() {
        let mut session = Session::new(MemoryStore::new());
        assert!(!session.has_settings().unwrap());
    }

    #[test]
    fn test_has_settings_without_groups() {
        let store = store_with(&[(KEY_USER_ID, "42"), (KEY_API_KEY, "key")]);
        let mut session = Session::new(store);
        assert!(session.has_settings().unwrap());
        assert!(session.user_groups().is_empty());
    }

    #[test]
    fn test_clear_settings() {
        let store = store_with(&[
            (KEY_USER_ID, "42"),
            (KEY_API_KEY, "key"),
            (KEY_USER_GROUPS, "1;2"),
        ]);
        let mut session = Session::new(store);
        assert!(session.has_settings().unwrap());

        session.clear_settings().unwrap();

        assert!(session.store().is_empty());
        assert!(session.user_groups().is_empty());
        assert_eq!(session.user_id(), None);
        assert!(!session.has_settings().unwrap());
        assert!(session.user_groups().is_empty());
    }

    #[test]
    fn test_save_credentials_persists() {
        let mut session = Session::new(MemoryStore::new());
        session.save_user_groups(vec!["9".to_string()]).unwrap();
        session.save_credentials("42", "key").unwrap();

        assert_eq!(session.user_id(), Some("42"));
        assert!(session.user_groups().is_empty());
        assert_eq!(session.store().get(KEY_USER_ID).unwrap().as_deref(), Some("42"));
        assert_eq!(session.store().get(KEY_API_KEY).unwrap().as_deref(), Some("key"));
        assert_eq!(session.store().get(KEY_USER_GROUPS).unwrap(), None);
    }

    #[test]
    fn test_save_user_groups_persists_joined() {
        let mut session = Session::new(MemoryStore::new());
        session
            .save_user_groups(vec!["10".to_string(), "20".to_string()])
            .unwrap();
        assert_eq!(session.user_groups(), ["10", "20"]);
        assert_eq!(
            session.store().get(KEY_USER_GROUPS).unwrap().as_deref(),
            Some("10;20")
        );
    }

    #[test]
    fn test_failed_save_keeps_previous_credentials() {
        let store = FailingStore::with_values(&[(KEY_USER_ID, "1"), (KEY_API_KEY, "old")]);
        let mut session = Session::new(store);
        assert!(session.has_settings().unwrap());

        let err = session.save_credentials("42", "new").unwrap_err();

        assert!(matches!(err, StorageError::Keyring(_)));
        assert_eq!(session.user_id(), Some("1"));
        assert_eq!(session.api_key(), Some("old"));
    }
}
