//! Authentication handling for the Zotero API.
//!
//! Zotero authenticates with a personal API key sent in the
//! `Zotero-API-Key` header. The key is resolved once to a user id and
//! then kept alongside the user's group memberships.

use std::fmt;

/// Header selecting the API version.
pub const API_VERSION_HEADER: &str = "Zotero-API-Version";

/// The API version this client speaks.
pub const API_VERSION: &str = "3";

/// Header carrying the personal API key.
pub const API_KEY_HEADER: &str = "Zotero-API-Key";

/// Credentials held in memory for the lifetime of a session.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    /// The numeric Zotero user id, as a string.
    pub user_id: Option<String>,
    /// The personal API key.
    pub api_key: Option<String>,
    /// Ids of the groups the user belongs to, in server order.
    pub user_groups: Vec<String>,
}

impl Credentials {
    /// Create credentials from a resolved user id and key.
    pub fn new(user_id: &str, api_key: &str) -> Self {
        Self {
            user_id: Some(user_id.to_string()),
            api_key: Some(api_key.to_string()),
            user_groups: Vec::new(),
        }
    }

    /// Whether both the user id and API key are present.
    pub fn is_configured(&self) -> bool {
        self.user_id.is_some() && self.api_key.is_some()
    }
}

// The key is a bearer secret; keep it out of logs and panics.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user_id", &self.user_id)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("user_groups", &self.user_groups)
            .finish()
    }
}

/// Build request headers.
///
/// The version header is always present; the key header only when a key is
/// known, so requests made before login go out unauthenticated.
pub fn request_headers(api_key: Option<&str>) -> Vec<(&'static str, String)> {
    let mut headers = vec![(API_VERSION_HEADER, API_VERSION.to_string())];
    if let Some(key) = api_key.filter(|k| !k.is_empty()) {
        headers.push((API_KEY_HEADER, key.to_string()));
    }
    headers
}
