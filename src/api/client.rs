//! Zotero API client implementation.
//!
//! This module provides the main client for the Zotero Web API v3. It builds
//! request URLs against a configurable origin, attaches the version and key
//! headers, maps non-2xx responses to errors and follows `Link` pagination.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use reqwest::Url;
use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument, warn};

use super::auth::request_headers;
use super::error::{ApiError, Result};
use super::link::{parse_link_header, REL_NEXT};
use super::transport::{HttpTransport, RawResponse, ReqwestTransport};
use super::types::{Group, Item, KeyInfo, Page};
use crate::config::Settings;
use crate::session::Session;
use crate::storage::KeyValueStore;

/// The public Zotero API origin.
pub const DEFAULT_BASE_URL: &str = "https://api.zotero.org/";

/// Result of [`ZoteroClient::login`].
#[derive(Debug)]
pub struct LoginOutcome {
    /// The user id the key resolved to.
    pub user_id: String,
    /// Outcome of the follow-up group refresh.
    pub groups: Result<Vec<String>>,
}

/// The Zotero API client.
///
/// Holds no credentials of its own; every operation takes the caller's
/// [`Session`].
#[derive(Clone)]
pub struct ZoteroClient {
    transport: Arc<dyn HttpTransport>,
    base_url: Url,
}

impl std::fmt::Debug for ZoteroClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ZoteroClient")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl ZoteroClient {
    /// Create a client from settings, using reqwest as the transport.
    pub fn new(settings: &Settings) -> Result<Self> {
        let transport = ReqwestTransport::new(Duration::from_secs(settings.timeout_secs))?;
        Self::with_transport(&settings.base_url, Arc::new(transport))
    }

    /// Create a client over an explicit transport.
    pub fn with_transport(base_url: &str, transport: Arc<dyn HttpTransport>) -> Result<Self> {
        let base_url = normalize_base_url(base_url)?;
        info!(base_url = %base_url, "Created Zotero client");
        Ok(Self {
            transport,
            base_url,
        })
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// Search the user's personal library.
    ///
    /// Calls `GET users/{userId}/items?q={search}`.
    #[instrument(skip(self, session))]
    pub async fn items<S: KeyValueStore>(
        &self,
        session: &Session<S>,
        search: &str,
    ) -> Result<Page<Item>> {
        let user_id = require_user_id(session)?;
        let url = self.build_url(&format!("users/{}/items", user_id), &[("q", search)])?;
        self.fetch_page(session, url).await
    }

    /// Search a group library.
    ///
    /// Calls `GET groups/{groupId}/items?q={search}`. No user id is needed;
    /// the key header is still sent when the session holds one.
    #[instrument(skip(self, session))]
    pub async fn groups<S: KeyValueStore>(
        &self,
        session: &Session<S>,
        search: &str,
        group_id: &str,
    ) -> Result<Page<Item>> {
        let path = format!("groups/{}/items", urlencoding::encode(group_id));
        let url = self.build_url(&path, &[("q", search)])?;
        self.fetch_page(session, url).await
    }

    /// Format items as a bibliography.
    ///
    /// Uses the group library when `group_key` is given and non-empty,
    /// otherwise the user's library. Returns the body text untouched.
    #[instrument(skip(self, session))]
    pub async fn format<S: KeyValueStore>(
        &self,
        session: &Session<S>,
        item_ids: &[&str],
        group_key: Option<&str>,
        style: &str,
        locale: &str,
    ) -> Result<String> {
        let path = match group_key.filter(|k| !k.is_empty()) {
            Some(key) => format!("groups/{}/items", urlencoding::encode(key)),
            None => format!("users/{}/items", require_user_id(session)?),
        };
        let item_keys = item_ids.join(",");
        let url = self.build_url(
            &path,
            &[
                ("format", "bib"),
                ("style", style),
                ("locale", locale),
                ("itemKey", item_keys.as_str()),
            ],
        )?;

        let response = self.get(session.api_key(), &url).await?;
        debug!(bytes = response.body.len(), "Received bibliography");
        Ok(response.body)
    }

    /// Resolve a personal API key to a user id and store the credentials.
    ///
    /// Calls `GET keys/{key}`. On success the session holds and persists the
    /// new user id and key. Groups are not fetched; call
    /// [`ZoteroClient::refresh_user_groups`] or use [`ZoteroClient::login`].
    #[instrument(skip_all)]
    pub async fn set_api_key<S: KeyValueStore>(
        &self,
        session: &mut Session<S>,
        key: &str,
    ) -> Result<bool> {
        let url = self.build_url(&format!("keys/{}", urlencoding::encode(key)), &[])?;
        let response = self.get(session.api_key(), &url).await?;
        let info: KeyInfo = decode_json(&response)?;

        session.save_credentials(&info.user_id, key)?;
        info!(user_id = %info.user_id, "API key resolved");
        Ok(true)
    }

    /// Fetch the user's group memberships and persist them.
    ///
    /// Calls `GET users/{userId}/groups`, following every page.
    #[instrument(skip_all)]
    pub async fn refresh_user_groups<S: KeyValueStore>(
        &self,
        session: &mut Session<S>,
    ) -> Result<Vec<String>> {
        let user_id = require_user_id(session)?;
        let url = self.build_url(&format!("users/{}/groups", user_id), &[])?;

        let first: Page<Group> = self.fetch_page(session, url).await?;
        let groups = self.collect_all(session, first).await?;
        let ids: Vec<String> = groups.into_iter().map(|g| g.id).collect();

        session.save_user_groups(ids.clone())?;
        info!(count = ids.len(), "Refreshed user groups");
        Ok(ids)
    }

    /// Resolve a key, then refresh groups.
    ///
    /// Fails only if the key cannot be resolved; a failed group refresh is
    /// reported in [`LoginOutcome::groups`].
    pub async fn login<S: KeyValueStore>(
        &self,
        session: &mut Session<S>,
        key: &str,
    ) -> Result<LoginOutcome> {
        self.set_api_key(session, key).await?;
        let user_id = require_user_id(session)?.to_string();

        let groups = self.refresh_user_groups(session).await;
        if let Err(e) = &groups {
            warn!("Group refresh after login failed: {}", e);
        }

        Ok(LoginOutcome { user_id, groups })
    }

    /// Fetch the page after `page`, or `None` on the last page.
    ///
    /// The request carries the same headers as the one that produced `page`.
    #[instrument(skip_all)]
    pub async fn next_page<T, S>(
        &self,
        session: &Session<S>,
        page: &Page<T>,
    ) -> Result<Option<Page<T>>>
    where
        T: DeserializeOwned,
        S: KeyValueStore,
    {
        match &page.next {
            Some(url) => self.fetch_page(session, url.clone()).await.map(Some),
            None => Ok(None),
        }
    }

    /// Follow `next` links from `first` to the last page and gather all items.
    pub async fn collect_all<T, S>(&self, session: &Session<S>, first: Page<T>) -> Result<Vec<T>>
    where
        T: DeserializeOwned,
        S: KeyValueStore,
    {
        let mut items = Vec::new();
        let mut next = first.next;
        items.extend(first.items);

        while let Some(url) = next {
            let page: Page<T> = self.fetch_page(session, url).await?;
            debug!(count = page.items.len(), "Fetched continuation page");
            items.extend(page.items);
            next = page.next;
        }

        Ok(items)
    }

    /// Run one step of the pagination protocol against `url`.
    async fn fetch_page<T, S>(&self, session: &Session<S>, url: Url) -> Result<Page<T>>
    where
        T: DeserializeOwned,
        S: KeyValueStore,
    {
        let response = self.get(session.api_key(), &url).await?;
        let items: Vec<T> = decode_json(&response)?;

        let links = self.resolve_links(parse_link_header(response.link.as_deref()));
        let next = links.get(REL_NEXT).cloned();
        debug!(count = items.len(), has_next = next.is_some(), "Fetched page");

        Ok(Page { items, links, next })
    }

    /// Perform a GET and map non-2xx statuses to errors.
    #[instrument(skip(self, api_key), fields(url = %url))]
    async fn get(&self, api_key: Option<&str>, url: &Url) -> Result<RawResponse> {
        let headers = request_headers(api_key);
        let response = self.transport.get(url, &headers).await?;

        if !response.is_success() {
            debug!(status = response.status, "Request failed");
            return Err(ApiError::from_status(response.status, &response.status_text));
        }

        Ok(response)
    }

    /// Resolve link targets against the base URL. Unparseable ones are dropped.
    fn resolve_links(&self, raw: HashMap<String, String>) -> HashMap<String, Url> {
        raw.into_iter()
            .filter_map(|(rel, target)| match self.base_url.join(&target) {
                Ok(url) => Some((rel, url)),
                Err(e) => {
                    warn!("Ignoring unparseable '{}' link {}: {}", rel, target, e);
                    None
                }
            })
            .collect()
    }

    /// Join `path` onto the base URL and append query parameters in order.
    fn build_url(&self, path: &str, query: &[(&str, &str)]) -> Result<Url> {
        let mut relative = path.to_string();
        for (i, (name, value)) in query.iter().enumerate() {
            relative.push(if i == 0 { '?' } else { '&' });
            relative.push_str(&urlencoding::encode(name));
            relative.push('=');
            relative.push_str(&urlencoding::encode(value));
        }

        self.base_url
            .join(&relative)
            .map_err(|e| ApiError::InvalidUrl(format!("{}{}: {}", self.base_url, relative, e)))
    }
}

fn require_user_id<S: KeyValueStore>(session: &Session<S>) -> Result<&str> {
    session.user_id().ok_or(ApiError::NotConfigured)
}

fn decode_json<T: DeserializeOwned>(response: &RawResponse) -> Result<T> {
    serde_json::from_str(&response.body)
        .map_err(|e| ApiError::InvalidResponse(format!("Failed to parse response: {}", e)))
}

/// Parse the base URL and make sure it ends in exactly one `/`, so relative
/// paths join underneath it instead of replacing its last segment.
fn normalize_base_url(url: &str) -> Result<Url> {
    let trimmed = url.trim().trim_end_matches('/');

    if !trimmed.starts_with("https://") && !trimmed.contains("localhost") {
        warn!("URL does not use HTTPS: {}. This is insecure for production use.", trimmed);
    }

    Url::parse(&format!("{}/", trimmed)).map_err(|e| ApiError::InvalidUrl(format!("{}: {}", url, e)))
}
