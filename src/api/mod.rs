//! Zotero API client and types.
//!
//! This module provides the interface for communicating with the Zotero Web API v3.

mod auth;
mod client;
pub mod error;
pub mod link;
pub mod transport;
pub mod types;

pub use auth::{request_headers, Credentials, API_KEY_HEADER, API_VERSION, API_VERSION_HEADER};
pub use client::{LoginOutcome, ZoteroClient, DEFAULT_BASE_URL};
pub use error::ApiError;
pub use link::parse_link_header;
pub use transport::{HttpTransport, RawResponse, ReqwestTransport, DEFAULT_TIMEOUT_SECS};
pub use types::{Creator, Group, Item, ItemData, KeyInfo, Page};
