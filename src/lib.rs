//! A client for the Zotero Web API.
//!
//! The [`ZoteroClient`] searches personal and group libraries, follows
//! `Link` pagination and formats citations. Credentials live in a
//! caller-owned [`Session`] backed by a durable [`storage::KeyValueStore`].
//!
//! ```no_run
//! use zotero_client::{Session, Settings, ZoteroClient};
//! use zotero_client::storage::MemoryStore;
//!
//! # async fn run() -> Result<(), zotero_client::ApiError> {
//! let client = ZoteroClient::new(&Settings::default())?;
//! let mut session = Session::new(MemoryStore::new());
//!
//! if !session.has_settings()? {
//!     client.login(&mut session, "my-api-key").await?;
//! }
//!
//! let page = client.items(&session, "climate").await?;
//! for item in &page.items {
//!     println!("{}", item);
//! }
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod logging;
pub mod session;
pub mod storage;

pub use api::{ApiError, Item, LoginOutcome, Page, ZoteroClient};
pub use config::Settings;
pub use error::AppError;
pub use session::Session;
