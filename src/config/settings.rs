//! Client settings.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use reqwest::Url;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{ConfigError, Result};
use crate::api::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS};
use crate::storage::StorageBackend;

/// Environment variable overriding [`Settings::base_url`].
pub const BASE_URL_ENV: &str = "ZOTERO_BASE_URL";

/// Client-wide settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// API origin. Paths such as `users/1/items` are resolved under it.
    pub base_url: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Where credentials are persisted.
    pub storage: StorageBackend,
    /// Path of the credentials file for the `file` backend.
    ///
    /// Defaults to `credentials.json` in the configuration directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_path: Option<PathBuf>,
    /// Default citation style for `cite`.
    pub style: String,
    /// Default citation locale for `cite`.
    pub locale: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            storage: StorageBackend::default(),
            storage_path: None,
            style: "apa".to_string(),
            locale: "en-US".to_string(),
        }
    }
}

impl Settings {
    /// The default configuration file location.
    ///
    /// `<config_dir>/zotero-client/config.toml`.
    pub fn default_path() -> Result<PathBuf> {
        let dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(dir.join("zotero-client").join("config.toml"))
    }

    /// Load settings from `path`, falling back to defaults if it is missing.
    ///
    /// The `ZOTERO_BASE_URL` environment variable is applied afterwards.
    pub fn load(path: &Path) -> Result<Self> {
        Self::load_with_overrides(path, None, None)
    }

    /// Load settings with every override applied, then validate once.
    ///
    /// Precedence, lowest first: file, `ZOTERO_BASE_URL`, the explicit
    /// `base_url` and `storage` arguments.
    pub fn load_with_overrides(
        path: &Path,
        base_url: Option<&str>,
        storage: Option<StorageBackend>,
    ) -> Result<Self> {
        let mut settings = Self::load_file(path)?;
        settings.apply_env();

        if let Some(base_url) = base_url {
            debug!(base_url = %base_url, "Base URL overridden by caller");
            settings.base_url = base_url.to_string();
        }
        if let Some(storage) = storage {
            settings.storage = storage;
        }

        settings.validate()?;
        Ok(settings)
    }

    /// Apply `ZOTERO_BASE_URL` if it is set and not blank.
    fn apply_env(&mut self) {
        if let Ok(base_url) = std::env::var(BASE_URL_ENV) {
            if !base_url.trim().is_empty() {
                debug!(base_url = %base_url, "Base URL overridden from environment");
                self.base_url = base_url;
            }
        }
    }

    /// Load settings from `path` without environment overrides.
    pub fn load_file(path: &Path) -> Result<Self> {
        match fs::read_to_string(path) {
            Ok(content) => {
                debug!("Loaded configuration from {:?}", path);
                Ok(toml::from_str(&content)?)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("No configuration at {:?}, using defaults", path);
                Ok(Self::default())
            }
            Err(e) => Err(ConfigError::ReadError(e)),
        }
    }

    /// Write settings to `path`, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(ConfigError::WriteError)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content).map_err(ConfigError::WriteError)
    }

    /// Validate these settings.
    ///
    /// Checks that:
    /// - The base URL parses and uses http or https
    /// - The timeout is non-zero
    /// - The style and locale are non-empty
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError::ValidationError` with details if validation fails.
    pub fn validate(&self) -> Result<()> {
        let url = Url::parse(self.base_url.trim()).map_err(|e| {
            ConfigError::ValidationError(format!("base_url '{}' is not a URL: {}", self.base_url, e))
        })?;

        if url.scheme() != "https" && url.scheme() != "http" {
            return Err(ConfigError::ValidationError(format!(
                "base_url '{}' must start with http:// or https://",
                self.base_url
            )));
        }

        if self.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "timeout_secs must be greater than zero".to_string(),
            ));
        }

        if self.style.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "style cannot be empty".to_string(),
            ));
        }

        if self.locale.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "locale cannot be empty".to_string(),
            ));
        }

        Ok(())
    }
}
