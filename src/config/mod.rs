//! Configuration management for the Zotero client.
//!
//! This module handles loading and validating the client settings from a
//! TOML file, with environment overrides.

mod settings;

use thiserror::Error;

pub use settings::{Settings, BASE_URL_ENV};

/// Errors that can occur while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The platform configuration directory could not be determined.
    #[error("could not determine configuration directory")]
    NoConfigDir,

    /// The configuration file could not be read.
    #[error("failed to read configuration: {0}")]
    ReadError(#[source] std::io::Error),

    /// The configuration file could not be written.
    #[error("failed to write configuration: {0}")]
    WriteError(#[source] std::io::Error),

    /// The configuration file is not valid TOML for [`Settings`].
    #[error("failed to parse configuration: {0}")]
    ParseError(#[from] toml::de::Error),

    /// The settings could not be serialized.
    #[error("failed to serialize configuration: {0}")]
    SerializeError(#[from] toml::ser::Error),

    /// A value is present but not acceptable.
    #[error("invalid configuration: {0}")]
    ValidationError(String),
}

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;
