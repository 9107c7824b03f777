//! Centralized error types for the Zotero client.
//!
//! This module provides a unified error hierarchy with user-friendly error
//! messages. All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

use crate::api::ApiError;
use crate::config::ConfigError;
use crate::storage::StorageError;

/// The main application error type.
///
/// Aggregates the layer-specific errors while keeping the underlying error
/// available for logging.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration-related errors.
    #[error("{0}")]
    Config(#[from] ConfigError),

    /// API-related errors.
    #[error("{0}")]
    Api(#[from] ApiError),

    /// Credential storage errors.
    #[error("{0}")]
    Storage(#[from] StorageError),
}

impl AppError {
    /// Get a user-friendly message for display.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Config(e) => match e {
                ConfigError::NoConfigDir => {
                    "Could not find configuration directory. Please check your system settings."
                        .to_string()
                }
                ConfigError::ReadError(_) => {
                    "Could not read configuration file. Please check it is readable.".to_string()
                }
                ConfigError::WriteError(_) => {
                    "Could not save configuration. Please check file permissions.".to_string()
                }
                ConfigError::ParseError(_) => {
                    "Configuration file is invalid. Please check the file format.".to_string()
                }
                ConfigError::SerializeError(_) => {
                    "Could not save configuration. Internal error.".to_string()
                }
                ConfigError::ValidationError(msg) => format!("Configuration error: {}", msg),
            },
            AppError::Api(e) => match e {
                ApiError::Http { status: 403, .. } => {
                    "Access denied. Check that your API key is valid and has library access."
                        .to_string()
                }
                ApiError::Http { status: 404, .. } => "Zotero could not find that resource.".to_string(),
                ApiError::Http { status: 429, .. } => {
                    "Too many requests. Please wait a moment and try again.".to_string()
                }
                ApiError::Http { status, status_text } => {
                    format!("Zotero returned {} {}.", status, status_text)
                }
                ApiError::Network(_) | ApiError::Transport(_) => {
                    "Connection failed. Please check your internet connection.".to_string()
                }
                ApiError::InvalidUrl(_) => "Invalid Zotero URL in configuration.".to_string(),
                ApiError::InvalidResponse(_) => {
                    "Unexpected response from Zotero. Please try again.".to_string()
                }
                ApiError::NotConfigured => {
                    "No Zotero account is configured. Log in with your API key first.".to_string()
                }
                ApiError::Storage(_) => storage_message(),
            },
            AppError::Storage(_) => storage_message(),
        }
    }

    /// Check if this error is critical, i.e. retrying will not help until
    /// the user changes something.
    pub fn is_critical(&self) -> bool {
        matches!(
            self,
            AppError::Config(_)
                | AppError::Storage(_)
                | AppError::Api(ApiError::NotConfigured)
                | AppError::Api(ApiError::Storage(_))
                | AppError::Api(ApiError::Http { status: 403, .. })
        )
    }

    /// Process exit status for this error: `2` when the user has to act
    /// before a retry can succeed, `1` otherwise.
    pub fn exit_code(&self) -> i32 {
        if self.is_critical() {
            2
        } else {
            1
        }
    }

    /// Get a suggested action for the user.
    pub fn suggested_action(&self) -> Option<&'static str> {
        match self {
            AppError::Api(ApiError::NotConfigured) => Some("Run 'zotero login <API_KEY>'."),
            AppError::Api(ApiError::Http { status: 403, .. }) => {
                Some("Create or check your key at https://www.zotero.org/settings/keys")
            }
            AppError::Api(ApiError::Http { status: 429, .. }) => {
                Some("Wait a few seconds and try again.")
            }
            AppError::Api(ApiError::Network(_)) | AppError::Api(ApiError::Transport(_)) => {
                Some("Check your internet connection and the configured base URL.")
            }
            AppError::Storage(_) | AppError::Api(ApiError::Storage(_)) => {
                Some("Try '--store file' if no OS keyring is available.")
            }
            _ => None,
        }
    }
}

fn storage_message() -> String {
    "Could not access credential storage. Please log in again.".to_string()
}

/// Result type for application operations.
pub type Result<T> = std::result::Result<T, AppError>;
