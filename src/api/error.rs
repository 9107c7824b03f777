//! API error types for the Zotero client.

use thiserror::Error;

use crate::storage::StorageError;

/// Errors that can occur when interacting with the Zotero API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server answered with a non-2xx status.
    ///
    /// Displayed as `"{status} {status_text}"`, e.g. `"404 Not Found"`.
    #[error("{status} {status_text}")]
    Http {
        /// The numeric HTTP status code.
        status: u16,
        /// The reason phrase sent with the status.
        status_text: String,
    },

    /// Network or HTTP error raised by reqwest.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Failure reported by a non-reqwest transport.
    #[error("Transport error: {0}")]
    Transport(String),

    /// A URL could not be built from the base URL and path.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The response body was not the JSON we expected.
    #[error("Invalid API response: {0}")]
    InvalidResponse(String),

    /// The operation needs a user id but none has been set.
    #[error("No Zotero user configured: set an API key first")]
    NotConfigured,

    /// Reading or writing durable credential storage failed.
    #[error("{0}")]
    Storage(#[from] StorageError),
}

/// Result type for API operations.
pub type Result<T> = std::result::Result<T, ApiError>;

impl ApiError {
    /// Create an error from an HTTP status code and its reason phrase.
    pub fn from_status(status: u16, status_text: &str) -> Self {
        ApiError::Http {
            status,
            status_text: status_text.to_string(),
        }
    }

    /// The HTTP status carried by this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            ApiError::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_error_display() {
        let err = ApiError::from_status(404, "Not Found");
        assert_eq!(err.to_string(), "404 Not Found");
    }

    #[test]
    fn test_http_error_display_empty_reason() {
        let err = ApiError::from_status(599, "");
        assert_eq!(err.to_string(), "599 ");
    }

    #[test]
    fn test_status_accessor() {
        assert_eq!(ApiError::from_status(403, "Forbidden").status(), Some(403));
        assert_eq!(ApiError::NotConfigured.status(), None);
        assert_eq!(ApiError::Transport("reset".to_string()).status(), None);
    }

    #[test]
    fn test_storage_error_passes_message_through() {
        let err: ApiError = StorageError::Keyring("locked".to_string()).into();
        assert_eq!(err.to_string(), "Keyring error: locked");
    }
}
