//! HTTP transport used by the client.
//!
//! The client only ever issues authenticated GETs, so the seam is a single
//! method. [`ReqwestTransport`] is the production implementation; tests
//! substitute a scripted one.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client, Url};
use tracing::{debug, trace};

use super::error::{ApiError, Result};

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// A response as seen by the client: status, pagination header and body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    /// Numeric HTTP status.
    pub status: u16,
    /// Reason phrase for the status.
    pub status_text: String,
    /// Value of the `Link` header, if any.
    pub link: Option<String>,
    /// The response body as text.
    pub body: String,
}

impl RawResponse {
    /// Whether the status is 2xx.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Something that can perform an HTTP GET.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Fetch `url` with the given headers.
    ///
    /// Non-2xx responses are returned as `Ok`; only transport failures are
    /// errors.
    async fn get(&self, url: &Url, headers: &[(&'static str, String)]) -> Result<RawResponse>;
}

/// Transport backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Build a transport with the given timeout.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("zotero-client/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(ApiError::Network)?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: &Url, headers: &[(&'static str, String)]) -> Result<RawResponse> {
        let mut request = self.client.get(url.clone());
        for (name, value) in headers {
            request = request.header(*name, value);
        }

        let response = request.send().await?;
        let status = response.status();
        let link = response
            .headers()
            .get(header::LINK)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        debug!(status = status.as_u16(), "Received response");
        let body = response.text().await?;
        trace!(bytes = body.len(), "Read response body");

        Ok(RawResponse {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            link,
            body,
        })
    }
}
