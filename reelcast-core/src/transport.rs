//! HTTP transport seam.
//!
//! Extractors, discovery and the catalog never talk to the network
//! directly. They go through `HttpTransport`, implemented over reqwest for
//! production and by `FakeTransport` in tests.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::NetworkConfig;
use crate::document::HtmlDocument;

/// Request headers keyed by header name.
pub type RequestHeaders = BTreeMap<String, String>;

/// Errors raised by a transport implementation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("Request to {url} failed: {reason}")]
    RequestFailed { url: String, reason: String },

    #[error("Request to {url} returned HTTP {status}")]
    BadStatus { url: String, status: u16 },

    #[error("Failed to decode response from {url}: {reason}")]
    DecodeFailed { url: String, reason: String },

    #[error("Transport setup failed: {reason}")]
    Setup { reason: String },
}

/// Minimal HTTP surface needed by the resolution core.
#[async_trait]
pub trait HttpTransport: Send + Sync + std::fmt::Debug {
    /// Fetches a URL and returns its body as text.
    ///
    /// # Errors
    /// - `TransportError::RequestFailed` - Connection or protocol failure
    /// - `TransportError::BadStatus` - Non-success HTTP status
    /// - `TransportError::DecodeFailed` - Body was not valid text
    async fn fetch_text(
        &self,
        url: &str,
        headers: &RequestHeaders,
    ) -> Result<String, TransportError>;

    /// Issues a request and returns only the HTTP status code.
    ///
    /// # Errors
    /// - `TransportError::RequestFailed` - Connection or protocol failure
    async fn status(&self, url: &str, headers: &RequestHeaders) -> Result<u16, TransportError>;

    /// Fetches a URL and wraps the body for selector queries.
    ///
    /// # Errors
    /// Same as `fetch_text`.
    async fn fetch_document(
        &self,
        url: &str,
        headers: &RequestHeaders,
    ) -> Result<HtmlDocument, TransportError> {
        let body = self.fetch_text(url, headers).await?;
        Ok(HtmlDocument::new(url, body))
    }

    /// Reachability check: true only for an HTTP 200 answer.
    async fn is_reachable(&self, url: &str, headers: &RequestHeaders) -> bool {
        match self.status(url, headers).await {
            Ok(status) => status == 200,
            Err(e) => {
                debug!("Reachability check of {} failed: {}", url, e);
                false
            }
        }
    }
}

/// Fetches a URL and decodes the body as JSON.
///
/// # Errors
/// - `TransportError::DecodeFailed` - Body was not the expected JSON shape
/// - Any error from `HttpTransport::fetch_text`
pub async fn fetch_json<T: DeserializeOwned>(
    transport: &dyn HttpTransport,
    url: &str,
    headers: &RequestHeaders,
) -> Result<T, TransportError> {
    let body = transport.fetch_text(url, headers).await?;
    serde_json::from_str(&body).map_err(|e| TransportError::DecodeFailed {
        url: url.to_string(),
        reason: e.to_string(),
    })
}

/// Builds a header map from name/value pairs.
pub fn headers<I, K, V>(pairs: I) -> RequestHeaders
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    pairs
        .into_iter()
        .map(|(name, value)| (name.into(), value.into()))
        .collect()
}

/// Production transport backed by a shared reqwest client.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    reachability_timeout: std::time::Duration,
}

impl ReqwestTransport {
    /// Creates a transport configured from network settings.
    ///
    /// # Errors
    /// - `TransportError::Setup` - The HTTP client could not be built
    pub fn new(config: &NetworkConfig) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| TransportError::Setup {
                reason: e.to_string(),
            })?;

        Ok(Self {
            client,
            reachability_timeout: config.reachability_timeout,
        })
    }

    fn request(&self, url: &str, headers: &RequestHeaders) -> reqwest::RequestBuilder {
        headers
            .iter()
            .fold(self.client.get(url), |request, (name, value)| {
                request.header(name.as_str(), value.as_str())
            })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn fetch_text(
        &self,
        url: &str,
        headers: &RequestHeaders,
    ) -> Result<String, TransportError> {
        debug!("GET {}", url);

        let response = self
            .request(url, headers)
            .send()
            .await
            .map_err(|e| TransportError::RequestFailed {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::BadStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response
            .text()
            .await
            .map_err(|e| TransportError::DecodeFailed {
                url: url.to_string(),
                reason: e.to_string(),
            })
    }

    async fn status(&self, url: &str, headers: &RequestHeaders) -> Result<u16, TransportError> {
        let response = self
            .request(url, headers)
            .timeout(self.reachability_timeout)
            .send()
            .await
            .map_err(|e| TransportError::RequestFailed {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        Ok(response.status().as_u16())
    }
}
