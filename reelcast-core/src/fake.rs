//! In-memory transport for tests.
//!
//! Serves canned bodies per exact URL and records every request so tests
//! can assert which hosts were (or were not) contacted.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::transport::{HttpTransport, RequestHeaders, TransportError};

#[derive(Debug, Clone)]
struct FakeResponse {
    status: u16,
    body: String,
}

/// Transport that answers from a fixed URL table.
///
/// Unknown URLs answer HTTP 404.
#[derive(Debug, Clone, Default)]
pub struct FakeTransport {
    responses: HashMap<String, FakeResponse>,
    requests: Arc<Mutex<Vec<(String, RequestHeaders)>>>,
    latency: Option<Duration>,
    in_flight: Arc<AtomicUsize>,
    peak_in_flight: Arc<AtomicUsize>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serves `body` with HTTP 200 for `url`.
    pub fn with_page(mut self, url: &str, body: impl Into<String>) -> Self {
        self.responses.insert(
            url.to_string(),
            FakeResponse {
                status: 200,
                body: body.into(),
            },
        );
        self
    }

    /// Answers `url` with an empty body and the given status.
    pub fn with_status(mut self, url: &str, status: u16) -> Self {
        self.responses.insert(
            url.to_string(),
            FakeResponse {
                status,
                body: String::new(),
            },
        );
        self
    }

    /// Delays every response, so concurrent calls overlap.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// URLs requested so far, in request order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().iter().map(|(url, _)| url.clone()).collect()
    }

    /// Headers sent with the first request to `url`.
    pub fn headers_sent_to(&self, url: &str) -> Option<RequestHeaders> {
        self.requests
            .lock()
            .iter()
            .find(|(requested, _)| requested == url)
            .map(|(_, headers)| headers.clone())
    }

    /// Checks whether any requested URL contains `fragment`.
    pub fn was_requested(&self, fragment: &str) -> bool {
        self.requests
            .lock()
            .iter()
            .any(|(url, _)| url.contains(fragment))
    }

    /// Highest number of requests observed in flight at once.
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    async fn answer(&self, url: &str, headers: &RequestHeaders) -> FakeResponse {
        self.requests.lock().push((url.to_string(), headers.clone()));

        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(current, Ordering::SeqCst);

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        self.responses.get(url).cloned().unwrap_or(FakeResponse {
            status: 404,
            body: String::new(),
        })
    }
}

#[async_trait]
impl HttpTransport for FakeTransport {
    async fn fetch_text(
        &self,
        url: &str,
        headers: &RequestHeaders,
    ) -> Result<String, TransportError> {
        let response = self.answer(url, headers).await;
        if response.status != 200 {
            return Err(TransportError::BadStatus {
                url: url.to_string(),
                status: response.status,
            });
        }
        Ok(response.body)
    }

    async fn status(&self, url: &str, headers: &RequestHeaders) -> Result<u16, TransportError> {
        Ok(self.answer(url, headers).await.status)
    }
}
