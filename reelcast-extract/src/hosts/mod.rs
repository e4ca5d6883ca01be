//! Host extractor implementations.
//!
//! Each extractor turns one embed URL of its host into playable video
//! candidates. Parsing lives in pure functions over the fetched text so it
//! can be tested against fixed payloads; the async `extract` wrappers only
//! add the network round trips.

use async_trait::async_trait;
use reelcast_core::{HttpTransport, RequestHeaders, VideoCandidate};

use crate::errors::ExtractionError;

pub mod amazon;
pub mod dailymotion;
pub mod direct;
pub mod fireload;
pub mod marker;
pub mod okru;
pub mod sendvid;
pub mod streamtape;

pub use amazon::AmazonExtractor;
pub use dailymotion::DailymotionExtractor;
pub use direct::DirectExtractor;
pub use fireload::FireLoadExtractor;
pub use marker::{MarkerExtractor, RefererPolicy};
pub use okru::OkruExtractor;
pub use sendvid::SendvidExtractor;
pub use streamtape::StreamTapeExtractor;

/// Per-dispatch settings handed to an extractor.
#[derive(Debug, Clone, Default)]
pub struct ExtractContext {
    /// Prepended to every label the extractor produces, e.g. "English - ".
    pub label_prefix: String,
    /// Appended in parentheses to the host name, e.g. "Dailymotion (English)".
    pub host_qualifier: Option<String>,
    /// Site headers sent with every embed request.
    pub headers: RequestHeaders,
    /// Check decoded streams on hosts that support validation.
    pub verify_stream: bool,
}

impl ExtractContext {
    /// Builds the final label for a host-specific quality tag.
    pub fn label(&self, tag: &str) -> String {
        format!("{}{}", self.label_prefix, tag)
    }

    /// Label for one rendition of a host, e.g. "Okru:720p".
    pub fn quality_label(&self, host: &str, quality: &str) -> String {
        match &self.host_qualifier {
            Some(qualifier) => self.label(&format!("{host} ({qualifier}):{quality}")),
            None => self.label(&format!("{host}:{quality}")),
        }
    }
}

/// Site-specific decoder for one third-party player host.
#[async_trait]
pub trait HostExtractor: Send + Sync + std::fmt::Debug {
    /// Short host name used in logs and default labels.
    fn name(&self) -> &str;

    /// Resolves an embed URL into zero or more candidates.
    ///
    /// # Errors
    /// - `ExtractionError::Transport` - Embed page or API request failed
    /// - `ExtractionError::MarkerMissing` - Payload lacked the expected marker
    /// - `ExtractionError::InvalidStream` - Decoded location was not a URI
    async fn extract(
        &self,
        url: &str,
        transport: &dyn HttpTransport,
        context: &ExtractContext,
    ) -> Result<Vec<VideoCandidate>, ExtractionError>;
}

/// Builds a candidate, attributing a validation failure to `host`.
pub(crate) fn candidate(
    host: &str,
    location: &str,
    label: String,
) -> Result<VideoCandidate, ExtractionError> {
    VideoCandidate::new(location, label).map_err(|e| ExtractionError::invalid_stream(host, e))
}
