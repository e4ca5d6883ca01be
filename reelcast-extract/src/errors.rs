//! Error types for extraction and resolution.

use reelcast_core::{CandidateError, DocumentError, TransportError};
use thiserror::Error;

/// Failure of a single Host Extractor invocation.
///
/// Never crosses the pipeline boundary: the registry logs it and the
/// embed contributes zero candidates.
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// Fetching the embed page or companion API failed.
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// The payload did not contain the expected marker.
    #[error("{host}: payload marker '{marker}' not found")]
    MarkerMissing {
        /// Extractor that was parsing the payload
        host: String,
        /// Marker that was looked for
        marker: String,
    },

    /// The embed URL does not have the shape this host expects.
    #[error("{host}: unsupported embed URL {url}")]
    UnsupportedUrl {
        /// Extractor that rejected the URL
        host: String,
        /// The rejected URL
        url: String,
    },

    /// The decoded stream location was not a valid candidate.
    #[error("{host}: decoded stream is invalid: {source}")]
    InvalidStream {
        /// Extractor that decoded the stream
        host: String,
        /// Validation failure
        source: CandidateError,
    },

    /// The host answered with a JSON payload of an unexpected shape.
    #[error("{host}: malformed payload: {reason}")]
    MalformedPayload {
        /// Extractor that parsed the payload
        host: String,
        /// Decoder message
        reason: String,
    },

    /// The reachability check of the decoded stream failed.
    #[error("{host}: stream {url} is unreachable")]
    Unreachable {
        /// Extractor that checked the stream
        host: String,
        /// Checked location
        url: String,
    },
}

impl ExtractionError {
    pub(crate) fn marker_missing(host: &str, marker: &str) -> Self {
        Self::MarkerMissing {
            host: host.to_string(),
            marker: marker.to_string(),
        }
    }

    pub(crate) fn invalid_stream(host: &str, source: CandidateError) -> Self {
        Self::InvalidStream {
            host: host.to_string(),
            source,
        }
    }
}

/// Structural failure of a whole resolution call.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The episode page itself could not be fetched.
    #[error("Failed to fetch episode page: {0}")]
    PageFetch(#[from] TransportError),

    /// The discovery descriptor could not be evaluated.
    #[error("Discovery failed: {0}")]
    Discovery(#[from] DocumentError),

    /// Discovery found nothing to resolve on the page.
    #[error("No embeds found on {url}")]
    NoEmbedsFound {
        /// Page that was searched
        url: String,
    },
}
