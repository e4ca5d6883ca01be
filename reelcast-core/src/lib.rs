//! Reelcast Core - shared building blocks for video stream resolution
//!
//! Value types for resolved streams and discovered embeds, the HTTP
//! transport seam, HTML document queries, text marker helpers, user
//! preferences with ranking, configuration and tracing setup.

pub mod config;
pub mod document;
pub mod markers;
pub mod preferences;
pub mod ranking;
pub mod tracing_setup;
pub mod transport;
pub mod video;

#[cfg(any(test, feature = "test-utils"))]
pub mod fake;

// Re-export main types for convenient access
pub use config::{CatalogConfig, NetworkConfig, ReelcastConfig, ResolutionConfig, StatusToken};
pub use document::{DocumentError, ElementSnapshot, HtmlDocument};
pub use preferences::{PreferenceConfig, PreferenceSource, StaticPreferences};
pub use ranking::{PreferenceRanker, RankingStrategy};
pub use transport::{HttpTransport, RequestHeaders, ReqwestTransport, TransportError, fetch_json};
pub use video::{CandidateError, EmbedCandidate, VideoCandidate};

/// Errors that can bubble up from the shared core.
#[derive(Debug, thiserror::Error)]
pub enum ReelcastError {
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Candidate error: {0}")]
    Candidate(#[from] CandidateError),

    #[error("Document error: {0}")]
    Document(#[from] DocumentError),

    #[error("Configuration error: {reason}")]
    Configuration { reason: String },
}

impl ReelcastError {
    /// Returns a user-friendly error message suitable for display.
    pub fn user_message(&self) -> String {
        match self {
            ReelcastError::Transport(e) => match e {
                TransportError::BadStatus { url, status } => {
                    format!("{url} answered with HTTP {status}")
                }
                TransportError::RequestFailed { url, .. } => format!("Could not reach {url}"),
                _ => "Network error occurred".to_string(),
            },
            ReelcastError::Candidate(e) => format!("Invalid video location: {e}"),
            ReelcastError::Document(_) => "Page could not be queried".to_string(),
            ReelcastError::Configuration { reason } => format!("Configuration error: {reason}"),
        }
    }

    /// Checks if this error is due to user input validation.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            ReelcastError::Configuration { .. } | ReelcastError::Document(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, ReelcastError>;
