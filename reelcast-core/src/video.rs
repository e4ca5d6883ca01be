//! Video and embed candidate types
//!
//! A `VideoCandidate` is a resolved, playable stream produced by a host
//! extractor. An `EmbedCandidate` is a discovered player reference that has
//! not been resolved yet.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use url::Url;

/// Errors raised when constructing a candidate from extracted values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CandidateError {
    #[error("Stream location is empty")]
    EmptyLocation,

    #[error("Stream location '{location}' is not a valid URI: {reason}")]
    InvalidLocation { location: String, reason: String },

    #[error("Stream label is empty")]
    EmptyLabel,
}

/// A resolved stream ready to be handed to a player.
///
/// Immutable once built. `location` is always an absolute URI and `label`
/// is never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoCandidate {
    location: Url,
    label: String,
    headers: BTreeMap<String, String>,
}

impl VideoCandidate {
    /// Creates a candidate after validating location and label.
    ///
    /// # Errors
    /// - `CandidateError::EmptyLocation` - Location is blank
    /// - `CandidateError::InvalidLocation` - Location does not parse as a URI
    /// - `CandidateError::EmptyLabel` - Label is blank
    pub fn new(location: &str, label: impl Into<String>) -> Result<Self, CandidateError> {
        let location = location.trim();
        if location.is_empty() {
            return Err(CandidateError::EmptyLocation);
        }

        let label = label.into();
        if label.trim().is_empty() {
            return Err(CandidateError::EmptyLabel);
        }

        let parsed = Url::parse(location).map_err(|e| CandidateError::InvalidLocation {
            location: location.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            location: parsed,
            label,
            headers: BTreeMap::new(),
        })
    }

    /// Adds a request header required to fetch the stream.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Adds several request headers at once.
    pub fn with_headers<I, K, V>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (name, value) in headers {
            self.headers.insert(name.into(), value.into());
        }
        self
    }

    pub fn location(&self) -> &Url {
        &self.location
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    /// Checks whether the stream is an HLS/DASH manifest rather than a file.
    pub fn is_manifest(&self) -> bool {
        let path = self.location.path();
        path.ends_with(".m3u8") || path.ends_with(".mpd")
    }
}

impl std::fmt::Display for VideoCandidate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.label, self.location)
    }
}

/// A discovered, not-yet-resolved reference to a third-party player.
///
/// `context` keeps the row text the candidate was found in so the
/// allowed-language filter can run before any request is made for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedCandidate {
    pub url: String,
    pub language_tag: Option<String>,
    pub context: String,
}

impl EmbedCandidate {
    /// Creates a candidate with no surrounding text.
    pub fn new(url: impl Into<String>) -> Self {
        let url = url.into();
        Self {
            context: url.clone(),
            url,
            language_tag: None,
        }
    }

    /// Creates a candidate discovered inside a server/language row.
    pub fn from_row(url: impl Into<String>, row_text: &str) -> Self {
        let row_text = row_text.trim();
        let language_tag = row_text
            .split_whitespace()
            .next()
            .map(str::to_string);

        Self {
            url: url.into(),
            language_tag,
            context: row_text.to_string(),
        }
    }

    /// Returns the text the allowed-language filter is matched against.
    pub fn filter_text(&self) -> &str {
        &self.context
    }
}
