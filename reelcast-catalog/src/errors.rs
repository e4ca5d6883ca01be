//! Error types for catalog operations.

use thiserror::Error;

/// Errors surfaced by the catalog store and source.
///
/// A missing slug is a definite failure of the caller's reference, unlike
/// an episode that resolves to no videos, which is a valid empty result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("Catalog load failed: {reason}")]
    LoadFailed { reason: String },

    #[error("No catalog entry with slug '{slug}'")]
    SlugNotFound { slug: String },

    #[error("'{slug}' has no season {season}")]
    SeasonOutOfRange { slug: String, season: usize },

    #[error("'{slug}' season {season} has no episode {episode}")]
    EpisodeOutOfRange {
        slug: String,
        season: usize,
        episode: usize,
    },

    #[error("Malformed catalog reference '{reference}': {reason}")]
    MalformedReference { reference: String, reason: String },
}

impl CatalogError {
    pub(crate) fn malformed(reference: &str, reason: impl Into<String>) -> Self {
        Self::MalformedReference {
            reference: reference.to_string(),
            reason: reason.into(),
        }
    }
}
