//! Reelcast Catalog - in-memory catalog aggregation for API-backed sources
//!
//! Loads the full catalog once, pages and searches it, expands each record
//! into one listing entry per playable (season, track) pair, and resolves
//! episode players into ranked video candidates.

pub mod episodes;
pub mod errors;
pub mod expander;
pub mod slug;
pub mod source;
pub mod store;
pub mod types;

// Re-export main types
pub use episodes::{EpisodeEntry, EpisodeRef, ListingRef};
pub use errors::CatalogError;
pub use expander::{ListingEntry, SeasonExpander};
pub use slug::title_to_slug;
pub use source::{CatalogSource, CatalogSourceParts};
pub use store::{CatalogLoader, CatalogStore, HttpCatalogLoader, Page};
pub use types::{CatalogOrdering, CatalogRecord, ReleaseStatus, Track};

/// Convenience type alias for Results with CatalogError.
pub type Result<T> = std::result::Result<T, CatalogError>;
