//! Reelcast Extract - embed discovery, host dispatch and stream resolution
//!
//! Turns an episode page into ranked, playable video candidates: discovery
//! descriptors find embed links, the host registry routes each link to its
//! extractor, and the resolution pipeline runs the dispatches concurrently
//! while isolating per-host failures.

pub mod discovery;
pub mod errors;
pub mod hosts;
pub mod pipeline;
pub mod profile;
pub mod registry;

// Re-export main types
pub use discovery::{EmbedDiscovery, LinkEncoding, SecondaryFetch};
pub use errors::{ExtractionError, ResolveError};
pub use hosts::{ExtractContext, HostExtractor};
pub use pipeline::ResolutionPipeline;
pub use profile::SiteProfile;
pub use registry::{HostRegistry, HostRoute};

/// Convenience type alias for Results with ResolveError.
pub type Result<T> = std::result::Result<T, ResolveError>;
