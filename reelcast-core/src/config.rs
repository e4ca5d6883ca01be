//! Centralized configuration for Reelcast.
//!
//! All tunable parameters and settings are defined here to avoid
//! hard-coded values scattered throughout the codebase.

use std::time::Duration;

/// Central configuration for all Reelcast components.
///
/// Groups related configuration settings into logical sections.
/// Supports environment variable overrides for runtime customization.
#[derive(Debug, Clone, Default)]
pub struct ReelcastConfig {
    pub network: NetworkConfig,
    pub resolution: ResolutionConfig,
    pub catalog: CatalogConfig,
}

/// HTTP transport configuration.
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    /// Timeout for page, API and embed requests
    pub request_timeout: Duration,
    /// Timeout for reachability checks of resolved streams
    pub reachability_timeout: Duration,
    /// User agent for HTTP requests
    pub user_agent: String,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
            reachability_timeout: Duration::from_secs(10),
            user_agent: "Mozilla/5.0 (X11; Linux x86_64; rv:128.0) Gecko/20100101 Firefox/128.0"
                .to_string(),
        }
    }
}

/// Embed fan-out and stream validation settings.
#[derive(Debug, Clone)]
pub struct ResolutionConfig {
    /// In-flight dispatch cap once the candidate count exceeds the threshold
    pub max_concurrent_dispatches: usize,
    /// Candidate counts up to this value are dispatched all at once
    pub unbounded_fanout_threshold: usize,
    /// Check every resolved stream and drop unreachable ones
    pub verify_streams: bool,
}

impl Default for ResolutionConfig {
    fn default() -> Self {
        Self {
            max_concurrent_dispatches: 8,
            unbounded_fanout_threshold: 20,
            verify_streams: false,
        }
    }
}

impl ResolutionConfig {
    /// Number of dispatches allowed in flight for `candidate_count` embeds.
    pub fn fanout_limit(&self, candidate_count: usize) -> usize {
        if candidate_count <= self.unbounded_fanout_threshold {
            candidate_count.max(1)
        } else {
            self.max_concurrent_dispatches.max(1)
        }
    }
}

/// Settings for API-backed catalog sources.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// Entries per listing page
    pub page_size: usize,
    /// Public site the listing URLs belong to
    pub site_url: String,
    /// Base URL of the catalog API
    pub api_base_url: String,
    /// Exact status strings from the API and the status they map to
    pub status_tokens: Vec<(String, StatusToken)>,
}

/// Release status named by a catalog status token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusToken {
    Ongoing,
    Completed,
    Upcoming,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            page_size: 50,
            site_url: "https://franime.fr".to_string(),
            api_base_url: "https://api.franime.fr/api".to_string(),
            status_tokens: vec![
                ("EN COURS".to_string(), StatusToken::Ongoing),
                ("TERMINÉ".to_string(), StatusToken::Completed),
                ("À VENIR".to_string(), StatusToken::Upcoming),
            ],
        }
    }
}

impl ReelcastConfig {
    /// Creates configuration with environment variable overrides.
    ///
    /// Allows runtime configuration via environment variables while
    /// maintaining sensible defaults. Unparseable values are ignored.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(timeout) = std::env::var("REELCAST_REQUEST_TIMEOUT")
            && let Ok(seconds) = timeout.parse::<u64>()
        {
            config.network.request_timeout = Duration::from_secs(seconds);
        }

        if let Ok(max) = std::env::var("REELCAST_MAX_CONCURRENT")
            && let Ok(count) = max.parse::<usize>()
        {
            config.resolution.max_concurrent_dispatches = count;
        }

        if let Ok(threshold) = std::env::var("REELCAST_FANOUT_THRESHOLD")
            && let Ok(count) = threshold.parse::<usize>()
        {
            config.resolution.unbounded_fanout_threshold = count;
        }

        if let Ok(verify) = std::env::var("REELCAST_VERIFY_STREAMS") {
            config.resolution.verify_streams = verify.parse().unwrap_or(false);
        }

        if let Ok(page_size) = std::env::var("REELCAST_PAGE_SIZE")
            && let Ok(size) = page_size.parse::<usize>()
            && size > 0
        {
            config.catalog.page_size = size;
        }

        if let Ok(api) = std::env::var("REELCAST_CATALOG_API")
            && !api.trim().is_empty()
        {
            config.catalog.api_base_url = api.trim_end_matches('/').to_string();
        }

        config
    }

    /// Creates a configuration optimized for testing.
    pub fn for_testing() -> Self {
        Self {
            network: NetworkConfig {
                request_timeout: Duration::from_secs(2),
                reachability_timeout: Duration::from_secs(1),
                ..Default::default()
            },
            resolution: ResolutionConfig {
                verify_streams: false,
                ..Default::default()
            },
            catalog: CatalogConfig {
                site_url: "https://site.test".to_string(),
                api_base_url: "https://api.test/api".to_string(),
                ..Default::default()
            },
        }
    }
}
