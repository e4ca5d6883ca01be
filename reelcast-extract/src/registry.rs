//! Host Registry: an ordered capability table of URL predicates.
//!
//! Routes are evaluated in registration order and the first match wins.
//! An embed no route matches is dropped without an error. Extractor
//! failures are logged and absorbed here so they never reach the pipeline.

use std::collections::HashMap;
use std::sync::Arc;

use reelcast_core::{HttpTransport, VideoCandidate};
use tracing::{debug, warn};

use crate::hosts::{
    AmazonExtractor, DailymotionExtractor, DirectExtractor, ExtractContext, FireLoadExtractor,
    HostExtractor, MarkerExtractor, OkruExtractor, SendvidExtractor, StreamTapeExtractor,
};

/// One row of the capability table.
#[derive(Debug, Clone)]
pub struct HostRoute {
    patterns: Vec<String>,
    extractor: Arc<dyn HostExtractor>,
}

impl HostRoute {
    /// Checks whether `url` contains any of the route's patterns.
    pub fn matches(&self, url: &str) -> bool {
        self.patterns.iter().any(|pattern| url.contains(pattern.as_str()))
    }

    pub fn extractor(&self) -> &Arc<dyn HostExtractor> {
        &self.extractor
    }
}

/// Maps embed URLs and player names to host extractors.
#[derive(Debug, Clone, Default)]
pub struct HostRegistry {
    routes: Vec<HostRoute>,
    players: HashMap<String, Arc<dyn HostExtractor>>,
}

impl HostRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry with every supported host, in dispatch order.
    pub fn with_defaults() -> Self {
        let sibnet: Arc<dyn HostExtractor> = Arc::new(MarkerExtractor::sibnet());
        let sendvid: Arc<dyn HostExtractor> = Arc::new(SendvidExtractor);
        let myvi: Arc<dyn HostExtractor> = Arc::new(MarkerExtractor::myvi());

        let mut registry = Self::new()
            .route(&["ok.ru", "okru"], Arc::new(OkruExtractor))
            .route(&["streamwish", "embedwish"], Arc::new(MarkerExtractor::streamwish()))
            .route(&["streamtape"], Arc::new(StreamTapeExtractor))
            .route(&["mp4upload"], Arc::new(MarkerExtractor::mp4upload()))
            .route(&["yourupload"], Arc::new(MarkerExtractor::yourupload()))
            .route(&["voe"], Arc::new(MarkerExtractor::voe()))
            .route(&["dailymotion.com", "dai.ly"], Arc::new(DailymotionExtractor))
            .route(&["sibnet"], Arc::clone(&sibnet))
            .route(&["sendvid"], Arc::clone(&sendvid))
            .route(&["myvi"], Arc::clone(&myvi))
            .route(&["/stream/amz.php?"], Arc::new(AmazonExtractor))
            .route(&["/stream/fl.php"], Arc::new(FireLoadExtractor));

        registry.register_player("franime_myvi", Arc::new(DirectExtractor::new("FRAnime")));
        registry.register_player("myvi", myvi);
        registry.register_player("sendvid", sendvid);
        registry.register_player("sibnet", sibnet);
        registry
    }

    /// Appends a route matched when the URL contains any of `patterns`.
    pub fn route(mut self, patterns: &[&str], extractor: Arc<dyn HostExtractor>) -> Self {
        self.routes.push(HostRoute {
            patterns: patterns.iter().map(|p| (*p).to_string()).collect(),
            extractor,
        });
        self
    }

    /// Binds a player name, as reported by catalog APIs, to an extractor.
    pub fn register_player(&mut self, name: &str, extractor: Arc<dyn HostExtractor>) {
        self.players.insert(name.to_string(), extractor);
    }

    /// Returns the extractor of the first route matching `url`.
    pub fn find(&self, url: &str) -> Option<&Arc<dyn HostExtractor>> {
        self.routes
            .iter()
            .find(|route| route.matches(url))
            .map(HostRoute::extractor)
    }

    /// Returns the extractor bound to a player name.
    pub fn for_player(&self, name: &str) -> Option<&Arc<dyn HostExtractor>> {
        self.players.get(name)
    }

    /// Resolves an embed URL through the first matching route.
    ///
    /// Unmatched URLs and extractor failures both yield an empty list.
    pub async fn resolve(
        &self,
        url: &str,
        transport: &dyn HttpTransport,
        context: &ExtractContext,
    ) -> Vec<VideoCandidate> {
        let Some(extractor) = self.find(url) else {
            debug!("No host route for {}, dropping", url);
            return Vec::new();
        };

        Self::run(extractor.as_ref(), url, transport, context).await
    }

    /// Resolves a player URL through the extractor bound to `player`.
    pub async fn resolve_player(
        &self,
        player: &str,
        url: &str,
        transport: &dyn HttpTransport,
        context: &ExtractContext,
    ) -> Vec<VideoCandidate> {
        let Some(extractor) = self.for_player(player) else {
            debug!("Unknown player '{}', dropping {}", player, url);
            return Vec::new();
        };

        Self::run(extractor.as_ref(), url, transport, context).await
    }

    async fn run(
        extractor: &dyn HostExtractor,
        url: &str,
        transport: &dyn HttpTransport,
        context: &ExtractContext,
    ) -> Vec<VideoCandidate> {
        match extractor.extract(url, transport, context).await {
            Ok(videos) => {
                debug!("{} produced {} candidate(s) for {}", extractor.name(), videos.len(), url);
                videos
            }
            Err(e) => {
                warn!("{} failed for {}: {}", extractor.name(), url, e);
                Vec::new()
            }
        }
    }
}
