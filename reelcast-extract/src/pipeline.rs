//! Resolution Pipeline: discovery, language filter, bounded concurrent
//! dispatch, aggregation and ranking.

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use reelcast_core::{
    EmbedCandidate, HtmlDocument, HttpTransport, PreferenceConfig, PreferenceRanker,
    PreferenceSource, ResolutionConfig, VideoCandidate,
};
use tracing::{debug, info, warn};

use crate::discovery::SecondaryFetch;
use crate::errors::ResolveError;
use crate::hosts::ExtractContext;
use crate::profile::SiteProfile;
use crate::registry::HostRegistry;

/// Orchestrates one resolution call per episode page.
///
/// Holds no per-call state; concurrent calls share only the transport,
/// registry and preference source.
#[derive(Debug, Clone)]
pub struct ResolutionPipeline {
    transport: Arc<dyn HttpTransport>,
    registry: Arc<HostRegistry>,
    preferences: Arc<dyn PreferenceSource>,
    config: ResolutionConfig,
}

impl ResolutionPipeline {
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        registry: Arc<HostRegistry>,
        preferences: Arc<dyn PreferenceSource>,
        config: ResolutionConfig,
    ) -> Self {
        Self {
            transport,
            registry,
            preferences,
            config,
        }
    }

    /// Fetches an episode page and resolves its videos.
    ///
    /// # Errors
    /// - `ResolveError::PageFetch` - The episode page could not be fetched
    /// - `ResolveError::Discovery` - The profile's row selector is invalid
    /// - `ResolveError::NoEmbedsFound` - The page listed no embeds at all
    pub async fn resolve_page(
        &self,
        profile: &SiteProfile,
        episode_url: &str,
    ) -> Result<Vec<VideoCandidate>, ResolveError> {
        info!("Resolving {} episode {}", profile.name, episode_url);
        let document = self
            .transport
            .fetch_document(episode_url, &profile.headers)
            .await?;

        self.resolve_videos(profile, &document).await
    }

    /// Resolves the videos of an already fetched episode page.
    ///
    /// Embeds whose row text matches none of the allowed languages are
    /// dropped before any request is made for them. Per-embed failures
    /// contribute nothing; the result may be empty.
    ///
    /// # Errors
    /// - `ResolveError::Discovery` - The profile's row selector is invalid
    /// - `ResolveError::NoEmbedsFound` - The page listed no embeds at all
    pub async fn resolve_videos(
        &self,
        profile: &SiteProfile,
        document: &HtmlDocument,
    ) -> Result<Vec<VideoCandidate>, ResolveError> {
        let preferences = self.preferences.snapshot();
        let embeds = profile.discovery.discover(document, &profile.base_url)?;
        if embeds.is_empty() {
            return Err(ResolveError::NoEmbedsFound {
                url: document.url().to_string(),
            });
        }

        let discovered = embeds.len();
        let allowed: Vec<EmbedCandidate> = embeds
            .into_iter()
            .filter(|embed| preferences.allows(embed.filter_text()))
            .collect();
        debug!(
            "{} of {} embed(s) pass the language filter",
            allowed.len(),
            discovered
        );

        let limit = self.config.fanout_limit(allowed.len());
        let secondary = profile.discovery.secondary();

        let batches: Vec<Vec<VideoCandidate>> = stream::iter(allowed)
            .map(|embed| self.dispatch(profile, secondary, embed))
            .buffer_unordered(limit)
            .collect()
            .await;

        let mut videos: Vec<VideoCandidate> = batches.into_iter().flatten().collect();
        if self.config.verify_streams {
            videos = self.retain_reachable(videos).await;
        }

        info!("Resolved {} video(s) from {}", videos.len(), document.url());
        Ok(self.rank(profile, videos, &preferences))
    }

    fn rank(
        &self,
        profile: &SiteProfile,
        videos: Vec<VideoCandidate>,
        preferences: &PreferenceConfig,
    ) -> Vec<VideoCandidate> {
        PreferenceRanker::new(profile.ranking).rank(videos, preferences)
    }

    async fn dispatch(
        &self,
        profile: &SiteProfile,
        secondary: SecondaryFetch,
        embed: EmbedCandidate,
    ) -> Vec<VideoCandidate> {
        let url = match secondary
            .resolve(&embed.url, self.transport.as_ref(), &profile.headers)
            .await
        {
            Ok(url) => url,
            Err(e) => {
                warn!("Could not materialise embed {}: {}", embed.url, e);
                return Vec::new();
            }
        };

        let language = embed
            .language_tag
            .as_deref()
            .filter(|_| profile.label_prefix_from_language);
        let qualified = self
            .registry
            .find(&url)
            .is_some_and(|extractor| profile.qualifies(extractor.name()));
        let (label_prefix, host_qualifier) = match language {
            Some(language) if qualified => (String::new(), Some(language.to_string())),
            Some(language) => (format!("{language} - "), None),
            None => (String::new(), None),
        };

        // Final candidates are checked once in `retain_reachable`.
        let context = ExtractContext {
            label_prefix,
            host_qualifier,
            headers: profile.headers.clone(),
            verify_stream: false,
        };

        self.registry
            .resolve(&url, self.transport.as_ref(), &context)
            .await
    }

    async fn retain_reachable(&self, videos: Vec<VideoCandidate>) -> Vec<VideoCandidate> {
        let checks = videos
            .iter()
            .map(|video| self.transport.is_reachable(video.location().as_str(), video.headers()));
        let reachable = futures::future::join_all(checks).await;

        videos
            .into_iter()
            .zip(reachable)
            .filter_map(|(video, ok)| ok.then_some(video))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use reelcast_core::fake::FakeTransport;
    use reelcast_core::{RankingStrategy, StaticPreferences};

    use super::*;
    use crate::discovery::EmbedDiscovery;

    const VOE_PAGE: &str = "<script>var sources = {'hls': 'https://voe.cdn/master.m3u8'};</script>";

    fn list_profile() -> SiteProfile {
        SiteProfile::new(
            "Test",
            "https://site.example",
            EmbedDiscovery::server_list("li.server", "data-src"),
        )
    }

    fn page_with_rows(rows: &[(&str, &str)]) -> HtmlDocument {
        let items: String = rows
            .iter()
            .map(|(text, link)| format!(r#"<li class="server" data-src="{link}">{text}</li>"#))
            .collect();
        HtmlDocument::new("https://site.example/ep-1", format!("<ul>{items}</ul>"))
    }

    fn pipeline(
        transport: FakeTransport,
        preferences: PreferenceConfig,
        config: ResolutionConfig,
    ) -> ResolutionPipeline {
        ResolutionPipeline::new(
            Arc::new(transport),
            Arc::new(HostRegistry::with_defaults()),
            Arc::new(StaticPreferences::new(preferences)),
            config,
        )
    }

    #[tokio::test]
    async fn test_no_embeds_is_reported() {
        let pipeline = pipeline(
            FakeTransport::new(),
            PreferenceConfig::default(),
            ResolutionConfig::default(),
        );

        let result = pipeline
            .resolve_videos(&list_profile(), &page_with_rows(&[]))
            .await;

        assert!(matches!(result, Err(ResolveError::NoEmbedsFound { .. })));
    }

    #[tokio::test]
    async fn test_everything_filtered_is_empty_not_error() {
        let transport = FakeTransport::new();
        let pipeline = pipeline(
            transport.clone(),
            PreferenceConfig::default().with_allowed_languages(["English"]),
            ResolutionConfig::default(),
        );

        let videos = pipeline
            .resolve_videos(
                &list_profile(),
                &page_with_rows(&[("Spanish - voe", "https://voe.sx/e/1")]),
            )
            .await
            .unwrap();

        assert!(videos.is_empty());
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_language_prefix_applied_to_labels() {
        let transport = FakeTransport::new().with_page("https://voe.sx/e/1", VOE_PAGE);
        let pipeline = pipeline(
            transport,
            PreferenceConfig::default(),
            ResolutionConfig::default(),
        );
        let profile = list_profile().with_language_prefix();

        let videos = pipeline
            .resolve_videos(&profile, &page_with_rows(&[("English - voe", "https://voe.sx/e/1")]))
            .await
            .unwrap();

        assert_eq!(videos.len(), 1);
        assert_eq!(videos[0].label(), "English - Voe");
    }

    #[tokio::test]
    async fn test_fanout_is_bounded_above_threshold() {
        let mut transport = FakeTransport::new().with_latency(Duration::from_millis(20));
        let links: Vec<String> = (0..30).map(|i| format!("https://voe.sx/e/{i}")).collect();
        for link in &links {
            transport = transport.with_page(link, VOE_PAGE);
        }
        let rows: Vec<(&str, &str)> = links.iter().map(|link| ("English", link.as_str())).collect();

        let config = ResolutionConfig {
            max_concurrent_dispatches: 4,
            unbounded_fanout_threshold: 20,
            verify_streams: false,
        };
        let pipeline = pipeline(transport.clone(), PreferenceConfig::default(), config);

        let videos = pipeline
            .resolve_videos(&list_profile(), &page_with_rows(&rows))
            .await
            .unwrap();

        assert_eq!(videos.len(), 30);
        assert!(transport.peak_in_flight() <= 4);
        assert!(transport.peak_in_flight() > 1);
    }

    #[tokio::test]
    async fn test_unreachable_streams_are_dropped() {
        let transport = FakeTransport::new()
            .with_page("https://voe.sx/e/1", VOE_PAGE)
            .with_page(
                "https://streamtape.com/e/2",
                "document.getElementById('norobotlink').innerHTML = '//tape.cdn/v.mp4' + ('xcd?t=1');",
            )
            .with_page("https://voe.cdn/master.m3u8", "");
        let config = ResolutionConfig {
            verify_streams: true,
            ..Default::default()
        };
        let pipeline = pipeline(transport, PreferenceConfig::default(), config);

        let videos = pipeline
            .resolve_videos(
                &list_profile(),
                &page_with_rows(&[
                    ("English - voe", "https://voe.sx/e/1"),
                    ("English - tape", "https://streamtape.com/e/2"),
                ]),
            )
            .await
            .unwrap();

        assert_eq!(videos.len(), 1);
        assert_eq!(videos[0].label(), "Voe");
    }

    #[tokio::test]
    async fn test_self_checking_host_stream_is_requested_once() {
        let relay = "https://www.animefenix.tv/stream/amz.php?v=1";
        let stream = "https://amz.cdn/v/ep1.mp4";
        let transport = FakeTransport::new()
            .with_page(
                relay,
                r#"<script>player.setup({ sources: [{"file":"https:\/\/amz.cdn\/v\/ep1.mp4","type":"mp4"}] });</script>"#,
            )
            .with_page(stream, "");
        let config = ResolutionConfig {
            verify_streams: true,
            ..Default::default()
        };
        let pipeline = pipeline(transport.clone(), PreferenceConfig::default(), config);

        let videos = pipeline
            .resolve_videos(&list_profile(), &page_with_rows(&[("Amazon", relay)]))
            .await
            .unwrap();

        assert_eq!(videos.len(), 1);
        let checks = transport.requests().iter().filter(|url| url.as_str() == stream).count();
        assert_eq!(checks, 1);
    }

    #[tokio::test]
    async fn test_resolve_page_ranks_with_profile_strategy() {
        let page = r#"<ul>
            <li class="server" data-src="https://streamtape.com/e/2">tape</li>
            <li class="server" data-src="https://voe.sx/e/1">voe</li>
        </ul>"#;
        let transport = FakeTransport::new()
            .with_page("https://site.example/ep-1", page)
            .with_page("https://voe.sx/e/1", VOE_PAGE)
            .with_page(
                "https://streamtape.com/e/2",
                "document.getElementById('norobotlink').innerHTML = '//tape.cdn/v.mp4' + ('xcd?t=1');",
            );
        let pipeline = pipeline(
            transport,
            PreferenceConfig::default().with_quality("Voe"),
            ResolutionConfig::default(),
        );
        let profile = list_profile().with_ranking(RankingStrategy::ProviderQuality);

        let videos = pipeline
            .resolve_page(&profile, "https://site.example/ep-1")
            .await
            .unwrap();

        let labels: Vec<&str> = videos.iter().map(|v| v.label()).collect();
        assert_eq!(labels, vec!["Voe", "StreamTape"]);
    }
}
