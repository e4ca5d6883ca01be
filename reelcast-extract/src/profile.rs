//! Per-site settings for HTML-backed sources.

use reelcast_core::{RankingStrategy, RequestHeaders};

use crate::discovery::{EmbedDiscovery, LinkEncoding, SecondaryFetch};

/// Everything the pipeline needs to know about one content site.
#[derive(Debug, Clone)]
pub struct SiteProfile {
    pub name: String,
    /// Relative embed links are joined onto this URL
    pub base_url: String,
    pub discovery: EmbedDiscovery,
    /// Sent with page, secondary and embed requests
    pub headers: RequestHeaders,
    /// Prefix candidate labels with the row's language tag ("English - ")
    pub label_prefix_from_language: bool,
    /// Extractors whose labels carry the language after the host name
    /// ("Dailymotion (English):720p") instead of the prefix
    pub qualified_hosts: Vec<String>,
    pub ranking: RankingStrategy,
}

impl SiteProfile {
    pub fn new(name: &str, base_url: &str, discovery: EmbedDiscovery) -> Self {
        let base_url = base_url.trim_end_matches('/').to_string();
        let headers = RequestHeaders::from([("Referer".to_string(), format!("{base_url}/"))]);

        Self {
            name: name.to_string(),
            base_url,
            discovery,
            headers,
            label_prefix_from_language: false,
            qualified_hosts: Vec::new(),
            ranking: RankingStrategy::default(),
        }
    }

    pub fn with_language_prefix(mut self) -> Self {
        self.label_prefix_from_language = true;
        self
    }

    pub fn with_ranking(mut self, ranking: RankingStrategy) -> Self {
        self.ranking = ranking;
        self
    }

    pub fn with_qualified_host(mut self, extractor: &str) -> Self {
        self.qualified_hosts.push(extractor.to_string());
        self
    }

    /// Whether labels from `extractor` name the language after the host.
    pub fn qualifies(&self, extractor: &str) -> bool {
        self.qualified_hosts.iter().any(|name| name == extractor)
    }

    /// LMAnime: a mirror `<select>` whose option values are base64 encoded
    /// iframe tags, one option per language and host.
    pub fn lmanime() -> Self {
        Self::new(
            "LMAnime",
            "https://lmanime.com",
            EmbedDiscovery::server_list("select.mirror > option", "value")
                .with_link_encoding(LinkEncoding::Base64Iframe),
        )
        .with_language_prefix()
        .with_qualified_host("Dailymotion")
    }

    /// AnimeFenix: a `tabsArray` script of iframe tags, each pointing at a
    /// redirect page whose first script names the real player.
    pub fn animefenix() -> Self {
        Self::new(
            "AnimeFenix",
            "https://www.animefenix.tv",
            EmbedDiscovery::ScriptArray {
                script_marker: "var tabsArray".to_string(),
                delimiter: "tabsArray".to_string(),
                start_marker: "src='".to_string(),
                end_marker: "'".to_string(),
                secondary: SecondaryFetch::ScriptSrc,
            },
        )
        .with_ranking(RankingStrategy::ProviderQuality)
    }
}
