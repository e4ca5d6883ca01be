//! Dailymotion: streams come from the player metadata API keyed by the
//! video id found in the embed URL.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use reelcast_core::{HttpTransport, VideoCandidate, fetch_json};
use serde::Deserialize;

use super::{ExtractContext, HostExtractor, candidate};
use crate::errors::ExtractionError;

const METADATA_API: &str = "https://www.dailymotion.com/player/metadata/video";

static VIDEO_ID: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"(?:dailymotion\.com/(?:embed/)?video/|dai\.ly/|[?&]video=)([A-Za-z0-9]+)").ok()
});

#[derive(Debug, Default)]
pub struct DailymotionExtractor;

#[derive(Debug, Deserialize)]
struct PlayerMetadata {
    #[serde(default)]
    qualities: BTreeMap<String, Vec<QualitySource>>,
}

#[derive(Debug, Deserialize)]
struct QualitySource {
    url: String,
}

/// Extracts the video id from the usual Dailymotion URL shapes.
pub fn video_id(url: &str) -> Option<String> {
    VIDEO_ID
        .as_ref()?
        .captures(url)
        .and_then(|captures| captures.get(1))
        .map(|id| id.as_str().to_string())
}

/// Quality tag for a metadata key: `auto` stays, numeric heights get a `p`.
fn quality_tag(key: &str) -> String {
    if !key.is_empty() && key.chars().all(|c| c.is_ascii_digit()) {
        format!("{key}p")
    } else {
        key.to_string()
    }
}

#[async_trait]
impl HostExtractor for DailymotionExtractor {
    fn name(&self) -> &str {
        "Dailymotion"
    }

    async fn extract(
        &self,
        url: &str,
        transport: &dyn HttpTransport,
        context: &ExtractContext,
    ) -> Result<Vec<VideoCandidate>, ExtractionError> {
        let id = video_id(url).ok_or_else(|| ExtractionError::UnsupportedUrl {
            host: self.name().to_string(),
            url: url.to_string(),
        })?;

        let metadata: PlayerMetadata =
            fetch_json(transport, &format!("{METADATA_API}/{id}"), &context.headers).await?;

        metadata
            .qualities
            .iter()
            .filter_map(|(key, sources)| sources.first().map(|source| (key, source)))
            .map(|(key, source)| {
                candidate(
                    self.name(),
                    &source.url,
                    context.quality_label(self.name(), &quality_tag(key)),
                )
            })
            .collect()
    }
}
