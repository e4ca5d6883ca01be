//! Hosts whose stream URL is a single literal between two script markers.
//!
//! Sibnet, Myvi, Voe, Mp4upload, YourUpload and StreamWish differ only in
//! their markers and the Referer the stream demands, so they share one
//! descriptor-driven extractor.

use async_trait::async_trait;
use reelcast_core::markers::{absolutize, after, before, unescape_html, unescape_js};
use reelcast_core::{HttpTransport, VideoCandidate};

use super::{ExtractContext, HostExtractor, candidate};
use crate::errors::ExtractionError;

/// Referer attached to the produced candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefererPolicy {
    None,
    /// The embed page URL itself.
    EmbedUrl,
    Fixed(&'static str),
}

/// Descriptor for a marker-delimited stream URL.
#[derive(Debug, Clone)]
pub struct MarkerExtractor {
    name: &'static str,
    scope: Option<&'static str>,
    start: &'static str,
    end: &'static str,
    must_contain: Option<&'static str>,
    referer: RefererPolicy,
}

impl MarkerExtractor {
    pub fn sibnet() -> Self {
        Self {
            name: "Sibnet",
            scope: None,
            start: "player.src([{src: \"",
            end: "\"",
            must_contain: None,
            referer: RefererPolicy::EmbedUrl,
        }
    }

    pub fn myvi() -> Self {
        Self {
            name: "Myvi",
            scope: None,
            start: "\"video\":[{\"url\":\"",
            end: "\"",
            must_contain: None,
            referer: RefererPolicy::None,
        }
    }

    pub fn voe() -> Self {
        Self {
            name: "Voe",
            scope: None,
            start: "'hls': '",
            end: "'",
            must_contain: None,
            referer: RefererPolicy::None,
        }
    }

    pub fn mp4upload() -> Self {
        Self {
            name: "Mp4upload",
            scope: Some("player.src("),
            start: "src: \"",
            end: "\"",
            must_contain: None,
            referer: RefererPolicy::Fixed("https://www.mp4upload.com/"),
        }
    }

    pub fn yourupload() -> Self {
        Self {
            name: "YourUpload",
            scope: None,
            start: "file: '",
            end: "'",
            must_contain: None,
            referer: RefererPolicy::Fixed("https://www.yourupload.com/"),
        }
    }

    pub fn streamwish() -> Self {
        Self {
            name: "StreamWish",
            scope: None,
            start: "file:\"",
            end: "\"",
            must_contain: Some(".m3u8"),
            referer: RefererPolicy::EmbedUrl,
        }
    }

    /// Finds the stream URL in `page`, resolved against the embed URL.
    ///
    /// Every occurrence of the start marker is tried in order; the first
    /// literal satisfying the content requirement wins.
    pub fn parse(&self, page: &str, embed_url: &str) -> Option<String> {
        let mut rest = match self.scope {
            Some(scope) => after(page, scope)?,
            None => page,
        };

        while let Some(tail) = after(rest, self.start) {
            let literal = before(tail, self.end)?;
            let decoded = unescape_js(&unescape_html(literal));

            if self.must_contain.is_none_or(|needle| decoded.contains(needle)) {
                return absolutize(embed_url, &decoded);
            }
            rest = tail;
        }

        None
    }

    fn referer_for(&self, embed_url: &str) -> Option<String> {
        match &self.referer {
            RefererPolicy::None => None,
            RefererPolicy::EmbedUrl => Some(embed_url.to_string()),
            RefererPolicy::Fixed(referer) => Some((*referer).to_string()),
        }
    }
}

#[async_trait]
impl HostExtractor for MarkerExtractor {
    fn name(&self) -> &str {
        self.name
    }

    async fn extract(
        &self,
        url: &str,
        transport: &dyn HttpTransport,
        context: &ExtractContext,
    ) -> Result<Vec<VideoCandidate>, ExtractionError> {
        let page = transport.fetch_text(url, &context.headers).await?;
        let location = self
            .parse(&page, url)
            .ok_or_else(|| ExtractionError::marker_missing(self.name, self.start))?;

        let mut video = candidate(self.name, &location, context.label(self.name))?;
        if let Some(referer) = self.referer_for(url) {
            video = video.with_header("Referer", referer);
        }

        Ok(vec![video])
    }
}
