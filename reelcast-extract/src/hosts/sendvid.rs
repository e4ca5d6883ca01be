//! Sendvid: a single `<source id="video_source">`, or the `og:video` meta tag.

use async_trait::async_trait;
use reelcast_core::{HtmlDocument, HttpTransport, VideoCandidate};

use super::{ExtractContext, HostExtractor, candidate};
use crate::errors::ExtractionError;

const ORIGIN: &str = "https://sendvid.com";

#[derive(Debug, Default)]
pub struct SendvidExtractor;

/// Finds the stream location in a Sendvid embed page.
pub fn parse_stream_url(document: &HtmlDocument) -> Option<String> {
    document
        .select_first("source#video_source")
        .ok()
        .flatten()
        .and_then(|source| source.attr("src").map(str::to_string))
        .filter(|src| !src.trim().is_empty())
        .or_else(|| document.meta_property("og:video"))
}

#[async_trait]
impl HostExtractor for SendvidExtractor {
    fn name(&self) -> &str {
        "Sendvid"
    }

    async fn extract(
        &self,
        url: &str,
        transport: &dyn HttpTransport,
        context: &ExtractContext,
    ) -> Result<Vec<VideoCandidate>, ExtractionError> {
        let document = transport.fetch_document(url, &context.headers).await?;
        let location = parse_stream_url(&document)
            .ok_or_else(|| ExtractionError::marker_missing(self.name(), "source#video_source"))?;

        let video = candidate(self.name(), &location, context.label("Sendvid:default"))?
            .with_header("Origin", ORIGIN)
            .with_header("Referer", format!("{ORIGIN}/"));

        Ok(vec![video])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefers_source_element() {
        let doc = HtmlDocument::new(
            "https://sendvid.com/embed/a1",
            r#"<meta property="og:video" content="https://videos.sendvid.com/og.mp4">
               <video><source id="video_source" src="https://videos.sendvid.com/a1.m3u8"></video>"#,
        );
        assert_eq!(
            parse_stream_url(&doc).as_deref(),
            Some("https://videos.sendvid.com/a1.m3u8")
        );
    }

    #[test]
    fn test_falls_back_to_og_video() {
        let doc = HtmlDocument::new(
            "https://sendvid.com/embed/a1",
            r#"<html><head><meta property="og:video" content="https://videos.sendvid.com/og.mp4"></head></html>"#,
        );
        assert_eq!(
            parse_stream_url(&doc).as_deref(),
            Some("https://videos.sendvid.com/og.mp4")
        );
        assert_eq!(
            parse_stream_url(&HtmlDocument::new("https://sendvid.com/", "<p></p>")),
            None
        );
    }
}
