//! StreamTape: the link is split across a string literal and a
//! concatenated `('xcd...')` fragment in the `norobotlink` script.

use async_trait::async_trait;
use reelcast_core::markers::{after, before};
use reelcast_core::{HttpTransport, VideoCandidate};

use super::{ExtractContext, HostExtractor, candidate};
use crate::errors::ExtractionError;

const SCRIPT_MARKER: &str = "document.getElementById('norobotlink').innerHTML = '";
const FRAGMENT_MARKER: &str = "+ ('xcd";

#[derive(Debug, Default)]
pub struct StreamTapeExtractor;

/// Rebuilds the stream URL from the page source.
pub fn parse_stream_url(page: &str) -> Option<String> {
    let script = after(page, SCRIPT_MARKER)?;
    let head = before(script, "'")?;
    let tail = before(after(script, FRAGMENT_MARKER)?, "'")?;
    Some(format!("https:{head}{tail}"))
}

#[async_trait]
impl HostExtractor for StreamTapeExtractor {
    fn name(&self) -> &str {
        "StreamTape"
    }

    async fn extract(
        &self,
        url: &str,
        transport: &dyn HttpTransport,
        context: &ExtractContext,
    ) -> Result<Vec<VideoCandidate>, ExtractionError> {
        let page = transport.fetch_text(url, &context.headers).await?;
        let location = parse_stream_url(&page)
            .ok_or_else(|| ExtractionError::marker_missing(self.name(), SCRIPT_MARKER))?;

        Ok(vec![candidate(
            self.name(),
            &location,
            context.label(self.name()),
        )?])
    }
}

#[cfg(test)]
mod tests {
    use reelcast_core::fake::FakeTransport;

    use super::*;

    const PAGE: &str = r#"<script>
        document.getElementById('norobotlink').innerHTML = '//streamtape.com/get_video?id=abc&expires=1' + ('xcd&token=XyZ').substring(1);
    </script>"#;

    #[test]
    fn test_parse_concatenates_fragments() {
        assert_eq!(
            parse_stream_url(PAGE).as_deref(),
            Some("https://streamtape.com/get_video?id=abc&expires=1&token=XyZ")
        );
    }

    #[test]
    fn test_parse_missing_script() {
        assert_eq!(parse_stream_url("<html></html>"), None);
    }

    #[tokio::test]
    async fn test_extract_labels_with_prefix() {
        let transport = FakeTransport::new().with_page("https://streamtape.com/e/abc", PAGE);
        let context = ExtractContext {
            label_prefix: "Spanish - ".to_string(),
            ..Default::default()
        };

        let videos = StreamTapeExtractor
            .extract("https://streamtape.com/e/abc", &transport, &context)
            .await
            .unwrap();

        assert_eq!(videos.len(), 1);
        assert_eq!(videos[0].label(), "Spanish - StreamTape");
    }

    #[tokio::test]
    async fn test_extract_malformed_page_is_error() {
        let transport = FakeTransport::new().with_page("https://streamtape.com/e/abc", "<p>gone</p>");

        let result = StreamTapeExtractor
            .extract("https://streamtape.com/e/abc", &transport, &ExtractContext::default())
            .await;

        assert!(matches!(result, Err(ExtractionError::MarkerMissing { .. })));
    }
}
