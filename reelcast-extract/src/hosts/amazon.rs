//! Amazon relay (`/stream/amz.php?`): the file URL sits in a `sources: [`
//! script with escaped slashes.

use async_trait::async_trait;
use reelcast_core::markers::{between, strip_backslashes};
use reelcast_core::{HttpTransport, VideoCandidate};

use super::{ExtractContext, HostExtractor, candidate};
use crate::errors::ExtractionError;

const SCRIPT_MARKER: &str = "sources: [";
const FILE_START: &str = "[{\"file\":\"";
const FILE_END: &str = "\",";

#[derive(Debug, Default)]
pub struct AmazonExtractor;

/// Extracts the file URL from the relay page.
pub fn parse_file_url(page: &str) -> Option<String> {
    let script_start = page.find(SCRIPT_MARKER)?;
    let file = between(&page[script_start..], FILE_START, FILE_END)?;
    Some(strip_backslashes(file))
}

/// Relay links carrying `&ext=es` serve the Spanish dub.
fn label_for(url: &str) -> &'static str {
    if url.contains("&ext=es") {
        "Amazon ES"
    } else {
        "Amazon"
    }
}

#[async_trait]
impl HostExtractor for AmazonExtractor {
    fn name(&self) -> &str {
        "Amazon"
    }

    async fn extract(
        &self,
        url: &str,
        transport: &dyn HttpTransport,
        context: &ExtractContext,
    ) -> Result<Vec<VideoCandidate>, ExtractionError> {
        let page = transport.fetch_text(url, &context.headers).await?;
        let location = parse_file_url(&page)
            .ok_or_else(|| ExtractionError::marker_missing(self.name(), SCRIPT_MARKER))?;

        if context.verify_stream && !transport.is_reachable(&location, &context.headers).await {
            return Err(ExtractionError::Unreachable {
                host: self.name().to_string(),
                url: location,
            });
        }

        Ok(vec![candidate(
            self.name(),
            &location,
            context.label(label_for(url)),
        )?])
    }
}

#[cfg(test)]
mod tests {
    use reelcast_core::fake::FakeTransport;

    use super::*;

    const PAGE: &str = r#"<script>player.setup({ sources: [{"file":"https:\/\/amz.cdn\/v\/ep1.mp4?sig=1","type":"mp4"}] });</script>"#;

    #[test]
    fn test_parse_strips_escapes() {
        assert_eq!(
            parse_file_url(PAGE).as_deref(),
            Some("https://amz.cdn/v/ep1.mp4?sig=1")
        );
        assert_eq!(parse_file_url(r#"{"file":"https://x"}"#), None);
    }

    #[tokio::test]
    async fn test_spanish_label_from_relay_url() {
        let relay = "https://www.animefenix.tv/stream/amz.php?v=1&ext=es";
        let transport = FakeTransport::new().with_page(relay, PAGE);

        let videos = AmazonExtractor
            .extract(relay, &transport, &ExtractContext::default())
            .await
            .unwrap();

        assert_eq!(videos[0].label(), "Amazon ES");
    }

    #[tokio::test]
    async fn test_dead_stream_is_rejected() {
        let relay = "https://www.animefenix.tv/stream/amz.php?v=1";
        let transport = FakeTransport::new()
            .with_page(relay, PAGE)
            .with_status("https://amz.cdn/v/ep1.mp4?sig=1", 403);
        let context = ExtractContext {
            verify_stream: true,
            ..Default::default()
        };

        let result = AmazonExtractor.extract(relay, &transport, &context).await;
        assert!(matches!(result, Err(ExtractionError::Unreachable { .. })));
    }
}
