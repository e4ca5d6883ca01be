//! Pass-through for players whose API already answers with a playable URL.

use async_trait::async_trait;
use reelcast_core::{HttpTransport, VideoCandidate};

use super::{ExtractContext, HostExtractor, candidate};
use crate::errors::ExtractionError;

#[derive(Debug)]
pub struct DirectExtractor {
    label: String,
}

impl DirectExtractor {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
        }
    }
}

#[async_trait]
impl HostExtractor for DirectExtractor {
    fn name(&self) -> &str {
        &self.label
    }

    async fn extract(
        &self,
        url: &str,
        _transport: &dyn HttpTransport,
        context: &ExtractContext,
    ) -> Result<Vec<VideoCandidate>, ExtractionError> {
        Ok(vec![candidate(&self.label, url, context.label(&self.label))?])
    }
}

#[cfg(test)]
mod tests {
    use reelcast_core::fake::FakeTransport;

    use super::*;

    #[tokio::test]
    async fn test_direct_makes_no_request() {
        let transport = FakeTransport::new();
        let videos = DirectExtractor::new("FRAnime")
            .extract("https://cdn.example/ep1.mp4", &transport, &ExtractContext::default())
            .await
            .unwrap();

        assert_eq!(videos[0].label(), "FRAnime");
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_direct_rejects_non_uri() {
        let result = DirectExtractor::new("FRAnime")
            .extract("not a url", &FakeTransport::new(), &ExtractContext::default())
            .await;

        assert!(matches!(result, Err(ExtractionError::InvalidStream { .. })));
    }
}
