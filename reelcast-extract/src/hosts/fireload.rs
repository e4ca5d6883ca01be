//! FireLoad relay (`/stream/fl.php?v=`): the file URL is the query value.

use async_trait::async_trait;
use reelcast_core::markers::after;
use reelcast_core::{HttpTransport, VideoCandidate};

use super::{ExtractContext, HostExtractor, candidate};
use crate::errors::ExtractionError;

const FILE_MARKER: &str = "/stream/fl.php?v=";

#[derive(Debug, Default)]
pub struct FireLoadExtractor;

#[async_trait]
impl HostExtractor for FireLoadExtractor {
    fn name(&self) -> &str {
        "FireLoad"
    }

    async fn extract(
        &self,
        url: &str,
        transport: &dyn HttpTransport,
        context: &ExtractContext,
    ) -> Result<Vec<VideoCandidate>, ExtractionError> {
        let location = after(url, FILE_MARKER)
            .filter(|file| !file.is_empty())
            .ok_or_else(|| ExtractionError::marker_missing(self.name(), FILE_MARKER))?;

        if context.verify_stream && !transport.is_reachable(location, &context.headers).await {
            return Err(ExtractionError::Unreachable {
                host: self.name().to_string(),
                url: location.to_string(),
            });
        }

        Ok(vec![candidate(self.name(), location, context.label(self.name()))?])
    }
}
