//! Ok.ru: renditions are listed in the JSON carried by the player's
//! `data-options` attribute, with the metadata itself a JSON string inside it.

use async_trait::async_trait;
use reelcast_core::markers::unescape_html;
use reelcast_core::{HtmlDocument, HttpTransport, VideoCandidate};
use serde::Deserialize;

use super::{ExtractContext, HostExtractor, candidate};
use crate::errors::ExtractionError;

const OPTIONS_SELECTOR: &str = "div[data-options]";

#[derive(Debug, Default)]
pub struct OkruExtractor;

#[derive(Debug, Deserialize)]
struct PlayerOptions {
    flashvars: Flashvars,
}

#[derive(Debug, Deserialize)]
struct Flashvars {
    metadata: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Metadata {
    #[serde(default)]
    videos: Vec<Rendition>,
    hls_manifest_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Rendition {
    name: String,
    url: String,
}

/// Maps Ok.ru rendition names onto the usual resolution labels.
fn quality_label(name: &str) -> String {
    match name {
        "ultra" => "2160p",
        "quad" => "1440p",
        "full" => "1080p",
        "hd" => "720p",
        "sd" => "480p",
        "low" => "360p",
        "lowest" => "240p",
        "mobile" => "144p",
        other => other,
    }
    .to_string()
}

/// Parses the decoded `data-options` value into `(quality, url)` pairs,
/// highest quality first.
///
/// Falls back to the HLS manifest, labelled `auto`, when no progressive
/// renditions are listed.
///
/// # Errors
/// - `serde_json::Error` - Options or embedded metadata were not valid JSON
pub fn parse_renditions(options: &str) -> Result<Vec<(String, String)>, serde_json::Error> {
    let options: PlayerOptions = serde_json::from_str(options)?;
    let Some(metadata) = options.flashvars.metadata else {
        return Ok(Vec::new());
    };
    let metadata: Metadata = serde_json::from_str(&metadata)?;

    let mut renditions: Vec<(String, String)> = metadata
        .videos
        .into_iter()
        .rev()
        .map(|rendition| (quality_label(&rendition.name), unescape_html(&rendition.url)))
        .filter(|(_, url)| url.starts_with("https://"))
        .collect();

    if renditions.is_empty()
        && let Some(manifest) = metadata.hls_manifest_url
    {
        renditions.push(("auto".to_string(), unescape_html(&manifest)));
    }

    Ok(renditions)
}

#[async_trait]
impl HostExtractor for OkruExtractor {
    fn name(&self) -> &str {
        "Okru"
    }

    async fn extract(
        &self,
        url: &str,
        transport: &dyn HttpTransport,
        context: &ExtractContext,
    ) -> Result<Vec<VideoCandidate>, ExtractionError> {
        let document: HtmlDocument = transport.fetch_document(url, &context.headers).await?;
        let options = document
            .select_first(OPTIONS_SELECTOR)
            .ok()
            .flatten()
            .and_then(|player| player.attr("data-options").map(str::to_string))
            .ok_or_else(|| ExtractionError::marker_missing(self.name(), "data-options"))?;

        let renditions =
            parse_renditions(&options).map_err(|e| ExtractionError::MalformedPayload {
                host: self.name().to_string(),
                reason: e.to_string(),
            })?;

        renditions
            .into_iter()
            .map(|(quality, location)| {
                candidate(
                    self.name(),
                    &location,
                    context.quality_label("Okru", &quality),
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use reelcast_core::fake::FakeTransport;

    use super::*;

    fn options_json() -> String {
        let metadata = serde_json::json!({
            "videos": [
                {"name": "mobile", "url": "https://vd.okcdn.ru/?id=1&amp;type=4"},
                {"name": "sd", "url": "https://vd.okcdn.ru/?id=1&type=0"},
                {"name": "hd", "url": "https://vd.okcdn.ru/?id=1&type=3"},
                {"name": "broken", "url": "rtmp://nope"}
            ],
            "hlsManifestUrl": "https://vd.okcdn.ru/hls/1.m3u8"
        });
        serde_json::json!({"flashvars": {"metadata": metadata.to_string()}}).to_string()
    }

    #[test]
    fn test_parse_renditions_highest_first() {
        let renditions = parse_renditions(&options_json()).unwrap();

        let qualities: Vec<&str> = renditions.iter().map(|(q, _)| q.as_str()).collect();
        assert_eq!(qualities, vec!["720p", "480p", "144p"]);
        assert_eq!(renditions[2].1, "https://vd.okcdn.ru/?id=1&type=4");
    }

    #[test]
    fn test_parse_falls_back_to_manifest() {
        let metadata = serde_json::json!({"hlsManifestUrl": "https://vd.okcdn.ru/hls/1.m3u8"});
        let options = serde_json::json!({"flashvars": {"metadata": metadata.to_string()}});

        let renditions = parse_renditions(&options.to_string()).unwrap();
        assert_eq!(
            renditions,
            vec![("auto".to_string(), "https://vd.okcdn.ru/hls/1.m3u8".to_string())]
        );
    }

    #[tokio::test]
    async fn test_extract_from_escaped_attribute() {
        let attribute = options_json().replace('&', "&amp;").replace('"', "&quot;");
        let page = format!(r#"<html><body><div data-module="OKVideo" data-options="{attribute}"></div></body></html>"#);
        let transport = FakeTransport::new().with_page("https://ok.ru/videoembed/1", page);
        let context = ExtractContext {
            label_prefix: "English - ".to_string(),
            ..Default::default()
        };

        let videos = OkruExtractor
            .extract("https://ok.ru/videoembed/1", &transport, &context)
            .await
            .unwrap();

        let labels: Vec<&str> = videos.iter().map(|v| v.label()).collect();
        assert_eq!(
            labels,
            vec!["English - Okru:720p", "English - Okru:480p", "English - Okru:144p"]
        );
    }

    #[tokio::test]
    async fn test_extract_without_player_is_error() {
        let transport = FakeTransport::new().with_page("https://ok.ru/videoembed/1", "<html></html>");

        let result = OkruExtractor
            .extract("https://ok.ru/videoembed/1", &transport, &ExtractContext::default())
            .await;

        assert!(matches!(result, Err(ExtractionError::MarkerMissing { .. })));
    }
}
