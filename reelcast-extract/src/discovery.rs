//! Embed Discovery descriptors.
//!
//! A descriptor is a pure mapping from a fetched page to embed candidates.
//! Discovery never filters by language; that happens in the pipeline.

use base64::{Engine, engine::general_purpose::STANDARD};
use reelcast_core::markers::{absolutize, after, before, between, is_absolute_http};
use reelcast_core::{DocumentError, EmbedCandidate, HtmlDocument, HttpTransport, RequestHeaders};
use tracing::debug;

use crate::errors::ExtractionError;

/// The extra round trip some sites need to reach the real embed URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SecondaryFetch {
    /// The discovered link is already the embed URL.
    #[default]
    None,
    /// The first script of the linked page holds `src="<embed>"`.
    ScriptSrc,
    /// The linked page wraps the player in an `<iframe src>`.
    IframeSrc,
}

impl SecondaryFetch {
    /// Materialises the real embed URL for a discovered link.
    ///
    /// # Errors
    /// - `ExtractionError::Transport` - The intermediate page could not be fetched
    /// - `ExtractionError::MarkerMissing` - The page carried no embed reference
    pub async fn resolve(
        &self,
        link: &str,
        transport: &dyn HttpTransport,
        headers: &RequestHeaders,
    ) -> Result<String, ExtractionError> {
        let embedded = match self {
            SecondaryFetch::None => return Ok(link.to_string()),
            SecondaryFetch::ScriptSrc => {
                let page = transport.fetch_document(link, headers).await?;
                page.scripts()
                    .first()
                    .and_then(|script| between(script, "src=\"", "\"").map(str::to_string))
            }
            SecondaryFetch::IframeSrc => {
                let page = transport.fetch_document(link, headers).await?;
                page.select_first("iframe[src]")
                    .ok()
                    .flatten()
                    .and_then(|frame| frame.attr("src").map(str::to_string))
            }
        };

        embedded
            .and_then(|src| absolutize(link, &src))
            .ok_or_else(|| ExtractionError::marker_missing("secondary fetch", "src"))
    }
}

/// How a server row stores its link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinkEncoding {
    /// The attribute holds the URL itself.
    #[default]
    Plain,
    /// The attribute holds a base64 encoded `<iframe src>` tag.
    Base64Iframe,
}

impl LinkEncoding {
    /// Turns a raw attribute value into a link, `None` when it cannot be decoded.
    pub fn decode(&self, raw: &str) -> Option<String> {
        match self {
            LinkEncoding::Plain => Some(raw.to_string()),
            LinkEncoding::Base64Iframe => {
                let bytes = STANDARD.decode(raw.trim()).ok()?;
                let markup = String::from_utf8(bytes).ok()?;
                let fragment = HtmlDocument::new("", markup);
                fragment
                    .select_first("iframe[src]")
                    .ok()
                    .flatten()
                    .and_then(|frame| frame.attr("src").map(str::to_string))
            }
        }
    }
}

/// How embed links are laid out on a content page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmbedDiscovery {
    /// One structural element per server/language row.
    ServerList {
        /// Selects every row
        row_selector: String,
        /// Row attribute holding the link
        link_attribute: String,
        encoding: LinkEncoding,
        secondary: SecondaryFetch,
    },
    /// A script variable holding a delimited pseudo-array of player tags.
    ScriptArray {
        /// Text identifying the script
        script_marker: String,
        /// Separator between entries
        delimiter: String,
        /// Text preceding each URL
        start_marker: String,
        /// Text following each URL
        end_marker: String,
        secondary: SecondaryFetch,
    },
}

impl EmbedDiscovery {
    /// Row-per-server layout with the link in `link_attribute`.
    pub fn server_list(row_selector: &str, link_attribute: &str) -> Self {
        Self::ServerList {
            row_selector: row_selector.to_string(),
            link_attribute: link_attribute.to_string(),
            encoding: LinkEncoding::Plain,
            secondary: SecondaryFetch::None,
        }
    }

    /// Sets how server rows encode their link. Script arrays are unaffected.
    pub fn with_link_encoding(mut self, link_encoding: LinkEncoding) -> Self {
        if let Self::ServerList { encoding, .. } = &mut self {
            *encoding = link_encoding;
        }
        self
    }

    /// Replaces the secondary fetch of this descriptor.
    pub fn with_secondary(mut self, fetch: SecondaryFetch) -> Self {
        match &mut self {
            Self::ServerList { secondary, .. } | Self::ScriptArray { secondary, .. } => {
                *secondary = fetch;
            }
        }
        self
    }

    pub fn secondary(&self) -> SecondaryFetch {
        match self {
            Self::ServerList { secondary, .. } | Self::ScriptArray { secondary, .. } => *secondary,
        }
    }

    /// Extracts embed candidates from a page, in document order.
    ///
    /// Relative links are resolved against `base_url`.
    ///
    /// # Errors
    /// - `DocumentError::InvalidSelector` - The row selector failed to parse
    pub fn discover(
        &self,
        document: &HtmlDocument,
        base_url: &str,
    ) -> Result<Vec<EmbedCandidate>, DocumentError> {
        let embeds = match self {
            Self::ServerList {
                row_selector,
                link_attribute,
                encoding,
                ..
            } => document
                .select(row_selector)?
                .into_iter()
                .filter_map(|row| {
                    let link = encoding.decode(row.attr(link_attribute)?)?;
                    let link = absolutize(base_url, &link)?;
                    Some(EmbedCandidate::from_row(link, &row.text))
                })
                .collect(),
            Self::ScriptArray {
                script_marker,
                delimiter,
                start_marker,
                end_marker,
                ..
            } => match document.script_containing(script_marker) {
                Some(script) => split_script_array(&script, delimiter, start_marker, end_marker)
                    .into_iter()
                    .map(EmbedCandidate::new)
                    .collect(),
                None => Vec::new(),
            },
        };

        debug!("Discovered {} embed(s) on {}", embeds.len(), document.url());
        Ok(embeds)
    }
}

/// Splits a script pseudo-array into absolute, decoded URLs.
///
/// Each entry's URL is the text between `start` and `end`; the `amp;`
/// fragment left by entity escaping is removed and `%xx` escapes are decoded.
/// Entries missing either marker or not absolute http(s) are skipped.
pub fn split_script_array(script: &str, delimiter: &str, start: &str, end: &str) -> Vec<String> {
    script
        .split(delimiter)
        .filter_map(|entry| before(after(entry, start)?, end))
        .map(|raw| raw.replace("amp;", ""))
        .filter_map(|raw| urlencoding::decode(&raw).ok().map(|decoded| decoded.into_owned()))
        .filter(|url| is_absolute_http(url))
        .collect()
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use reelcast_core::fake::FakeTransport;

    use super::*;

    const FENIX_SCRIPT: &str = "var tabsArray = new Array();\n\
        tabsArray['1'] = \"<iframe src='https://www.animefenix.tv/stream/amz.php?v=1&amp;ext=es' frameborder='0'>\";\n\
        tabsArray['2'] = \"<iframe src='https%3A%2F%2Fwww.animefenix.tv%2Fredirect.php%3Fid%3D9' frameborder='0'>\";\n\
        tabsArray['3'] = \"<iframe src='/relative/player' frameborder='0'>\";\n\
        tabsArray['4'] = \"<iframe frameborder='0'>\";";

    #[test]
    fn test_split_script_array_decodes_and_filters() {
        let urls = split_script_array(FENIX_SCRIPT, "tabsArray", "src='", "'");

        assert_eq!(
            urls,
            vec![
                "https://www.animefenix.tv/stream/amz.php?v=1&ext=es".to_string(),
                "https://www.animefenix.tv/redirect.php?id=9".to_string(),
            ]
        );
    }

    #[test]
    fn test_server_list_keeps_row_text_and_language() {
        let page = HtmlDocument::new(
            "https://lmanime.example/ep-1",
            r#"<select class="mirror">
                 <option data-src="https://ok.ru/videoembed/abc">English - ok.ru</option>
                 <option data-src="/player/2">Spanish - dailymotion</option>
                 <option>Header row</option>
               </select>"#,
        );

        let embeds = EmbedDiscovery::server_list("select.mirror > option", "data-src")
            .discover(&page, "https://lmanime.example")
            .unwrap();

        assert_eq!(embeds.len(), 2);
        assert_eq!(embeds[0].language_tag.as_deref(), Some("English"));
        assert_eq!(embeds[0].context, "English - ok.ru");
        assert_eq!(embeds[1].url, "https://lmanime.example/player/2");
    }

    #[test]
    fn test_base64_rows_decode_to_iframe_src() {
        // <iframe src="https://ok.ru/videoembed/77" frameborder="0"></iframe>
        let okru = "PGlmcmFtZSBzcmM9Imh0dHBzOi8vb2sucnUvdmlkZW9lbWJlZC83NyIgZnJhbWVib3JkZXI9IjAiPjwvaWZyYW1lPg==";
        // <iframe src="//www.dailymotion.com/embed/video/x8q"></iframe>
        let daily = "PGlmcmFtZSBzcmM9Ii8vd3d3LmRhaWx5bW90aW9uLmNvbS9lbWJlZC92aWRlby94OHEiPjwvaWZyYW1lPg==";
        let page = HtmlDocument::new(
            "https://lmanime.example/ep-1",
            format!(
                r#"<select class="mirror">
                     <option value="">Select Video Server</option>
                     <option value="{okru}">English - ok.ru</option>
                     <option value="not base64!">English - broken</option>
                     <option value="{daily}">Español - dailymotion</option>
                   </select>"#
            ),
        );

        let embeds = EmbedDiscovery::server_list("select.mirror > option", "value")
            .with_link_encoding(LinkEncoding::Base64Iframe)
            .discover(&page, "https://lmanime.example")
            .unwrap();

        let urls: Vec<&str> = embeds.iter().map(|e| e.url.as_str()).collect();
        assert_eq!(
            urls,
            vec![
                "https://ok.ru/videoembed/77",
                "https://www.dailymotion.com/embed/video/x8q"
            ]
        );
        assert_eq!(embeds[1].language_tag.as_deref(), Some("Español"));
    }

    #[test]
    fn test_script_array_without_script_is_empty() {
        let discovery = EmbedDiscovery::ScriptArray {
            script_marker: "var tabsArray".to_string(),
            delimiter: "tabsArray".to_string(),
            start_marker: "src='".to_string(),
            end_marker: "'".to_string(),
            secondary: SecondaryFetch::ScriptSrc,
        };
        let page = HtmlDocument::new("https://fenix.example/ver/1", "<script>var other = 1;</script>");

        assert!(discovery.discover(&page, "https://fenix.example").unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_script_src_secondary_fetch() {
        let transport = FakeTransport::new().with_page(
            "https://fenix.example/redirect.php?id=9",
            r#"<html><script>window.location.href; var player = '<iframe src="https://streamtape.com/e/xyz">';</script></html>"#,
        );

        let resolved = SecondaryFetch::ScriptSrc
            .resolve(
                "https://fenix.example/redirect.php?id=9",
                &transport,
                &RequestHeaders::new(),
            )
            .await
            .unwrap();

        assert_eq!(resolved, "https://streamtape.com/e/xyz");
    }

    #[tokio::test]
    async fn test_iframe_secondary_fetch_missing_frame() {
        let transport =
            FakeTransport::new().with_page("https://site.example/watch/2", "<p>no player</p>");

        let result = SecondaryFetch::IframeSrc
            .resolve("https://site.example/watch/2", &transport, &RequestHeaders::new())
            .await;

        assert!(matches!(result, Err(ExtractionError::MarkerMissing { .. })));
    }

    proptest! {
        #[test]
        fn test_split_script_array_only_yields_absolute_urls(script in ".{0,200}") {
            for url in split_script_array(&script, "tabsArray", "src='", "'") {
                prop_assert!(is_absolute_http(&url));
            }
        }
    }
}
