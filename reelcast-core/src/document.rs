//! Parsed HTML page wrapper.
//!
//! Keeps the page source as text and evaluates selectors synchronously, so
//! a document can be held across await points without carrying a DOM.

use std::collections::BTreeMap;

use scraper::{ElementRef, Html, Selector};

/// Errors raised while querying a document.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DocumentError {
    #[error("Invalid selector '{selector}': {reason}")]
    InvalidSelector { selector: String, reason: String },
}

/// A fetched page ready for selector queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HtmlDocument {
    url: String,
    source: String,
}

/// Owned copy of one matched element.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ElementSnapshot {
    /// Text content with whitespace runs collapsed
    pub text: String,
    pub attributes: BTreeMap<String, String>,
    pub inner_html: String,
}

impl ElementSnapshot {
    fn from_element(element: ElementRef<'_>) -> Self {
        let text = element
            .text()
            .flat_map(str::split_whitespace)
            .collect::<Vec<_>>()
            .join(" ");

        let attributes = element
            .value()
            .attrs()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();

        Self {
            text,
            attributes,
            inner_html: element.inner_html(),
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }
}

impl HtmlDocument {
    pub fn new(url: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            source: source.into(),
        }
    }

    /// URL the document was fetched from.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Raw page source.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Returns snapshots of every element matching `selector`, in document order.
    ///
    /// # Errors
    /// - `DocumentError::InvalidSelector` - Selector failed to parse
    pub fn select(&self, selector: &str) -> Result<Vec<ElementSnapshot>, DocumentError> {
        let parsed = parse_selector(selector)?;
        let html = Html::parse_document(&self.source);

        Ok(html
            .select(&parsed)
            .map(ElementSnapshot::from_element)
            .collect())
    }

    /// Returns the first element matching `selector`.
    ///
    /// # Errors
    /// - `DocumentError::InvalidSelector` - Selector failed to parse
    pub fn select_first(&self, selector: &str) -> Result<Option<ElementSnapshot>, DocumentError> {
        Ok(self.select(selector)?.into_iter().next())
    }

    /// Returns the bodies of all inline `<script>` elements.
    pub fn scripts(&self) -> Vec<String> {
        let html = Html::parse_document(&self.source);
        let Ok(selector) = Selector::parse("script") else {
            return Vec::new();
        };

        html.select(&selector)
            .map(|script| script.text().collect::<String>())
            .filter(|body| !body.trim().is_empty())
            .collect()
    }

    /// Returns the first inline script whose body contains `marker`.
    pub fn script_containing(&self, marker: &str) -> Option<String> {
        self.scripts().into_iter().find(|body| body.contains(marker))
    }

    /// Returns the `content` of a `<meta property=...>` tag.
    pub fn meta_property(&self, property: &str) -> Option<String> {
        let selector = format!("meta[property=\"{property}\"]");
        self.select_first(&selector)
            .ok()
            .flatten()
            .and_then(|meta| meta.attr("content").map(str::to_string))
    }
}

fn parse_selector(selector: &str) -> Result<Selector, DocumentError> {
    Selector::parse(selector).map_err(|e| DocumentError::InvalidSelector {
        selector: selector.to_string(),
        reason: e.to_string(),
    })
}
