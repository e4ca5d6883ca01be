//! Marker-based string extraction helpers.
//!
//! Host pages hide stream URLs inside scripts. Extraction is deterministic
//! prefix/suffix slicing, never script evaluation. Every helper returns
//! `None` when a marker is missing so callers can treat the payload as
//! malformed instead of slicing garbage.

use url::Url;

/// Returns the text following the first occurrence of `marker`.
pub fn after<'a>(haystack: &'a str, marker: &str) -> Option<&'a str> {
    haystack
        .find(marker)
        .map(|index| &haystack[index + marker.len()..])
}

/// Returns the text preceding the first occurrence of `marker`.
pub fn before<'a>(haystack: &'a str, marker: &str) -> Option<&'a str> {
    haystack.find(marker).map(|index| &haystack[..index])
}

/// Returns the text between the first `start` marker and the next `end` marker.
pub fn between<'a>(haystack: &'a str, start: &str, end: &str) -> Option<&'a str> {
    after(haystack, start).and_then(|rest| before(rest, end))
}

/// Undoes the HTML entity escapes seen in attribute values and inline JSON.
pub fn unescape_html(value: &str) -> String {
    value
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

/// Undoes JavaScript string escaping of slashes and ampersands.
pub fn unescape_js(value: &str) -> String {
    value
        .replace("\\u0026", "&")
        .replace("\\u002F", "/")
        .replace("\\/", "/")
}

/// Removes every backslash.
pub fn strip_backslashes(value: &str) -> String {
    value.replace('\\', "")
}

/// Checks that a link is an absolute http(s) URL.
pub fn is_absolute_http(link: &str) -> bool {
    Url::parse(link)
        .map(|url| matches!(url.scheme(), "http" | "https") && url.has_host())
        .unwrap_or(false)
}

/// Resolves a possibly relative or protocol-relative link against `base`.
pub fn absolutize(base: &str, link: &str) -> Option<String> {
    let link = link.trim();
    if link.is_empty() {
        return None;
    }
    if is_absolute_http(link) {
        return Some(link.to_string());
    }
    if let Some(rest) = link.strip_prefix("//") {
        return Some(format!("https://{rest}"));
    }

    Url::parse(base)
        .and_then(|base| base.join(link))
        .ok()
        .map(|url| url.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_between_requires_both_markers() {
        let script = "var src = 'https://a/b.mp4'; play();";
        assert_eq!(between(script, "src = '", "'"), Some("https://a/b.mp4"));
        assert_eq!(between(script, "file: '", "'"), None);
        assert_eq!(between("src = 'unterminated", "src = '", "'"), None);
    }

    #[test]
    fn test_unescape_html_handles_amp_last() {
        assert_eq!(unescape_html("a?x=1&amp;y=2"), "a?x=1&y=2");
        assert_eq!(unescape_html("&amp;quot;"), "&quot;");
        assert_eq!(unescape_html("{&quot;k&quot;:1}"), "{\"k\":1}");
    }

    #[test]
    fn test_unescape_js() {
        assert_eq!(
            unescape_js("https:\\/\\/cdn\\/v.mp4?a=1\\u0026b=2"),
            "https://cdn/v.mp4?a=1&b=2"
        );
    }

    #[test]
    fn test_absolutize() {
        assert_eq!(
            absolutize("https://video.sibnet.ru/shell.php", "/v/abc/1.mp4").as_deref(),
            Some("https://video.sibnet.ru/v/abc/1.mp4")
        );
        assert_eq!(
            absolutize("https://x.example/", "//cdn.example/a.mp4").as_deref(),
            Some("https://cdn.example/a.mp4")
        );
        assert_eq!(absolutize("not a base", "/relative"), None);
    }

    #[test]
    fn test_is_absolute_http() {
        assert!(is_absolute_http("https://ok.ru/videoembed/1"));
        assert!(!is_absolute_http("javascript:void(0)"));
        assert!(!is_absolute_http("/stream/amz.php?v=1"));
    }
}
