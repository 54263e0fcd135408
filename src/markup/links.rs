//! Hyperlink resolution rules
//!
//! Both the search harvester and the crawl engine only ever follow absolute
//! http(s) URLs; this module decides which hrefs qualify.

use url::Url;

/// A hyperlink as found on a page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hyperlink {
    /// The raw `href` attribute value
    pub href: String,

    /// The absolute URL the href resolves to, if it is followable
    pub resolved: Option<String>,
}

/// Resolves a link href to an absolute URL and validates it
///
/// Returns None if the link should be excluded:
/// - empty hrefs and fragment-only anchors
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - Invalid URLs
/// - Non-HTTP(S) URLs after resolution
///
/// Fragments are stripped from the result so that anchors into the same
/// page resolve to one URL.
pub fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lower = href.to_ascii_lowercase();
    if lower.starts_with("javascript:")
        || lower.starts_with("mailto:")
        || lower.starts_with("tel:")
        || lower.starts_with("data:")
    {
        return None;
    }

    let mut absolute_url = base_url.join(href).ok()?;
    if absolute_url.scheme() != "http" && absolute_url.scheme() != "https" {
        return None;
    }
    absolute_url.set_fragment(None);

    Some(absolute_url.to_string())
}

/// Accepts an href only if it is already an absolute http(s) URL
///
/// Used for search result anchors and crawl seeds, where relative links
/// point back into the engine itself rather than at a result. The URL is
/// returned in the same form [`resolve_link`] produces: serialized by `url`
/// with the fragment stripped.
pub fn absolute_http_url(href: &str) -> Option<String> {
    let mut url = Url::parse(href.trim()).ok()?;
    match url.scheme() {
        "http" | "https" if url.host_str().is_some() => {
            url.set_fragment(None);
            Some(url.to_string())
        }
        _ => None,
    }
}
