// src/scan/link.rs
// =============================================================================
// URL helpers: normalizing crawlable URLs and resolving same-host links.
//
// Two URLs are the same page for the crawler when scheme, host, path and
// query match, so the fragment is always dropped before a URL is admitted.
// =============================================================================

use url::Url;

/// Returns the crawlable form of `url`: http(s) only, with a host, no fragment.
pub fn normalize(mut url: Url) -> Option<Url> {
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return None;
    }
    url.set_fragment(None);
    Some(url)
}

/// A seed that cannot be crawled.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid seed URL '{url}': {reason}")]
pub struct InvalidSeed {
    pub url: String,
    pub reason: String,
}

/// Parses a seed URL given on the command line.
pub fn parse_seed(raw: &str) -> Result<Url, InvalidSeed> {
    let invalid = |reason: String| InvalidSeed {
        url: raw.to_string(),
        reason,
    };

    let url = Url::parse(raw.trim()).map_err(|e| invalid(e.to_string()))?;
    normalize(url).ok_or_else(|| invalid("not an http(s) URL with a host".to_string()))
}

/// Resolves `href` against the page it was found on and keeps it only if it
/// stays on the page's host.
///
/// Examples (page = "https://example.com/docs/"):
///   "intro"                  -> Some("https://example.com/docs/intro")
///   "/about#team"            -> Some("https://example.com/about")
///   "https://other.com/x"    -> None (cross-host)
///   "mailto:me@example.com"  -> None
pub fn resolve_same_host(page: &Url, href: &str) -> Option<Url> {
    let href = href.trim();

    // Skip anchors and special protocols
    if href.is_empty()
        || href.starts_with('#')
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("javascript:")
    {
        return None;
    }

    let resolved = normalize(page.join(href).ok()?)?;
    if resolved.host_str() == page.host_str() {
        Some(resolved)
    } else {
        None
    }
}
