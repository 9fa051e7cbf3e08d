//! Canonical URL forms used for visited-set dedup.
//!
//! Two URLs that normalize to the same string are the same page as far as the
//! crawl is concerned: fragments are dropped and a single trailing slash is
//! trimmed from the path. The root path stays `scheme://host/`.

use crate::error::{Result, ScanError};
use url::Url;

/// Normalize an already-parsed absolute URL.
pub fn normalize_url(url: &Url) -> String {
    let mut url = url.clone();
    url.set_fragment(None);

    let path = url.path();
    if path.len() > 1 && path.ends_with('/') {
        let trimmed = path[..path.len() - 1].to_string();
        url.set_path(&trimmed);
    }

    url.to_string()
}

/// Parse and normalize an absolute URL string.
pub fn normalize(raw: &str) -> Result<String> {
    let url = Url::parse(raw.trim())
        .map_err(|e| ScanError::InvalidUrl(format!("{}: {}", raw, e)))?;
    Ok(normalize_url(&url))
}

/// Resolve a (possibly relative) reference against `base` and drop its fragment.
///
/// Returns `None` for references the URL parser rejects outright.
pub fn resolve(base: &Url, href: &str) -> Option<Url> {
    let mut resolved = base.join(href.trim()).ok()?;
    resolved.set_fragment(None);
    Some(resolved)
}

/// Resolve `href` against `base`, then normalize the result.
pub fn normalize_against(base: &Url, href: &str) -> Option<String> {
    resolve(base, href).map(|url| normalize_url(&url))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_slash_and_fragment_are_equivalent() {
        let variants = [
            "https://ex.com/gallery",
            "https://ex.com/gallery/",
            "https://ex.com/gallery#top",
            "https://ex.com/gallery/#top",
        ];
        for v in variants {
            assert_eq!(normalize(v).unwrap(), "https://ex.com/gallery", "{}", v);
        }
    }

    #[test]
    fn test_root_normalizes_to_authority_root() {
        assert_eq!(normalize("https://ex.com").unwrap(), "https://ex.com/");
        assert_eq!(normalize("https://ex.com/").unwrap(), "https://ex.com/");
        assert_eq!(normalize("https://ex.com/#main").unwrap(), "https://ex.com/");
    }

    #[test]
    fn test_only_one_trailing_slash_removed() {
        assert_eq!(normalize("https://ex.com/a//").unwrap(), "https://ex.com/a/");
    }

    #[test]
    fn test_query_is_preserved() {
        assert_eq!(
            normalize("https://ex.com/list/?page=2#x").unwrap(),
            "https://ex.com/list?page=2"
        );
    }

    #[test]
    fn test_normalize_is_deterministic() {
        let once = normalize("http://ex.com:8080/a/b/").unwrap();
        let twice = normalize(&once).unwrap();
        assert_eq!(once, twice);
        assert_eq!(once, "http://ex.com:8080/a/b");
    }

    #[test]
    fn test_invalid_url_is_rejected() {
        assert!(matches!(
            normalize("not a url"),
            Err(ScanError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_relative_reference_uses_base_authority() {
        let base = Url::parse("https://ex.com/docs/index.html").unwrap();
        assert_eq!(
            normalize_against(&base, "../b/").as_deref(),
            Some("https://ex.com/b")
        );
        assert_eq!(
            normalize_against(&base, "/b#frag").as_deref(),
            Some("https://ex.com/b")
        );
        assert_eq!(
            normalize_against(&base, "page").as_deref(),
            Some("https://ex.com/docs/page")
        );
    }

    #[test]
    fn test_resolve_drops_fragment() {
        let base = Url::parse("https://ex.com/").unwrap();
        let url = resolve(&base, "/img/a.jpg#hash").unwrap();
        assert_eq!(url.as_str(), "https://ex.com/img/a.jpg");
    }
}
