//! URL canonicalization for the crawl frontier
//!
//! Every URL entering the store passes through [`canonicalize`], which maps
//! a raw, possibly relative link plus a base URL to a single canonical
//! absolute URL or rejects it. The canonical form is the store's key space,
//! so the function must be idempotent: canonicalizing an already-canonical
//! URL returns it unchanged.

mod normalize;

pub use normalize::normalize_path;

use crate::{UrlError, UrlResult};
use normalize::strip_query;
use url::Url;

/// Canonicalizes a raw link relative to a base URL
///
/// Rules, applied in order:
/// 1. Strip any query string (everything from `?` onward)
/// 2. Resolve the link against `base` if it has no scheme
/// 3. Reject if the resolved URL is not same-site with `base`
///    (origin equality: scheme, lowercased host, port with defaults elided)
/// 4. Normalize: drop the fragment, collapse redundant path segments,
///    lower-case the host, remove the default port
/// 5. Reject empty or unparseable results
///
/// # Examples
///
/// ```
/// use trawler::canonicalize;
/// use url::Url;
///
/// let base = Url::parse("http://example.com/").unwrap();
/// let url = canonicalize("/b?x=1", &base).unwrap();
/// assert_eq!(url.as_str(), "http://example.com/b");
/// ```
pub fn canonicalize(raw: &str, base: &Url) -> UrlResult<Url> {
    let raw = strip_query(raw.trim());
    if raw.is_empty() {
        return Err(UrlError::Empty);
    }

    // Resolve relative references against the base; Url::join also accepts
    // absolute inputs unchanged.
    let mut resolved = base
        .join(raw)
        .map_err(|e| UrlError::Parse(format!("{}: {}", raw, e)))?;

    // Same-site scope check. Url::origin lower-cases the host and drops
    // default ports, so http://EXAMPLE.COM:80 and http://example.com agree.
    if resolved.origin() != base.origin() {
        return Err(UrlError::OutOfScope(resolved.into()));
    }

    resolved.set_fragment(None);
    // Joining may have left a query on an absolute input; the key space has
    // none.
    resolved.set_query(None);

    let path = normalize_path(resolved.path());
    resolved.set_path(&path);

    if resolved.as_str().is_empty() || resolved.host_str().is_none() {
        return Err(UrlError::Empty);
    }

    Ok(resolved)
}

/// Canonicalizes a base URL against itself, producing the seed key
pub fn canonicalize_base(base: &str) -> UrlResult<Url> {
    let parsed = Url::parse(base).map_err(|e| UrlError::Parse(format!("{}: {}", base, e)))?;
    canonicalize(base, &parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("http://example.com/").unwrap()
    }

    #[test]
    fn test_relative_link_resolved() {
        let url = canonicalize("/a", &base()).unwrap();
        assert_eq!(url.as_str(), "http://example.com/a");
    }

    #[test]
    fn test_query_stripped() {
        let url = canonicalize("/b?x=1", &base()).unwrap();
        assert_eq!(url.as_str(), "http://example.com/b");
    }

    #[test]
    fn test_query_stripped_from_absolute() {
        let url = canonicalize("http://example.com/b?x=1&y=2", &base()).unwrap();
        assert_eq!(url.as_str(), "http://example.com/b");
    }

    #[test]
    fn test_off_scope_rejected() {
        let result = canonicalize("http://other.com/c", &base());
        assert!(matches!(result, Err(UrlError::OutOfScope(_))));
    }

    #[test]
    fn test_fragment_removed() {
        let url = canonicalize("/page#section", &base()).unwrap();
        assert_eq!(url.as_str(), "http://example.com/page");
    }

    #[test]
    fn test_host_lowercased() {
        let url = canonicalize("http://EXAMPLE.COM/Page", &base()).unwrap();
        assert_eq!(url.as_str(), "http://example.com/Page");
    }

    #[test]
    fn test_default_port_removed() {
        let url = canonicalize("http://example.com:80/a", &base()).unwrap();
        assert_eq!(url.as_str(), "http://example.com/a");
    }

    #[test]
    fn test_path_segments_collapsed() {
        let url = canonicalize("/a/../b/./c", &base()).unwrap();
        assert_eq!(url.as_str(), "http://example.com/b/c");
    }

    #[test]
    fn test_trailing_slash_dropped() {
        let url = canonicalize("/a/b/", &base()).unwrap();
        assert_eq!(url.as_str(), "http://example.com/a/b");
    }

    #[test]
    fn test_root_kept() {
        let url = canonicalize("http://example.com/", &base()).unwrap();
        assert_eq!(url.as_str(), "http://example.com/");
    }

    #[test]
    fn test_empty_rejected() {
        assert!(canonicalize("", &base()).is_err());
        assert!(canonicalize("?x=1", &base()).is_err());
    }

    #[test]
    fn test_idempotent() {
        for raw in ["/a/../b?q=1#f", "/x//y/", "http://EXAMPLE.com:80/p", "/"] {
            let once = canonicalize(raw, &base()).unwrap();
            let twice = canonicalize(once.as_str(), &base()).unwrap();
            assert_eq!(once, twice, "not idempotent for {}", raw);
        }
    }

    #[test]
    fn test_scheme_mismatch_is_out_of_scope() {
        let https_base = Url::parse("https://example.com/").unwrap();
        let result = canonicalize("http://example.com/a", &https_base);
        assert!(matches!(result, Err(UrlError::OutOfScope(_))));
    }

    #[test]
    fn test_canonicalize_base() {
        let url = canonicalize_base("http://Example.com").unwrap();
        assert_eq!(url.as_str(), "http://example.com/");
    }

    #[test]
    fn test_scenario_one_links() {
        // The links of a typical seed page collapse into two in-scope keys.
        let links = ["/a", "/b?x=1", "http://other.com/c", "/a"];
        let mut seen = std::collections::BTreeSet::new();
        for link in links {
            if let Ok(url) = canonicalize(link, &base()) {
                seen.insert(url.to_string());
            }
        }
        assert_eq!(
            seen.into_iter().collect::<Vec<_>>(),
            vec![
                "http://example.com/a".to_string(),
                "http://example.com/b".to_string()
            ]
        );
    }
}
