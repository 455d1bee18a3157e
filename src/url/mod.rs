//! URL normalization and matching
//!
//! Normalized URLs are the identity the crawler deduplicates scheduling on:
//! scheme + host + path + query, with the fragment stripped. The same form
//! keys the per-run visited set and the accepted-document guard.

mod matcher;

pub use matcher::UrlPatternFilter;

use crate::UrlError;
use url::Url;

/// Normalizes a URL to its crawl identity
///
/// # Normalization Steps
///
/// 1. Parse the URL; reject if malformed
/// 2. Reject non-HTTP(S) schemes
/// 3. Lowercase the host
/// 4. Remove the fragment (everything after #)
/// 5. Keep the query string untouched
/// 6. Empty path becomes /
///
/// The query string is deliberately preserved: many news sites key articles
/// on query parameters, so dropping them would alias distinct pages.
///
/// # Examples
///
/// ```
/// use newsdrift::url::normalize_url;
///
/// let url = normalize_url("https://Example.COM/news?id=7#comments").unwrap();
/// assert_eq!(url.as_str(), "https://example.com/news?id=7");
/// ```
pub fn normalize_url(url_str: &str) -> Result<Url, UrlError> {
    let mut url = Url::parse(url_str).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    match url.host_str() {
        Some(host) => {
            let lowered = host.to_lowercase();
            if lowered != host {
                url.set_host(Some(&lowered))
                    .map_err(|e| UrlError::Parse(format!("Failed to set host: {}", e)))?;
            }
        }
        None => return Err(UrlError::MissingHost),
    }

    url.set_fragment(None);

    if url.path().is_empty() {
        url.set_path("/");
    }

    Ok(url)
}

/// Extracts the host (including port, if any) from a normalized URL
///
/// The host identifies the site for same-host link filtering and for the
/// one-robots-fetch-per-host cache.
pub fn extract_host(url: &Url) -> Option<String> {
    let host = url.host_str()?;
    match url.port() {
        Some(port) => Some(format!("{}:{}", host, port)),
        None => Some(host.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_fragment() {
        let result = normalize_url("https://example.com/page#section").unwrap();
        assert_eq!(result.as_str(), "https://example.com/page");
    }

    #[test]
    fn test_keeps_query() {
        let result = normalize_url("https://example.com/article?id=42&lang=vi").unwrap();
        assert_eq!(result.as_str(), "https://example.com/article?id=42&lang=vi");
    }

    #[test]
    fn test_lowercases_host() {
        let result = normalize_url("https://EXAMPLE.COM/Page").unwrap();
        assert_eq!(result.as_str(), "https://example.com/Page");
    }

    #[test]
    fn test_path_case_preserved() {
        let result = normalize_url("https://example.com/News/Today").unwrap();
        assert_eq!(result.path(), "/News/Today");
    }

    #[test]
    fn test_http_not_rewritten() {
        // Test servers speak plain http; the scheme is part of the identity.
        let result = normalize_url("http://example.com/page").unwrap();
        assert_eq!(result.as_str(), "http://example.com/page");
    }

    #[test]
    fn test_empty_path_becomes_root() {
        let result = normalize_url("https://example.com").unwrap();
        assert_eq!(result.as_str(), "https://example.com/");
    }

    #[test]
    fn test_rejects_non_http_scheme() {
        let result = normalize_url("ftp://example.com/file");
        assert!(matches!(result.unwrap_err(), UrlError::InvalidScheme(_)));
    }

    #[test]
    fn test_rejects_malformed() {
        assert!(normalize_url("not a url").is_err());
    }

    #[test]
    fn test_fragment_and_query_together() {
        let result = normalize_url("https://example.com/p?a=1#frag").unwrap();
        assert_eq!(result.as_str(), "https://example.com/p?a=1");
    }

    #[test]
    fn test_extract_host_without_port() {
        let url = normalize_url("https://news.example.com/page").unwrap();
        assert_eq!(extract_host(&url), Some("news.example.com".to_string()));
    }

    #[test]
    fn test_extract_host_with_port() {
        let url = normalize_url("http://127.0.0.1:8080/page").unwrap();
        assert_eq!(extract_host(&url), Some("127.0.0.1:8080".to_string()));
    }
}
