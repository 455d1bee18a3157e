//! Parsed robots.txt policy
//!
//! Wraps the robotstxt crate's matcher and additionally collects the
//! `Sitemap:` directives, which the matcher does not expose.

use robotstxt::DefaultMatcher;

/// The crawl policy for one host
///
/// Holds the raw robots.txt content and the sitemap URLs it declared.
/// A permissive policy (allow everything, no sitemaps) stands in whenever
/// robots.txt could not be fetched or parsed.
#[derive(Debug, Clone)]
pub struct SitePolicy {
    /// Raw robots.txt content (empty means allow all)
    content: String,
    /// Whether to allow all without consulting the content
    allow_all: bool,
    /// Sitemap URLs declared via `Sitemap:` directives
    sitemap_urls: Vec<String>,
}

impl SitePolicy {
    /// Creates a policy from raw robots.txt content
    pub fn from_content(content: &str) -> Self {
        Self {
            content: content.to_string(),
            allow_all: false,
            sitemap_urls: parse_sitemap_directives(content),
        }
    }

    /// Creates a permissive policy that allows everything
    ///
    /// Used as the fallback when robots.txt is unreachable or unparseable:
    /// politeness degrades gracefully rather than blocking the crawl.
    pub fn allow_all() -> Self {
        Self {
            content: String::new(),
            allow_all: true,
            sitemap_urls: Vec::new(),
        }
    }

    /// Checks if a URL is allowed for the given user agent
    pub fn is_allowed(&self, url: &str, user_agent: &str) -> bool {
        if self.allow_all || self.content.is_empty() {
            return true;
        }

        let mut matcher = DefaultMatcher::default();
        matcher.one_agent_allowed_by_robots(&self.content, user_agent, url)
    }

    /// Sitemap URLs declared by this policy
    pub fn sitemap_urls(&self) -> &[String] {
        &self.sitemap_urls
    }

    /// True for the fallback policy
    pub fn is_permissive(&self) -> bool {
        self.allow_all
    }
}

/// Collects `Sitemap:` directive values from robots.txt content
///
/// The directive is host-wide (not scoped to a User-agent group) and
/// case-insensitive per the sitemaps protocol.
fn parse_sitemap_directives(content: &str) -> Vec<String> {
    let mut sitemaps = Vec::new();

    for line in content.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        if let Some((key, value)) = trimmed.split_once(':') {
            if key.trim().eq_ignore_ascii_case("sitemap") {
                let value = value.trim();
                if !value.is_empty() {
                    sitemaps.push(value.to_string());
                }
            }
        }
    }

    sitemaps
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allow_all() {
        let policy = SitePolicy::allow_all();
        assert!(policy.is_allowed("https://example.com/any/path", "TestBot"));
        assert!(policy.is_allowed("https://example.com/admin", "TestBot"));
        assert!(policy.is_permissive());
    }

    #[test]
    fn test_disallow_all() {
        let policy = SitePolicy::from_content("User-agent: *\nDisallow: /");
        assert!(!policy.is_allowed("https://example.com/", "TestBot"));
        assert!(!policy.is_allowed("https://example.com/page", "TestBot"));
    }

    #[test]
    fn test_disallow_specific_prefix() {
        let policy = SitePolicy::from_content("User-agent: *\nDisallow: /private");
        assert!(policy.is_allowed("https://example.com/", "TestBot"));
        assert!(policy.is_allowed("https://example.com/news", "TestBot"));
        assert!(!policy.is_allowed("https://example.com/private", "TestBot"));
        assert!(!policy.is_allowed("https://example.com/private/page", "TestBot"));
    }

    #[test]
    fn test_allow_overrides_disallow() {
        let policy =
            SitePolicy::from_content("User-agent: *\nDisallow: /private\nAllow: /private/public");
        assert!(!policy.is_allowed("https://example.com/private", "TestBot"));
        assert!(policy.is_allowed("https://example.com/private/public", "TestBot"));
    }

    #[test]
    fn test_specific_user_agent() {
        let policy =
            SitePolicy::from_content("User-agent: BadBot\nDisallow: /\n\nUser-agent: *\nAllow: /");
        assert!(policy.is_allowed("https://example.com/page", "GoodBot"));
        assert!(!policy.is_allowed("https://example.com/page", "BadBot"));
    }

    #[test]
    fn test_empty_content_allows_all() {
        let policy = SitePolicy::from_content("");
        assert!(policy.is_allowed("https://example.com/any", "TestBot"));
    }

    #[test]
    fn test_garbage_content_allows_all() {
        let policy = SitePolicy::from_content("This is not valid robots.txt {{{");
        assert!(policy.is_allowed("https://example.com/any", "TestBot"));
    }

    #[test]
    fn test_sitemap_directive_collected() {
        let policy = SitePolicy::from_content(
            "User-agent: *\nDisallow: /admin\nSitemap: https://example.com/sitemap.xml",
        );
        assert_eq!(
            policy.sitemap_urls(),
            &["https://example.com/sitemap.xml".to_string()]
        );
    }

    #[test]
    fn test_multiple_sitemaps_and_case() {
        let policy = SitePolicy::from_content(
            "sitemap: https://example.com/a.xml\nSITEMAP: https://example.com/b.xml",
        );
        assert_eq!(policy.sitemap_urls().len(), 2);
    }

    #[test]
    fn test_no_sitemap_directives() {
        let policy = SitePolicy::from_content("User-agent: *\nDisallow: /admin");
        assert!(policy.sitemap_urls().is_empty());
    }

    #[test]
    fn test_comment_lines_skipped() {
        let policy = SitePolicy::from_content("# Sitemap: https://example.com/fake.xml");
        assert!(policy.sitemap_urls().is_empty());
    }
}
