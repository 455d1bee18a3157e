//! Substring pattern filter for discovered URLs
//!
//! Scope filters are plain substring matches against the normalized URL,
//! applied allow-list first, then block-list.

/// Allow/block substring filter applied to normalized URLs
///
/// A URL passes when:
/// 1. The allow list is empty, or at least one allowed pattern is a
///    substring of the URL, and
/// 2. No blocked pattern is a substring of the URL.
#[derive(Debug, Clone, Default)]
pub struct UrlPatternFilter {
    allowed: Vec<String>,
    blocked: Vec<String>,
}

impl UrlPatternFilter {
    /// Creates a filter from allow and block pattern lists
    pub fn new(allowed: Vec<String>, blocked: Vec<String>) -> Self {
        Self { allowed, blocked }
    }

    /// Checks whether a normalized URL survives both lists
    pub fn matches(&self, url: &str) -> bool {
        if !self.allowed.is_empty() && !self.allowed.iter().any(|p| url.contains(p.as_str())) {
            return false;
        }
        !self.blocked.iter().any(|p| url.contains(p.as_str()))
    }

    /// True if neither list holds any pattern
    pub fn is_empty(&self) -> bool {
        self.allowed.is_empty() && self.blocked.is_empty()
    }
}
