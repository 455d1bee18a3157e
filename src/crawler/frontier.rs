//! The crawl frontier: a FIFO queue with at-enqueue deduplication
//!
//! URLs are marked seen when they enter the queue, not when they are
//! fetched, so a URL discovered on several pages is scheduled exactly once.

use std::collections::{HashSet, VecDeque};
use url::Url;

/// One scheduled fetch: a normalized URL and the depth it was found at
#[derive(Debug, Clone)]
pub struct FrontierEntry {
    pub url: Url,
    pub depth: u32,
}

/// FIFO frontier, breadth-first by construction
#[derive(Debug, Default)]
pub struct Frontier {
    queue: VecDeque<FrontierEntry>,
    seen: HashSet<String>,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueues a URL unless its normalized form has been scheduled before
    ///
    /// Returns true if the URL was actually enqueued.
    pub fn enqueue(&mut self, url: Url, depth: u32) -> bool {
        if !self.seen.insert(url.as_str().to_string()) {
            return false;
        }
        self.queue.push_back(FrontierEntry { url, depth });
        true
    }

    /// Pops the oldest scheduled entry
    pub fn pop(&mut self) -> Option<FrontierEntry> {
        self.queue.pop_front()
    }

    /// True if a URL has ever been scheduled in this run
    pub fn has_seen(&self, url: &Url) -> bool {
        self.seen.contains(url.as_str())
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_fifo_order() {
        let mut frontier = Frontier::new();
        frontier.enqueue(url("https://example.com/a"), 0);
        frontier.enqueue(url("https://example.com/b"), 1);
        frontier.enqueue(url("https://example.com/c"), 1);

        assert_eq!(frontier.pop().unwrap().url.as_str(), "https://example.com/a");
        assert_eq!(frontier.pop().unwrap().url.as_str(), "https://example.com/b");
        assert_eq!(frontier.pop().unwrap().url.as_str(), "https://example.com/c");
        assert!(frontier.pop().is_none());
    }

    #[test]
    fn test_duplicate_enqueue_rejected() {
        let mut frontier = Frontier::new();
        assert!(frontier.enqueue(url("https://example.com/a"), 0));
        assert!(!frontier.enqueue(url("https://example.com/a"), 2));
        assert_eq!(frontier.len(), 1);
    }

    #[test]
    fn test_seen_persists_after_pop() {
        let mut frontier = Frontier::new();
        frontier.enqueue(url("https://example.com/a"), 0);
        frontier.pop();
        assert!(frontier.has_seen(&url("https://example.com/a")));
        assert!(!frontier.enqueue(url("https://example.com/a"), 1));
    }

    #[test]
    fn test_depth_carried() {
        let mut frontier = Frontier::new();
        frontier.enqueue(url("https://example.com/deep"), 3);
        assert_eq!(frontier.pop().unwrap().depth, 3);
    }
}
