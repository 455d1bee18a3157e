//! The crawl loop
//!
//! Breadth-first over one host, bounded by `max_pages` fetch attempts.
//! Every pop from the frontier counts as a visit whether or not it yields
//! a document, and every iteration ends with the configured politeness
//! delay regardless of outcome.

use crate::config::{CrawlConfig, UserAgentConfig};
use crate::crawler::fetcher::{build_http_client, fetch_url, FetchResult};
use crate::crawler::frontier::{Frontier, FrontierEntry};
use crate::crawler::parser::extract_links;
use crate::document::ExtractedDocument;
use crate::extract::{BasicExtractor, ContentExtractor};
use crate::robots::{collect_sitemap_seeds, PolitenessResolver};
use crate::url::{extract_host, normalize_url, UrlPatternFilter};
use crate::DriftError;
use reqwest::Client;
use serde::Serialize;
use std::collections::HashSet;
use std::time::Duration;

/// Counters for one crawl run
#[derive(Debug, Clone, Default, Serialize)]
pub struct CrawlStats {
    /// Fetch attempts, counted when a URL leaves the frontier
    pub pages_visited: usize,
    /// Pages that produced an accepted document
    pub pages_accepted: usize,
    /// Pages skipped by policy: robots, content type, length floor, aliasing
    pub pages_filtered: usize,
    /// Pages lost to fetch or extraction failures
    pub pages_errored: usize,
}

/// Result of one crawl run
#[derive(Debug)]
pub struct CrawlOutcome {
    pub documents: Vec<ExtractedDocument>,
    pub stats: CrawlStats,
}

/// Breadth-first single-host crawler
pub struct SiteCrawler {
    client: Client,
    config: CrawlConfig,
    resolver: PolitenessResolver,
    extractor: Box<dyn ContentExtractor>,
    filter: UrlPatternFilter,
}

impl SiteCrawler {
    /// Builds a crawler with the default extractor
    pub fn new(config: CrawlConfig, user_agent: &UserAgentConfig) -> crate::Result<Self> {
        let ua = user_agent.header_value();
        let client = build_http_client(&ua, &config.headers, config.timeout_secs)?;
        let resolver = PolitenessResolver::new(client.clone(), ua);
        let filter = UrlPatternFilter::new(
            config.allowed_patterns.clone(),
            config.blocked_patterns.clone(),
        );

        Ok(Self {
            client,
            config,
            resolver,
            extractor: Box::new(BasicExtractor::new()),
            filter,
        })
    }

    /// Replaces the content extractor
    pub fn with_extractor(mut self, extractor: Box<dyn ContentExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    /// Crawls from a seed URL until the frontier empties or the page budget
    /// is spent
    pub async fn crawl(&mut self, seed: &str) -> crate::Result<CrawlOutcome> {
        let seed_url = normalize_url(seed)
            .map_err(|e| DriftError::InvalidSeed(format!("{}: {}", seed, e)))?;
        let seed_host = extract_host(&seed_url)
            .ok_or_else(|| DriftError::InvalidSeed(format!("{}: no host", seed)))?;

        tracing::info!("Starting crawl of {} (host {})", seed_url, seed_host);

        let mut frontier = Frontier::new();
        frontier.enqueue(seed_url.clone(), 0);

        if self.config.use_sitemap {
            let policy = self.resolver.resolve(&seed_url).await;
            let seeds =
                collect_sitemap_seeds(&self.client, &policy, self.config.max_pages).await;
            for seed in seeds {
                match normalize_url(&seed) {
                    Ok(url) => {
                        frontier.enqueue(url, 0);
                    }
                    Err(e) => {
                        tracing::debug!("Skipping sitemap entry '{}': {}", seed, e);
                    }
                }
            }
        }

        let mut stats = CrawlStats::default();
        let mut documents = Vec::new();
        let mut accepted = HashSet::new();

        while let Some(entry) = frontier.pop() {
            if stats.pages_visited >= self.config.max_pages {
                tracing::info!("Page budget of {} reached", self.config.max_pages);
                break;
            }
            stats.pages_visited += 1;

            self.visit(entry, &seed_host, &mut frontier, &mut accepted, &mut documents, &mut stats)
                .await;

            // Politeness pause runs after every visit, even failed ones.
            if self.config.delay_ms > 0 {
                tokio::time::sleep(Duration::from_millis(self.config.delay_ms)).await;
            }
        }

        tracing::info!(
            "Crawl finished: {} visited, {} accepted, {} filtered, {} errored",
            stats.pages_visited,
            stats.pages_accepted,
            stats.pages_filtered,
            stats.pages_errored
        );

        Ok(CrawlOutcome { documents, stats })
    }

    async fn visit(
        &mut self,
        entry: FrontierEntry,
        seed_host: &str,
        frontier: &mut Frontier,
        accepted: &mut HashSet<String>,
        documents: &mut Vec<ExtractedDocument>,
        stats: &mut CrawlStats,
    ) {
        let url = entry.url;

        if self.config.respect_robots && !self.resolver.is_allowed(&url).await {
            tracing::debug!("Disallowed by robots.txt: {}", url);
            stats.pages_filtered += 1;
            return;
        }

        let fetched = match fetch_url(&self.client, url.as_str()).await {
            FetchResult::Success(fetched) => fetched,
            FetchResult::NotHtml { content_type } => {
                tracing::debug!("Skipping non-HTML {} ({})", url, content_type);
                stats.pages_filtered += 1;
                return;
            }
            FetchResult::HttpStatus { status_code } => {
                tracing::debug!("HTTP {} for {}", status_code, url);
                stats.pages_errored += 1;
                return;
            }
            FetchResult::Network { error } => {
                tracing::warn!("Fetch failed for {}: {}", url, error);
                stats.pages_errored += 1;
                return;
            }
        };

        if self.config.follow_links && entry.depth < self.config.max_depth {
            self.expand(&fetched.body, &url, entry.depth, seed_host, frontier);
        }

        let document = match self.extractor.extract(&fetched) {
            Ok(document) => document,
            Err(e) => {
                tracing::warn!("Extraction failed for {}: {}", url, e);
                stats.pages_errored += 1;
                return;
            }
        };

        if document.content_length < self.config.min_length {
            tracing::debug!(
                "Content too short for {} ({} < {})",
                url,
                document.content_length,
                self.config.min_length
            );
            stats.pages_filtered += 1;
            return;
        }

        // Redirects can land several scheduled URLs on the same final page;
        // the first one through keeps the document.
        let final_key = normalize_url(&document.source_url)
            .map(|u| u.as_str().to_string())
            .unwrap_or_else(|_| document.source_url.clone());
        if !accepted.insert(final_key) {
            tracing::debug!("Already accepted final URL for {}", url);
            stats.pages_filtered += 1;
            return;
        }

        tracing::info!(
            "Accepted {} ({} chars, depth {})",
            document.source_url,
            document.content_length,
            entry.depth
        );
        stats.pages_accepted += 1;
        documents.push(document);
    }

    fn expand(
        &self,
        body: &str,
        page_url: &url::Url,
        depth: u32,
        seed_host: &str,
        frontier: &mut Frontier,
    ) {
        let mut enqueued = 0usize;
        for link in extract_links(body, page_url) {
            let normalized = match normalize_url(&link) {
                Ok(url) => url,
                Err(_) => continue,
            };
            let host = match extract_host(&normalized) {
                Some(host) => host,
                None => continue,
            };
            if host != seed_host {
                continue;
            }
            if !self.filter.matches(normalized.as_str()) {
                continue;
            }
            if frontier.enqueue(normalized, depth + 1) {
                enqueued += 1;
            }
        }
        if enqueued > 0 {
            tracing::debug!("Enqueued {} links from {}", enqueued, page_url);
        }
    }
}
