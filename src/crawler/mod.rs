//! Frontier crawling: HTTP client, link extraction, and the crawl loop

mod fetcher;
mod frontier;
mod parser;
mod site_crawler;

pub use crate::config::CrawlConfig;
pub use fetcher::{build_http_client, fetch_url, FetchResult};
pub use frontier::{Frontier, FrontierEntry};
pub use parser::extract_links;
pub use site_crawler::{CrawlOutcome, CrawlStats, SiteCrawler};
