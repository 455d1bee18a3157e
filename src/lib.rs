//! Newsdrift: a budget-bounded, polite news crawler
//!
//! This crate implements the crawl-and-decide core of a news-aggregation
//! platform: a frontier-driven site crawler that respects robots.txt, a
//! two-stage deduplicator, and a cost decision engine that gates expensive
//! LLM-backed enrichment under a hard daily budget.

pub mod budget;
pub mod config;
pub mod crawler;
pub mod dedupe;
pub mod document;
pub mod extract;
pub mod pipeline;
pub mod robots;
pub mod url;

use thiserror::Error;

/// Main error type for newsdrift operations
#[derive(Debug, Error)]
pub enum DriftError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Seed URL is invalid: {0}")]
    InvalidSeed(String),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("Extraction error for {url}: {message}")]
    Extraction { url: String, message: String },

    #[error("Enrichment error: {0}")]
    Enrichment(String),

    #[error("Similarity scoring error: {0}")]
    Similarity(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,
}

/// Errors from the budget ledger store
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Ledger day not found: {0}")]
    DayNotFound(String),

    #[error("Ledger lock poisoned")]
    Poisoned,
}

/// Result type alias for newsdrift operations
pub type Result<T> = std::result::Result<T, DriftError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use budget::{CostDecisionEngine, FeatureDecision, UsageReport};
pub use config::Config;
pub use crawler::{CrawlConfig, CrawlOutcome, CrawlStats};
pub use document::{DocumentMetadata, ExtractedDocument, FetchedDocument};
pub use pipeline::{Pipeline, PipelineOptions, PipelineReport, RunStatus};
pub use crate::url::{extract_host, normalize_url};
