use serde::Deserialize;
use std::collections::HashMap;

/// Main configuration structure for newsdrift
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub budget: BudgetConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
    /// Seed URLs to crawl, one run per seed
    #[serde(default)]
    pub seeds: Vec<String>,
}

/// Crawl behavior for a single run
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlConfig {
    /// Hard cap on total fetch attempts in one run
    #[serde(rename = "max-pages")]
    pub max_pages: usize,

    /// Links discovered beyond this depth are not expanded
    #[serde(rename = "max-depth")]
    pub max_depth: u32,

    /// Whether to expand anchor tags into the frontier
    #[serde(rename = "follow-links")]
    pub follow_links: bool,

    /// Minimum extracted content length for a document to be accepted
    #[serde(rename = "min-length")]
    pub min_length: usize,

    /// Mandatory pause between fetches, milliseconds
    #[serde(rename = "delay-ms")]
    pub delay_ms: u64,

    /// Whether to fetch and honor robots.txt
    #[serde(rename = "respect-robots")]
    pub respect_robots: bool,

    /// Whether to seed the frontier from sitemap URLs
    #[serde(rename = "use-sitemap")]
    pub use_sitemap: bool,

    /// A discovered URL must contain at least one of these substrings
    /// (empty list = no restriction)
    #[serde(rename = "allowed-patterns")]
    pub allowed_patterns: Vec<String>,

    /// A discovered URL must contain none of these substrings
    #[serde(rename = "blocked-patterns")]
    pub blocked_patterns: Vec<String>,

    /// Extra request headers, merged over the defaults
    pub headers: HashMap<String, String>,

    /// Per-request timeout in seconds
    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            max_pages: 100,
            max_depth: 3,
            follow_links: false,
            min_length: 300,
            delay_ms: 0,
            respect_robots: false,
            use_sitemap: false,
            allowed_patterns: Vec::new(),
            blocked_patterns: Vec::new(),
            headers: HashMap::new(),
            timeout_secs: 30,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

impl UserAgentConfig {
    /// Formats the User-Agent header value
    ///
    /// Format: CrawlerName/Version (+ContactURL; ContactEmail)
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{}; {})",
            self.crawler_name, self.crawler_version, self.contact_url, self.contact_email
        )
    }
}

/// Budget engine configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BudgetConfig {
    /// Maximum daily spend in USD
    #[serde(rename = "daily-budget")]
    pub daily_budget: f64,

    /// Path to the SQLite ledger database
    #[serde(rename = "ledger-path")]
    pub ledger_path: String,

    /// Domains whose documents score a trust bonus
    #[serde(rename = "trusted-domains")]
    pub trusted_domains: Vec<String>,

    /// Per-operation unit cost overrides (USD per call)
    #[serde(rename = "cost-per-call")]
    pub cost_per_call: HashMap<String, f64>,
}

impl Default for BudgetConfig {
    fn default() -> Self {
        Self {
            daily_budget: 10.0,
            ledger_path: "./newsdrift-ledger.db".to_string(),
            trusted_domains: Vec::new(),
            cost_per_call: HashMap::new(),
        }
    }
}

/// Pipeline stage toggles and tuning
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Run the external text cleaner between fetch and dedupe
    pub clean: bool,

    /// Run the deduplicator
    pub dedupe: bool,

    /// Similarity threshold for the semantic dedup pass
    #[serde(rename = "semantic-threshold")]
    pub semantic_threshold: f64,

    /// Maximum characters of content handed to the enricher per document
    #[serde(rename = "max-content-chars")]
    pub max_content_chars: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            clean: true,
            dedupe: true,
            semantic_threshold: 0.85,
            max_content_chars: 2000,
        }
    }
}
