//! Document types flowing through the pipeline
//!
//! A page moves through three shapes: a raw `FetchedDocument` straight off
//! the wire, an `ExtractedDocument` once the content extractor has pulled
//! text and metadata out of it, and (optionally) the same `ExtractedDocument`
//! with its `enrichment` fields populated by the LLM enricher.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A successfully fetched page, immutable once created
#[derive(Debug, Clone)]
pub struct FetchedDocument {
    /// The URL that produced this document (after redirects)
    pub source_url: String,

    /// Raw response body
    pub body: String,

    /// HTTP status code of the final response
    pub status_code: u16,

    /// Content-Type header value
    pub content_type: String,

    /// When the fetch completed
    pub fetched_at: DateTime<Utc>,
}

/// Structured metadata extracted from a page
///
/// Every field a pipeline stage reads is named here; stages never poke
/// through an open-ended map.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub title: Option<String>,

    pub description: Option<String>,

    /// Publication time, if the page declared one
    pub published_at: Option<DateTime<Utc>>,

    pub canonical_url: Option<String>,

    /// Whether the article body contains images
    pub has_images: bool,

    /// Whether the article body contains video embeds
    pub has_videos: bool,

    pub status_code: u16,

    pub content_type: String,
}

/// Fields the LLM enricher may fill in
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Enrichment {
    pub category: Option<String>,

    pub summary: Option<String>,

    pub keywords: Vec<String>,
}

impl Enrichment {
    /// True if no enrichment feature has produced output
    pub fn is_empty(&self) -> bool {
        self.category.is_none() && self.summary.is_none() && self.keywords.is_empty()
    }
}

/// The unit the dedupe and enrichment stages operate on
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedDocument {
    /// Normalized URL this document came from
    pub source_url: String,

    /// Extracted article text
    pub text: String,

    /// Text after the external cleaner ran, if the clean stage was enabled
    pub cleaned_text: Option<String>,

    pub metadata: DocumentMetadata,

    /// Length of `text` in characters at extraction time
    pub content_length: usize,

    /// Set by the enricher when at least one feature was applied
    pub llm_enriched: bool,

    #[serde(default)]
    pub enrichment: Enrichment,
}

impl ExtractedDocument {
    /// Creates a document from extracted text and metadata
    pub fn new(source_url: impl Into<String>, text: String, metadata: DocumentMetadata) -> Self {
        let content_length = text.chars().count();
        Self {
            source_url: source_url.into(),
            text,
            cleaned_text: None,
            metadata,
            content_length,
            llm_enriched: false,
            enrichment: Enrichment::default(),
        }
    }

    /// The text downstream stages should read: cleaned if present, raw otherwise
    pub fn content(&self) -> &str {
        self.cleaned_text.as_deref().unwrap_or(&self.text)
    }
}
