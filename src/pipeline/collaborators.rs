//! External services the pipeline talks to through trait seams
//!
//! Production wires these to real cleaning and LLM services; tests plug in
//! deterministic fakes. The similarity scorer seam lives with the
//! deduplicator and is re-exported here for wiring convenience.

use async_trait::async_trait;

pub use crate::dedupe::SimilarityScorer;

/// Cleans extracted article text between fetch and dedupe
#[async_trait]
pub trait TextCleaner: Send + Sync {
    async fn clean(&self, text: &str) -> crate::Result<String>;
}

/// Local whitespace-normalizing cleaner, the default when no external
/// cleaning service is wired in
#[derive(Debug, Default)]
pub struct BasicCleaner;

#[async_trait]
impl TextCleaner for BasicCleaner {
    async fn clean(&self, text: &str) -> crate::Result<String> {
        let mut paragraphs: Vec<String> = Vec::new();
        for paragraph in text.split("\n\n") {
            let collapsed = paragraph.split_whitespace().collect::<Vec<_>>().join(" ");
            if !collapsed.is_empty() {
                paragraphs.push(collapsed);
            }
        }
        Ok(paragraphs.join("\n\n"))
    }
}

/// LLM-backed enrichment operations
///
/// Each method corresponds to one billed operation; the pipeline reserves
/// budget before every call.
#[async_trait]
pub trait Enricher: Send + Sync {
    async fn categorize(&self, content: &str) -> crate::Result<String>;
    async fn summarize(&self, content: &str) -> crate::Result<String>;
    async fn extract_keywords(&self, content: &str) -> crate::Result<Vec<String>>;
}
