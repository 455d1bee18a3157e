//! The processing pipeline: fetch, clean, dedupe, enrich, report
//!
//! Stages run strictly in order over an owned batch of documents. A stage
//! failing on one document skips that document, not the run; only fetch
//! setup errors and ledger errors abort. Every paid stage checks with the
//! cost decision engine before spending.

mod collaborators;

pub use collaborators::{BasicCleaner, Enricher, SimilarityScorer, TextCleaner};

use crate::budget::{CostDecisionEngine, Priority, UsageReport};
use crate::config::Config;
use crate::crawler::SiteCrawler;
use crate::dedupe::Deduplicator;
use crate::document::ExtractedDocument;
use serde::Serialize;
use std::sync::Arc;

/// Semantic dedupe is gated (and billed) on at most this many documents
const SEMANTIC_GATE_BATCH: usize = 50;

/// Documents longer than this qualify for summarization
const SUMMARY_MIN_CHARS: usize = 1500;

/// How a pipeline run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Success,
    /// The fetch stage produced nothing; later stages never ran
    NoData,
}

/// Per-stage counters for the run report
#[derive(Debug, Clone, Default, Serialize)]
pub struct StageCounts {
    /// Documents the crawl stage produced
    pub fetched: usize,
    /// Documents the cleaner processed successfully
    pub cleaned: usize,
    /// Documents removed by the exact dedupe pass
    pub deduped: usize,
    /// Documents removed by the semantic dedupe pass
    pub semantic_deduped: usize,
    /// Documents that received at least one enrichment feature
    pub enriched: usize,
}

/// Everything a run produced
#[derive(Debug, Serialize)]
pub struct PipelineReport {
    pub status: RunStatus,
    /// Documents surviving all stages
    pub processed: usize,
    pub stages: StageCounts,
    pub budget: Option<UsageReport>,
    pub documents: Vec<ExtractedDocument>,
}

/// Per-run knobs
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Enrichment features to apply; None lets the budget pick
    pub features: Option<Vec<String>>,
    pub priority: Priority,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            features: None,
            priority: Priority::Normal,
        }
    }
}

/// Orchestrates one fetch-to-report run
pub struct Pipeline {
    config: Config,
    engine: Arc<CostDecisionEngine>,
    cleaner: Box<dyn TextCleaner>,
    scorer: Option<Box<dyn SimilarityScorer>>,
    enricher: Option<Box<dyn Enricher>>,
}

impl Pipeline {
    /// Builds a pipeline with the local cleaner and no external services
    pub fn new(config: Config, engine: Arc<CostDecisionEngine>) -> Self {
        Self {
            config,
            engine,
            cleaner: Box::new(BasicCleaner),
            scorer: None,
            enricher: None,
        }
    }

    pub fn with_cleaner(mut self, cleaner: Box<dyn TextCleaner>) -> Self {
        self.cleaner = cleaner;
        self
    }

    /// Wires in a similarity scorer, enabling the semantic dedupe pass
    pub fn with_scorer(mut self, scorer: Box<dyn SimilarityScorer>) -> Self {
        self.scorer = Some(scorer);
        self
    }

    /// Wires in an enricher, enabling the enrichment stage
    pub fn with_enricher(mut self, enricher: Box<dyn Enricher>) -> Self {
        self.enricher = Some(enricher);
        self
    }

    /// Runs the full pipeline over the configured seeds
    pub async fn run(&self, options: &PipelineOptions) -> crate::Result<PipelineReport> {
        let mut stages = StageCounts::default();

        let mut documents = Vec::new();
        for seed in &self.config.seeds {
            let mut crawler =
                SiteCrawler::new(self.config.crawler.clone(), &self.config.user_agent)?;
            let outcome = crawler.crawl(seed).await?;
            tracing::info!("Seed {} yielded {} documents", seed, outcome.documents.len());
            documents.extend(outcome.documents);
        }
        stages.fetched = documents.len();

        if documents.is_empty() {
            tracing::warn!("Fetch produced no documents; skipping remaining stages");
            return Ok(PipelineReport {
                status: RunStatus::NoData,
                processed: 0,
                stages,
                budget: Some(self.engine.usage_report()?),
                documents: Vec::new(),
            });
        }

        if self.config.pipeline.clean {
            stages.cleaned = self.clean_stage(&mut documents).await;
        }

        if self.config.pipeline.dedupe {
            let (kept, exact_removed, semantic_removed) = self.dedupe_stage(documents).await?;
            documents = kept;
            stages.deduped = exact_removed;
            stages.semantic_deduped = semantic_removed;
        }

        if let Some(enricher) = &self.enricher {
            stages.enriched = self
                .enrich_stage(&mut documents, options, enricher.as_ref())
                .await?;
        }

        Ok(PipelineReport {
            status: RunStatus::Success,
            processed: documents.len(),
            stages,
            budget: Some(self.engine.usage_report()?),
            documents,
        })
    }

    /// Runs the cleaner over every document; a failure leaves the raw text
    /// in place
    async fn clean_stage(&self, documents: &mut [ExtractedDocument]) -> usize {
        let mut cleaned = 0;
        for doc in documents.iter_mut() {
            match self.cleaner.clean(&doc.text).await {
                Ok(text) => {
                    doc.cleaned_text = Some(text);
                    cleaned += 1;
                }
                Err(e) => {
                    tracing::warn!("Cleaning failed for {}: {}", doc.source_url, e);
                }
            }
        }
        cleaned
    }

    /// Exact pass always; semantic pass only when a scorer is wired in and
    /// the budget engine approves the batch
    async fn dedupe_stage(
        &self,
        documents: Vec<ExtractedDocument>,
    ) -> crate::Result<(Vec<ExtractedDocument>, usize, usize)> {
        let dedupe = Deduplicator::new(self.config.pipeline.semantic_threshold);

        let before = documents.len();
        let mut documents = dedupe.dedupe_exact(documents);
        let exact_removed = before - documents.len();

        let mut semantic_removed = 0;
        if let Some(scorer) = &self.scorer {
            let gate_count = documents.len().min(SEMANTIC_GATE_BATCH);
            let decision = self
                .engine
                .should_enable_feature("semantic_deduplication", gate_count)?;
            if decision.enabled {
                let before = documents.len();
                documents = dedupe.dedupe_semantic(documents, scorer.as_ref()).await;
                self.engine
                    .record_usage("semantic_similarity", gate_count as u64)?;
                semantic_removed = before - documents.len();
            }
        }

        Ok((documents, exact_removed, semantic_removed))
    }

    /// Picks enrichment features the budget can carry for this batch
    fn auto_features(&self, documents: &[ExtractedDocument]) -> crate::Result<Vec<String>> {
        let mut features = Vec::new();
        let count = documents.len();

        if self
            .engine
            .should_enable_feature("categorization", count)?
            .enabled
        {
            features.push("categorization".to_string());
        }

        // Keywords are sampled from half the batch, rounded down.
        if self
            .engine
            .should_enable_feature("keyword_extraction", count / 2)?
            .enabled
        {
            features.push("keyword_extraction".to_string());
        }

        let long_docs = documents
            .iter()
            .filter(|doc| doc.content().chars().count() > SUMMARY_MIN_CHARS)
            .count();
        if long_docs > 0
            && self
                .engine
                .should_enable_feature("summarization", long_docs)?
                .enabled
        {
            features.push("summarization".to_string());
        }

        Ok(features)
    }

    async fn enrich_stage(
        &self,
        documents: &mut [ExtractedDocument],
        options: &PipelineOptions,
        enricher: &dyn Enricher,
    ) -> crate::Result<usize> {
        let mut features = match &options.features {
            Some(features) => features.clone(),
            None => self.auto_features(documents)?,
        };
        features.retain(|feature| {
            let known = matches!(
                feature.as_str(),
                "categorization" | "summarization" | "keyword_extraction"
            );
            if !known {
                tracing::warn!("Ignoring unknown enrichment feature '{}'", feature);
            }
            known
        });

        if features.is_empty() {
            tracing::info!("No enrichment features selected");
            return Ok(0);
        }
        tracing::info!("Enrichment features: {}", features.join(", "));

        let mut enriched = 0;
        for doc in documents.iter_mut() {
            if !self
                .engine
                .should_use_llm_for_doc(doc, "categorize", options.priority)?
            {
                continue;
            }
            if self.enrich_doc(doc, &features, enricher).await? {
                doc.llm_enriched = true;
                enriched += 1;
            }
        }
        Ok(enriched)
    }

    /// Applies the selected features to one document; budget is reserved
    /// per call, so running dry mid-batch stops cleanly
    async fn enrich_doc(
        &self,
        doc: &mut ExtractedDocument,
        features: &[String],
        enricher: &dyn Enricher,
    ) -> crate::Result<bool> {
        let max_chars = self.config.pipeline.max_content_chars;
        let mut applied = false;

        for feature in features {
            match feature.as_str() {
                "categorization" => {
                    if !self.engine.reserve("categorize", 1)? {
                        continue;
                    }
                    let content = clip(doc.content(), max_chars);
                    match enricher.categorize(&content).await {
                        Ok(category) => {
                            doc.enrichment.category = Some(category);
                            applied = true;
                        }
                        Err(e) => {
                            tracing::warn!("Categorization failed for {}: {}", doc.source_url, e);
                        }
                    }
                }
                "keyword_extraction" => {
                    if !self.engine.reserve("extract_keywords", 1)? {
                        continue;
                    }
                    let content = clip(doc.content(), max_chars);
                    match enricher.extract_keywords(&content).await {
                        Ok(keywords) => {
                            doc.enrichment.keywords = keywords;
                            applied = true;
                        }
                        Err(e) => {
                            tracing::warn!(
                                "Keyword extraction failed for {}: {}",
                                doc.source_url,
                                e
                            );
                        }
                    }
                }
                "summarization" => {
                    if doc.content().chars().count() <= SUMMARY_MIN_CHARS {
                        continue;
                    }
                    if !self.engine.reserve("summarize", 1)? {
                        continue;
                    }
                    let content = clip(doc.content(), max_chars);
                    match enricher.summarize(&content).await {
                        Ok(summary) => {
                            doc.enrichment.summary = Some(summary);
                            applied = true;
                        }
                        Err(e) => {
                            tracing::warn!("Summarization failed for {}: {}", doc.source_url, e);
                        }
                    }
                }
                _ => {}
            }
        }

        Ok(applied)
    }
}

/// First `max` characters of a text, on a char boundary
fn clip(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}
