//! Two-stage deduplication
//!
//! Stage one is free: a content-hash pass that removes byte-identical
//! articles. Stage two costs money: pairwise similarity scoring through an
//! external scorer, so the pipeline only runs it when the budget engine
//! signs off.

use crate::document::ExtractedDocument;
use async_trait::async_trait;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::{HashMap, HashSet};

/// Documents shorter than this skip the semantic pass entirely
const MIN_SEMANTIC_LEN: usize = 200;

/// Pairwise scoring happens within batches of this size
const SEMANTIC_BATCH: usize = 50;

/// Scores how similar two article texts are, in [0, 1]
///
/// Backed by an external embedding or LLM service in production; tests
/// plug in deterministic fakes.
#[async_trait]
pub trait SimilarityScorer: Send + Sync {
    async fn score(&self, a: &str, b: &str) -> crate::Result<f64>;
}

/// A set of URLs sharing one exact content hash
#[derive(Debug, Clone, Serialize)]
pub struct DuplicateGroup {
    pub hash: String,
    pub urls: Vec<String>,
}

/// Removes exact and near-duplicate documents from a batch
#[derive(Debug, Clone)]
pub struct Deduplicator {
    threshold: f64,
}

impl Deduplicator {
    /// Creates a deduplicator with the given semantic similarity threshold
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    /// Exact pass: first occurrence of each content hash wins
    ///
    /// Order-preserving and idempotent. Hashing normalizes case and outer
    /// whitespace so trivially reformatted copies still collide.
    pub fn dedupe_exact(&self, docs: Vec<ExtractedDocument>) -> Vec<ExtractedDocument> {
        let before = docs.len();
        let mut seen = HashSet::new();
        let kept: Vec<ExtractedDocument> = docs
            .into_iter()
            .filter(|doc| seen.insert(content_hash(doc)))
            .collect();

        if kept.len() < before {
            tracing::info!("Exact dedupe removed {} of {} documents", before - kept.len(), before);
        }
        kept
    }

    /// Semantic pass: collapses near-duplicates under the scorer
    ///
    /// Documents under the length floor pass through untouched. Candidates
    /// are scored pairwise within fixed-size batches; a document joins the
    /// first group whose leader scores at or above the threshold. Each
    /// group survives as its longest member, emitted at the leader's
    /// position so output order stays stable. A scorer failure on a pair
    /// is logged and treated as "not similar".
    pub async fn dedupe_semantic(
        &self,
        docs: Vec<ExtractedDocument>,
        scorer: &dyn SimilarityScorer,
    ) -> Vec<ExtractedDocument> {
        let before = docs.len();
        let mut slots: Vec<Option<ExtractedDocument>> = docs.into_iter().map(Some).collect();

        let candidates: Vec<usize> = (0..slots.len())
            .filter(|&i| {
                slots[i]
                    .as_ref()
                    .map(|doc| doc.content().chars().count() >= MIN_SEMANTIC_LEN)
                    .unwrap_or(false)
            })
            .collect();

        for chunk in candidates.chunks(SEMANTIC_BATCH) {
            let groups = self.group_chunk(chunk, &slots, scorer).await;

            for group in groups {
                if group.len() < 2 {
                    continue;
                }
                let leader = group[0];
                let representative = group
                    .iter()
                    .copied()
                    .max_by_key(|&i| {
                        slots[i]
                            .as_ref()
                            .map(|doc| doc.content().chars().count())
                            .unwrap_or(0)
                    })
                    .unwrap_or(leader);

                let kept = slots[representative].take();
                for &i in &group {
                    if i != representative {
                        slots[i] = None;
                    }
                }
                slots[leader] = kept;
            }
        }

        let kept: Vec<ExtractedDocument> = slots.into_iter().flatten().collect();
        if kept.len() < before {
            tracing::info!(
                "Semantic dedupe removed {} of {} documents",
                before - kept.len(),
                before
            );
        }
        kept
    }

    /// Groups one batch of candidate indices by leader similarity
    async fn group_chunk(
        &self,
        chunk: &[usize],
        slots: &[Option<ExtractedDocument>],
        scorer: &dyn SimilarityScorer,
    ) -> Vec<Vec<usize>> {
        let mut groups: Vec<Vec<usize>> = Vec::new();

        for &i in chunk {
            let doc = match slots[i].as_ref() {
                Some(doc) => doc,
                None => continue,
            };

            let mut placed = false;
            for group in &mut groups {
                let leader = match slots[group[0]].as_ref() {
                    Some(leader) => leader,
                    None => continue,
                };
                match scorer.score(leader.content(), doc.content()).await {
                    Ok(score) if score >= self.threshold => {
                        tracing::debug!(
                            "Near-duplicate ({:.2}): {} ~ {}",
                            score,
                            leader.source_url,
                            doc.source_url
                        );
                        group.push(i);
                        placed = true;
                        break;
                    }
                    Ok(_) => {}
                    Err(e) => {
                        tracing::warn!(
                            "Similarity scoring failed for {} vs {}: {}",
                            leader.source_url,
                            doc.source_url,
                            e
                        );
                    }
                }
            }
            if !placed {
                groups.push(vec![i]);
            }
        }

        groups
    }

    /// Reports exact-hash collisions without removing anything
    pub fn find_duplicates(&self, docs: &[ExtractedDocument]) -> Vec<DuplicateGroup> {
        let mut by_hash: HashMap<String, Vec<String>> = HashMap::new();
        for doc in docs {
            by_hash
                .entry(content_hash(doc))
                .or_default()
                .push(doc.source_url.clone());
        }

        let mut groups: Vec<DuplicateGroup> = by_hash
            .into_iter()
            .filter(|(_, urls)| urls.len() > 1)
            .map(|(hash, urls)| DuplicateGroup { hash, urls })
            .collect();
        groups.sort_by(|a, b| a.hash.cmp(&b.hash));
        groups
    }
}

/// SHA-256 over the lowercased, trimmed document content
pub fn content_hash(doc: &ExtractedDocument) -> String {
    let normalized = doc.content().trim().to_lowercase();
    let mut hasher = Sha256::new();
    hasher.update(normalized.as_bytes());
    hex::encode(hasher.finalize())
}
