//! The cost decision engine
//!
//! All spend accounting goes through one service object guarding a daily
//! ledger behind a mutex. Callers ask three kinds of questions: can I
//! afford N calls, should this feature run for this batch, and is this
//! document worth LLM money at all.

use crate::budget::ledger::{BudgetLedger, OperationCostTable, OperationUsage};
use crate::budget::store::{LedgerStore, SqliteLedgerStore};
use crate::config::BudgetConfig;
use crate::document::ExtractedDocument;
use crate::LedgerError;
use chrono::Utc;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use url::Url;

/// Enrichment priority, set per call site
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Priority {
    High,
    Normal,
    Low,
}

/// Outcome of a feature gate check
#[derive(Debug, Clone, Serialize)]
pub struct FeatureDecision {
    pub enabled: bool,
    /// One of: within_budget, budget_exceeded, cost_too_high
    pub reason: String,
    /// Estimated cost of running the feature over the whole batch
    pub cost: f64,
    pub remaining_budget: f64,
}

/// Spending snapshot for reporting
#[derive(Debug, Clone, Serialize)]
pub struct UsageReport {
    pub date: String,
    pub daily_budget: f64,
    pub total_calls: u64,
    pub total_spent: f64,
    pub remaining_budget: f64,
    /// Share of the daily budget already spent, 0-100; zero when no budget
    /// is configured
    pub budget_used_percent: f64,
    pub operations: HashMap<String, OperationUsage>,
    /// healthy while more than 20% of the budget remains, low_budget after
    pub status: String,
}

struct EngineInner {
    daily_budget: f64,
    ledger: BudgetLedger,
    store: Box<dyn LedgerStore>,
}

/// Budget-aware gatekeeper for paid operations
pub struct CostDecisionEngine {
    costs: OperationCostTable,
    trusted_domains: Vec<String>,
    inner: Mutex<EngineInner>,
}

impl CostDecisionEngine {
    /// Opens the configured ledger database and resumes today's spending
    pub fn from_config(config: &BudgetConfig) -> Result<Self, LedgerError> {
        let store = SqliteLedgerStore::open(&config.ledger_path)?;
        Self::with_store(
            config.daily_budget,
            OperationCostTable::with_overrides(&config.cost_per_call),
            config.trusted_domains.clone(),
            Box::new(store),
        )
    }

    /// Builds an engine over an explicit store
    pub fn with_store(
        daily_budget: f64,
        costs: OperationCostTable,
        trusted_domains: Vec<String>,
        store: Box<dyn LedgerStore>,
    ) -> Result<Self, LedgerError> {
        let today = Utc::now().date_naive();
        let ledger = store
            .load_day(today)?
            .unwrap_or_else(|| BudgetLedger::new(today));

        Ok(Self {
            costs,
            trusted_domains,
            inner: Mutex::new(EngineInner {
                daily_budget,
                ledger,
                store,
            }),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, EngineInner>, LedgerError> {
        self.inner.lock().map_err(|_| LedgerError::Poisoned)
    }

    /// Swaps in today's ledger if the process crossed midnight
    fn roll_to_today(inner: &mut EngineInner) -> Result<(), LedgerError> {
        let today = Utc::now().date_naive();
        if inner.ledger.date != today {
            tracing::info!("Ledger day rolled over to {}", today);
            inner.ledger = inner
                .store
                .load_day(today)?
                .unwrap_or_else(|| BudgetLedger::new(today));
        }
        Ok(())
    }

    /// Unit cost for one call of an operation
    pub fn unit_cost(&self, operation: &str) -> f64 {
        self.costs.unit_cost(operation)
    }

    /// Budget left for today
    pub fn remaining_budget(&self) -> Result<f64, LedgerError> {
        let mut inner = self.lock()?;
        Self::roll_to_today(&mut inner)?;
        Ok((inner.daily_budget - inner.ledger.total_cost).max(0.0))
    }

    /// Whether `calls` more calls of an operation fit in today's budget
    pub fn can_afford(&self, operation: &str, calls: u64) -> Result<bool, LedgerError> {
        let cost = self.costs.unit_cost(operation) * calls as f64;
        let mut inner = self.lock()?;
        Self::roll_to_today(&mut inner)?;
        Ok(inner.ledger.total_cost + cost <= inner.daily_budget)
    }

    /// Records spending and persists the ledger; returns the cost charged
    pub fn record_usage(&self, operation: &str, calls: u64) -> Result<f64, LedgerError> {
        let cost = self.costs.unit_cost(operation) * calls as f64;
        let mut inner = self.lock()?;
        Self::roll_to_today(&mut inner)?;
        inner.ledger.record(operation, calls, cost);
        let ledger = inner.ledger.clone();
        inner.store.save_day(&ledger)?;
        tracing::debug!(
            "Recorded {} x{} (${:.4}), total today ${:.4}",
            operation,
            calls,
            cost,
            ledger.total_cost
        );
        Ok(cost)
    }

    /// Affordability check and charge under one lock
    ///
    /// Returns false (charging nothing) if the calls do not fit, so two
    /// concurrent callers can never jointly overrun the cap.
    pub fn reserve(&self, operation: &str, calls: u64) -> Result<bool, LedgerError> {
        let cost = self.costs.unit_cost(operation) * calls as f64;
        let mut inner = self.lock()?;
        Self::roll_to_today(&mut inner)?;

        if inner.ledger.total_cost + cost > inner.daily_budget {
            return Ok(false);
        }
        inner.ledger.record(operation, calls, cost);
        let ledger = inner.ledger.clone();
        inner.store.save_day(&ledger)?;
        Ok(true)
    }

    /// Gate for running a feature over a whole batch
    ///
    /// Disabled when the batch cost exceeds the remaining budget, and also
    /// when it would eat more than half of what remains, so one feature
    /// cannot drain the day on its own.
    pub fn should_enable_feature(
        &self,
        feature: &str,
        item_count: usize,
    ) -> Result<FeatureDecision, LedgerError> {
        let operation = feature_operation(feature);
        let cost = self.costs.unit_cost(operation) * item_count as f64;

        let mut inner = self.lock()?;
        Self::roll_to_today(&mut inner)?;
        let remaining = (inner.daily_budget - inner.ledger.total_cost).max(0.0);

        let (enabled, reason) = if cost > remaining {
            (false, "budget_exceeded")
        } else if cost > remaining * 0.5 {
            (false, "cost_too_high")
        } else {
            (true, "within_budget")
        };

        if !enabled {
            tracing::info!(
                "Feature '{}' disabled ({}): cost ${:.4}, remaining ${:.4}",
                feature,
                reason,
                cost,
                remaining
            );
        }

        Ok(FeatureDecision {
            enabled,
            reason: reason.to_string(),
            cost,
            remaining_budget: remaining,
        })
    }

    /// Scores how much a document deserves paid enrichment, in [0, 1]
    ///
    /// Starts from 0.5 and shifts on length, source trust, media, freshness,
    /// and paragraph structure.
    pub fn assess_document_value(&self, doc: &ExtractedDocument) -> f64 {
        let mut score: f64 = 0.5;
        let content = doc.content();
        let length = content.chars().count();

        if length > 2000 {
            score += 0.15;
        } else if length > 1000 {
            score += 0.10;
        }
        if length < 300 {
            score -= 0.20;
        }

        if self.is_trusted(&doc.source_url) {
            score += 0.15;
        }

        if doc.metadata.has_images {
            score += 0.05;
        }
        if doc.metadata.has_videos {
            score += 0.10;
        }

        if let Some(published) = doc.metadata.published_at {
            let age_days = (Utc::now() - published).num_days();
            if age_days <= 1 {
                score += 0.15;
            } else if age_days <= 7 {
                score += 0.10;
            } else if age_days > 30 {
                score -= 0.10;
            }
        }

        let paragraphs = content
            .split("\n\n")
            .filter(|p| !p.trim().is_empty())
            .count();
        if paragraphs >= 3 {
            score += 0.05;
        }

        score.clamp(0.0, 1.0)
    }

    /// Per-document gate for LLM enrichment
    ///
    /// `operation` is the call whose affordability anchors the decision;
    /// callers pass their cheapest intended operation. Nothing runs once
    /// the budget is spent. High-priority documents always qualify while
    /// money remains; normal and low priority must earn their value score.
    pub fn should_use_llm_for_doc(
        &self,
        doc: &ExtractedDocument,
        operation: &str,
        priority: Priority,
    ) -> Result<bool, LedgerError> {
        if !self.can_afford(operation, 1)? {
            return Ok(false);
        }

        let value = self.assess_document_value(doc);
        Ok(match priority {
            Priority::High => true,
            Priority::Normal => value >= 0.6,
            Priority::Low => value >= 0.8,
        })
    }

    /// How many of `total` items to process given what remains today
    ///
    /// The affordable count is clamped into [min_size, max_size] and never
    /// exceeds the batch itself.
    pub fn smart_sample_size(
        &self,
        operation: &str,
        total: usize,
        min_size: usize,
        max_size: usize,
    ) -> Result<usize, LedgerError> {
        let max_size = max_size.max(min_size);
        let unit = self.costs.unit_cost(operation);

        let mut inner = self.lock()?;
        Self::roll_to_today(&mut inner)?;
        let remaining = (inner.daily_budget - inner.ledger.total_cost).max(0.0);

        let affordable = if unit <= 0.0 {
            max_size
        } else {
            (remaining / unit).floor() as usize
        };

        Ok(affordable.clamp(min_size, max_size).min(total))
    }

    /// Snapshot of today's spending
    pub fn usage_report(&self) -> Result<UsageReport, LedgerError> {
        let mut inner = self.lock()?;
        Self::roll_to_today(&mut inner)?;
        let remaining = (inner.daily_budget - inner.ledger.total_cost).max(0.0);
        let status = if remaining > inner.daily_budget * 0.2 {
            "healthy"
        } else {
            "low_budget"
        };
        let used_percent = if inner.daily_budget > 0.0 {
            inner.ledger.total_cost / inner.daily_budget * 100.0
        } else {
            0.0
        };

        Ok(UsageReport {
            date: inner.ledger.date.format("%Y-%m-%d").to_string(),
            daily_budget: inner.daily_budget,
            total_calls: inner.ledger.total_calls,
            total_spent: inner.ledger.total_cost,
            remaining_budget: remaining,
            budget_used_percent: used_percent,
            operations: inner.ledger.operations.clone(),
            status: status.to_string(),
        })
    }

    /// Changes the daily cap for this process
    pub fn set_daily_budget(&self, budget: f64) -> Result<(), LedgerError> {
        let mut inner = self.lock()?;
        inner.daily_budget = budget;
        Ok(())
    }

    /// Wipes today's spending, in memory and in the store
    pub fn reset_daily_usage(&self) -> Result<(), LedgerError> {
        let mut inner = self.lock()?;
        inner.ledger = BudgetLedger::new(Utc::now().date_naive());
        let ledger = inner.ledger.clone();
        inner.store.save_day(&ledger)?;
        Ok(())
    }

    fn is_trusted(&self, source_url: &str) -> bool {
        let host = match Url::parse(source_url) {
            Ok(url) => url.host_str().map(|h| h.to_lowercase()),
            Err(_) => None,
        };
        let host = match host {
            Some(host) => host,
            None => return false,
        };
        self.trusted_domains.iter().any(|domain| {
            let domain = domain.to_lowercase();
            host == domain || host.ends_with(&format!(".{}", domain))
        })
    }
}

/// Maps a pipeline feature name to the operation it is billed as
fn feature_operation(feature: &str) -> &str {
    match feature {
        "categorization" => "categorize",
        "summarization" => "summarize",
        "keyword_extraction" => "extract_keywords",
        "topic_labeling" => "generate_label",
        "semantic_deduplication" => "semantic_similarity",
        other => other,
    }
}
