//! Daily spend ledger and per-operation unit costs

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashMap;

/// Usage recorded against one operation for one day
#[derive(Debug, Clone, Default, Serialize)]
pub struct OperationUsage {
    pub calls: u64,
    pub cost: f64,
}

/// One day's spending, the unit the store persists
#[derive(Debug, Clone, Serialize)]
pub struct BudgetLedger {
    pub date: NaiveDate,
    pub total_calls: u64,
    pub total_cost: f64,
    pub operations: HashMap<String, OperationUsage>,
}

impl BudgetLedger {
    /// Creates an empty ledger for a day
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            total_calls: 0,
            total_cost: 0.0,
            operations: HashMap::new(),
        }
    }

    /// Adds calls and cost to an operation's running totals
    pub fn record(&mut self, operation: &str, calls: u64, cost: f64) {
        let usage = self.operations.entry(operation.to_string()).or_default();
        usage.calls += calls;
        usage.cost += cost;
        self.total_calls += calls;
        self.total_cost += cost;
    }
}

/// Per-call prices for the operations the enricher and scorer perform
///
/// Prices reflect typical token volumes per call; a config override wins
/// over the built-in default, and an operation nobody priced falls back
/// to a conservative default.
#[derive(Debug, Clone)]
pub struct OperationCostTable {
    costs: HashMap<String, f64>,
    default_cost: f64,
}

impl OperationCostTable {
    /// Builds the table from defaults plus config overrides
    pub fn with_overrides(overrides: &HashMap<String, f64>) -> Self {
        let mut costs: HashMap<String, f64> = [
            ("categorize", 0.003),
            ("summarize", 0.01),
            ("extract_keywords", 0.005),
            ("generate_label", 0.01),
            ("generate_description", 0.02),
            ("semantic_similarity", 0.005),
            ("topic_refinement", 0.05),
        ]
        .into_iter()
        .map(|(op, cost)| (op.to_string(), cost))
        .collect();

        for (operation, cost) in overrides {
            costs.insert(operation.clone(), *cost);
        }

        Self {
            costs,
            default_cost: 0.01,
        }
    }

    /// Unit cost for one call of an operation
    pub fn unit_cost(&self, operation: &str) -> f64 {
        self.costs
            .get(operation)
            .copied()
            .unwrap_or(self.default_cost)
    }
}

impl Default for OperationCostTable {
    fn default() -> Self {
        Self::with_overrides(&HashMap::new())
    }
}
