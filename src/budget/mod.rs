//! Daily budget accounting and cost-aware decisions

mod engine;
mod ledger;
mod store;

pub use engine::{CostDecisionEngine, FeatureDecision, Priority, UsageReport};
pub use ledger::{BudgetLedger, OperationCostTable, OperationUsage};
pub use store::{LedgerStore, SqliteLedgerStore};
