//! Configuration loading and validation
//!
//! Configuration is a TOML file with sections for the crawler, the user
//! agent, the budget engine, and the pipeline, plus a list of seed URLs.

mod parser;
mod types;
mod validation;

pub use parser::{compute_config_hash, load_config, load_config_with_hash};
pub use types::{BudgetConfig, Config, CrawlConfig, PipelineConfig, UserAgentConfig};
pub use validation::validate;
