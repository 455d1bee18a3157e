use crate::config::types::{BudgetConfig, Config, CrawlConfig, PipelineConfig, UserAgentConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawl_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_budget_config(&config.budget)?;
    validate_pipeline_config(&config.pipeline)?;
    validate_seeds(&config.seeds)?;
    Ok(())
}

/// Validates crawl configuration
fn validate_crawl_config(config: &CrawlConfig) -> Result<(), ConfigError> {
    if config.max_pages < 1 {
        return Err(ConfigError::Validation(format!(
            "max_pages must be >= 1, got {}",
            config.max_pages
        )));
    }

    if config.timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "timeout_secs must be >= 1, got {}",
            config.timeout_secs
        )));
    }

    if config.min_length == 0 {
        return Err(ConfigError::Validation(
            "min_length must be >= 1; a zero floor accepts empty extractions".to_string(),
        ));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;

    validate_email(&config.contact_email)?;

    Ok(())
}

/// Validates budget configuration
fn validate_budget_config(config: &BudgetConfig) -> Result<(), ConfigError> {
    if config.daily_budget < 0.0 {
        return Err(ConfigError::Validation(format!(
            "daily_budget must be >= 0, got {}",
            config.daily_budget
        )));
    }

    if config.ledger_path.is_empty() {
        return Err(ConfigError::Validation(
            "ledger_path cannot be empty".to_string(),
        ));
    }

    for (operation, cost) in &config.cost_per_call {
        if *cost < 0.0 {
            return Err(ConfigError::Validation(format!(
                "cost_per_call for '{}' must be >= 0, got {}",
                operation, cost
            )));
        }
    }

    Ok(())
}

/// Validates pipeline configuration
fn validate_pipeline_config(config: &PipelineConfig) -> Result<(), ConfigError> {
    if !(0.0..=1.0).contains(&config.semantic_threshold) {
        return Err(ConfigError::Validation(format!(
            "semantic_threshold must be within [0, 1], got {}",
            config.semantic_threshold
        )));
    }

    if config.max_content_chars < 1 {
        return Err(ConfigError::Validation(
            "max_content_chars must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates that every seed parses as an HTTP(S) URL
fn validate_seeds(seeds: &[String]) -> Result<(), ConfigError> {
    for seed in seeds {
        let url = Url::parse(seed)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid seed '{}': {}", seed, e)))?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ConfigError::InvalidUrl(format!(
                "Seed '{}' must use http or https",
                seed
            )));
        }
    }
    Ok(())
}

/// Basic email validation: one '@' with non-empty local part and a dotted domain
fn validate_email(email: &str) -> Result<(), ConfigError> {
    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 || parts[0].is_empty() || !parts[1].contains('.') {
        return Err(ConfigError::Validation(format!(
            "Invalid contact_email: '{}'",
            email
        )));
    }
    Ok(())
}
