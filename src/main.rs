//! Newsdrift main entry point
//!
//! Command-line interface for the budget-bounded news crawler.

use clap::Parser;
use newsdrift::budget::CostDecisionEngine;
use newsdrift::config::load_config_with_hash;
use newsdrift::pipeline::{Pipeline, PipelineOptions, RunStatus};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Newsdrift: a budget-bounded, polite news crawler
///
/// Crawls configured news sites while respecting robots.txt and rate
/// limits, removes duplicate articles, and spends a capped daily budget
/// on LLM enrichment.
#[derive(Parser, Debug)]
#[command(name = "newsdrift")]
#[command(version = "0.3.0")]
#[command(about = "A budget-bounded polite news crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would run without fetching anything
    #[arg(long, conflicts_with_all = ["report", "set_budget"])]
    dry_run: bool,

    /// Show today's budget usage and exit
    #[arg(long, conflicts_with_all = ["dry_run", "set_budget"])]
    report: bool,

    /// Change the daily budget (USD) for this process before running
    #[arg(long, value_name = "USD")]
    set_budget: Option<f64>,

    /// Print the full run report as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let config = match load_config_with_hash(&cli.config) {
        Ok((config, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    if cli.dry_run {
        handle_dry_run(&config)?;
        return Ok(());
    }

    let engine = Arc::new(CostDecisionEngine::from_config(&config.budget)?);
    if let Some(budget) = cli.set_budget {
        engine.set_daily_budget(budget)?;
        tracing::info!("Daily budget set to ${:.2}", budget);
    }

    if cli.report {
        handle_report(&engine)?;
    } else {
        handle_run(config, engine, cli.json).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("newsdrift=info,warn"),
            1 => EnvFilter::new("newsdrift=debug,info"),
            2 => EnvFilter::new("newsdrift=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles --dry-run: validates config and shows what would run
fn handle_dry_run(config: &newsdrift::Config) -> anyhow::Result<()> {
    println!("=== Newsdrift Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Max pages: {}", config.crawler.max_pages);
    println!("  Max depth: {}", config.crawler.max_depth);
    println!("  Follow links: {}", config.crawler.follow_links);
    println!("  Respect robots.txt: {}", config.crawler.respect_robots);
    println!("  Use sitemaps: {}", config.crawler.use_sitemap);
    println!("  Delay between fetches: {}ms", config.crawler.delay_ms);
    println!("  Minimum content length: {}", config.crawler.min_length);

    println!("\nUser Agent:");
    println!("  {}", config.user_agent.header_value());

    println!("\nBudget:");
    println!("  Daily budget: ${:.2}", config.budget.daily_budget);
    println!("  Ledger: {}", config.budget.ledger_path);
    println!(
        "  Trusted domains: {}",
        config.budget.trusted_domains.len()
    );

    println!("\nPipeline:");
    println!("  Clean: {}", config.pipeline.clean);
    println!("  Dedupe: {}", config.pipeline.dedupe);
    println!(
        "  Semantic threshold: {:.2}",
        config.pipeline.semantic_threshold
    );

    println!("\nSeeds ({}):", config.seeds.len());
    for seed in &config.seeds {
        println!("  - {}", seed);
    }

    println!("\n✓ Configuration is valid");
    println!("✓ Would crawl {} seed URLs", config.seeds.len());

    Ok(())
}

/// Handles --report: prints today's budget usage
fn handle_report(engine: &CostDecisionEngine) -> anyhow::Result<()> {
    let report = engine.usage_report()?;

    println!("=== Budget Report for {} ===\n", report.date);
    println!("Status: {}", report.status);
    println!(
        "Spent: ${:.4} of ${:.2} ({} calls, {:.1}% used)",
        report.total_spent, report.daily_budget, report.total_calls, report.budget_used_percent
    );
    println!("Remaining: ${:.4}", report.remaining_budget);

    if !report.operations.is_empty() {
        println!("\nBy operation:");
        let mut operations: Vec<_> = report.operations.iter().collect();
        operations.sort_by(|a, b| a.0.cmp(b.0));
        for (operation, usage) in operations {
            println!(
                "  {:<22} {:>6} calls  ${:.4}",
                operation, usage.calls, usage.cost
            );
        }
    }

    Ok(())
}

/// Handles the main pipeline run
async fn handle_run(
    config: newsdrift::Config,
    engine: Arc<CostDecisionEngine>,
    json: bool,
) -> anyhow::Result<()> {
    tracing::info!(
        "Starting pipeline over {} seeds (daily budget ${:.2})",
        config.seeds.len(),
        config.budget.daily_budget
    );

    let pipeline = Pipeline::new(config, engine);
    let report = pipeline.run(&PipelineOptions::default()).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    match report.status {
        RunStatus::NoData => {
            println!("No documents fetched; nothing to process.");
        }
        RunStatus::Success => {
            println!("=== Run Complete ===\n");
            println!("Documents processed: {}", report.processed);
            println!("  Fetched:           {}", report.stages.fetched);
            println!("  Cleaned:           {}", report.stages.cleaned);
            println!("  Exact duplicates:  {}", report.stages.deduped);
            println!("  Near duplicates:   {}", report.stages.semantic_deduped);
            println!("  Enriched:          {}", report.stages.enriched);

            if let Some(budget) = &report.budget {
                println!(
                    "\nBudget: ${:.4} spent, ${:.4} remaining ({})",
                    budget.total_spent, budget.remaining_budget, budget.status
                );
            }
        }
    }

    Ok(())
}
