//! Sumi-Harvest main entry point
//!
//! This is the command-line interface for the Sumi-Harvest search harvester.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use sumi_harvest::config::{load_config_with_hash, validate_config, Config};
use sumi_harvest::crawler::{run_harvest, CancellationController, ContentExtractor, RunSummary};
use sumi_harvest::storage::{CheckpointFile, VisitedStore};
use tracing_subscriber::EnvFilter;

/// Sumi-Harvest: a resumable search-and-crawl harvester
///
/// Sumi-Harvest collects result links for a query from a search engine,
/// crawls each result to a bounded link depth, and appends the cleaned
/// text of every page to a CSV file. Interrupted runs resume from the
/// visited-URL checkpoint.
#[derive(Parser, Debug)]
#[command(name = "sumi-harvest")]
#[command(version = "1.0.0")]
#[command(about = "A resumable search-and-crawl harvester", long_about = None)]
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

    /// Ignore the visited-URL checkpoint and crawl everything again
    #[arg(long)]
    fresh: bool,

    /// Validate config and show the planned run without fetching anything
    #[arg(long)]
    dry_run: bool,

    /// Override the configured search query
    #[arg(long, value_name = "TEXT")]
    query: Option<String>,

    /// Override the configured regions (repeatable)
    #[arg(long = "region", value_name = "CODE")]
    regions: Vec<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (mut config, hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", hash);

    if apply_overrides(&mut config, cli.query, cli.regions) {
        validate_config(&config).context("invalid command-line override")?;
    }

    if cli.dry_run {
        handle_dry_run(&config, cli.fresh)
    } else {
        handle_harvest(config, cli.fresh).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sumi_harvest=info,warn"),
            1 => EnvFilter::new("sumi_harvest=debug,info"),
            2 => EnvFilter::new("sumi_harvest=trace,debug"),
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

/// Applies `--query` and `--region`; returns true if anything changed
fn apply_overrides(config: &mut Config, query: Option<String>, regions: Vec<String>) -> bool {
    let mut changed = false;

    if let Some(query) = query {
        config.search.query = query;
        changed = true;
    }
    if !regions.is_empty() {
        config.search.regions = regions;
        changed = true;
    }

    changed
}

/// Handles the --dry-run mode: validates config and shows the planned run
fn handle_dry_run(config: &Config, fresh: bool) -> anyhow::Result<()> {
    let profile = config.search.profile();
    let extractor = ContentExtractor::from_config(&config.crawler);

    println!("=== Sumi-Harvest Dry Run ===\n");

    println!("Search:");
    println!("  Engine: {:?}", config.search.engine);
    println!("  Query: {}", config.search.query);
    println!("  Max pages per region: {}", config.search.max_pages);
    println!("  Results selector: {}", profile.results_selector);
    println!("  Result links: {}", profile.result_link_selector);
    println!("  Next page: {}", profile.next_page_selector);

    println!("\nRegions ({}):", config.search.regions.len());
    for region in &config.search.regions {
        let first_page = profile.page_url(&config.search.query, region, 0)?;
        println!("  - {}: {}", region, first_page);
    }

    println!("\nCrawler:");
    println!("  Max depth: {} link-hops", config.crawler.max_depth);
    println!("  Extractor: {:?}", config.crawler.extractor);
    println!("  Content cap: {} characters", extractor.max_chars());
    println!("  Removed elements: {}", extractor.removed_tags().join(", "));
    println!("  Page timeout: {}ms", config.crawler.page_timeout_ms);
    println!(
        "  Delay: {}-{}ms",
        config.crawler.delay_min_ms, config.crawler.delay_max_ms
    );
    if !config.crawler.seeds.is_empty() {
        println!("  Extra seeds ({}):", config.crawler.seeds.len());
        for seed in &config.crawler.seeds {
            println!("    * {}", seed);
        }
    }

    println!("\nUser Agent:");
    println!("  Agents: {}", config.user_agent.agents.len());
    println!("  Rotate: {}", config.user_agent.rotate);

    println!("\nOutput:");
    println!("  Records: {}", config.output.records_path);
    println!("  Checkpoint: {}", config.output.visited_path);

    let visited = CheckpointFile::new(&config.output.visited_path)
        .load()
        .context("failed to read checkpoint")?;

    println!("\n✓ Configuration is valid");
    if fresh {
        println!("✓ Would ignore {} checkpointed URLs", visited.len());
    } else {
        println!("✓ Would skip {} already-visited URLs", visited.len());
    }

    Ok(())
}

/// Handles the main harvest operation
async fn handle_harvest(config: Config, fresh: bool) -> anyhow::Result<()> {
    if fresh {
        tracing::info!("Starting fresh harvest (ignoring checkpoint)");
    } else {
        tracing::info!("Starting harvest (will resume from checkpoint if present)");
    }

    let controller = CancellationController::new();
    let listener = controller.listen_for_interrupt();

    let result = run_harvest(config, fresh, controller.token()).await;
    listener.abort();

    match result {
        Ok(summary) => {
            print_summary(&summary);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Harvest failed: {}", e);
            Err(e.into())
        }
    }
}

fn print_summary(summary: &RunSummary) {
    println!("\n=== Harvest Summary ===\n");
    println!("Regions searched:  {}", summary.regions_searched);
    println!("Result pages:      {}", summary.search_pages);
    println!("Result URLs:       {}", summary.search_results);
    println!("Seeds crawled:     {}", summary.seeds_crawled);
    println!("Records written:   {}", summary.crawl.records_written);
    println!("Pages failed:      {}", summary.crawl.pages_failed);
    println!("Visited URLs:      {}", summary.visited_total);
    println!("Elapsed:           {:.1}s", summary.elapsed.as_secs_f64());

    if summary.blocked {
        println!("\n! Stopped early: the search engine served a verification page");
    }
    if summary.cancelled {
        println!("\n! Interrupted: progress saved, rerun to resume");
    }
}
