//! Harvest coordinator - main run orchestration logic
//!
//! This module ties the phases of a run together:
//! - Loading the visited-URL checkpoint (unless starting fresh)
//! - Harvesting result URLs for every configured region
//! - Crawling each result URL, then any configured seeds
//! - Saving the checkpoint and closing the driver on every exit path

use crate::config::Config;
use crate::crawler::engine::{CrawlEngine, CrawlReport, CrawlSettings};
use crate::crawler::extractor::ContentExtractor;
use crate::crawler::harvester::{HarvestStop, SearchHarvester};
use crate::crawler::pacing::{DelayPolicy, Pacing, UserAgentRotation};
use crate::driver::{HttpPageDriver, PageDriver};
use crate::storage::{CheckpointFile, CsvRecordStore, RecordSink, VisitedSet, VisitedStore};
use crate::{HarvestError, Result};
use std::path::Path;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

/// Totals for a whole run
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub regions_searched: u32,
    pub search_pages: u32,
    /// Unique result URLs summed over regions
    pub search_results: u64,
    pub seeds_crawled: u64,
    pub crawl: CrawlReport,
    /// Size of the visited set when the run ended
    pub visited_total: usize,
    pub cancelled: bool,
    /// A verification page cut the run short
    pub blocked: bool,
    pub elapsed: Duration,
}

/// Main harvest coordinator structure
pub struct Coordinator<D: PageDriver, V: VisitedStore, S: RecordSink> {
    config: Config,
    driver: D,
    checkpoint: V,
    sink: S,
    visited: VisitedSet,
    cancel: CancellationToken,
}

impl Coordinator<HttpPageDriver, CheckpointFile, CsvRecordStore> {
    /// Creates a coordinator backed by HTTP and the configured output files
    ///
    /// # Arguments
    ///
    /// * `config` - The validated configuration
    /// * `fresh` - Ignore the existing checkpoint and start with nothing visited
    /// * `cancel` - Token that stops the run when cancelled
    pub fn new(config: Config, fresh: bool, cancel: CancellationToken) -> Result<Self> {
        let agents = UserAgentRotation::from_config(&config.user_agent);
        let driver = HttpPageDriver::new(agents.primary(), config.crawler.page_timeout())
            .map_err(HarvestError::DriverInit)?;

        let checkpoint = CheckpointFile::new(&config.output.visited_path);
        let sink = CsvRecordStore::open(Path::new(&config.output.records_path))?;

        Self::with_parts(config, driver, checkpoint, sink, fresh, cancel)
    }
}

impl<D: PageDriver, V: VisitedStore, S: RecordSink> Coordinator<D, V, S> {
    /// Creates a coordinator from explicit parts
    pub fn with_parts(
        config: Config,
        driver: D,
        checkpoint: V,
        sink: S,
        fresh: bool,
        cancel: CancellationToken,
    ) -> Result<Self> {
        let visited = if fresh {
            tracing::info!("Fresh run requested, ignoring existing checkpoint");
            VisitedSet::new()
        } else {
            let visited = checkpoint.load()?;
            if visited.is_empty() {
                tracing::info!("No checkpoint found, starting new run");
            } else {
                tracing::info!("Resuming with {} previously visited URLs", visited.len());
            }
            visited
        };

        Ok(Self {
            config,
            driver,
            checkpoint,
            sink,
            visited,
            cancel,
        })
    }

    pub fn visited(&self) -> &VisitedSet {
        &self.visited
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Runs the search and crawl phases
    ///
    /// The checkpoint is saved and the driver closed however the run ends,
    /// including cancellation and storage failure.
    pub async fn run(&mut self) -> Result<RunSummary> {
        let start_time = Instant::now();
        let mut summary = RunSummary::default();

        tracing::info!(
            "Starting harvest for '{}' across {} regions",
            self.config.search.query,
            self.config.search.regions.len()
        );

        let outcome = self.harvest_and_crawl(&mut summary).await;

        if self.cancel.is_cancelled() {
            tracing::warn!("Run cancelled, saving checkpoint");
        }
        let saved = self.checkpoint.save(&self.visited);
        if let Err(e) = self.driver.close().await {
            tracing::warn!("Failed to close page driver: {}", e);
        }

        outcome?;
        saved?;

        summary.visited_total = self.visited.len();
        summary.cancelled = self.cancel.is_cancelled();
        summary.elapsed = start_time.elapsed();

        tracing::info!(
            "Harvest finished: {} records written, {} pages failed in {:?}",
            summary.crawl.records_written,
            summary.crawl.pages_failed,
            summary.elapsed
        );

        Ok(summary)
    }

    async fn harvest_and_crawl(&mut self, summary: &mut RunSummary) -> Result<()> {
        let search = self.config.search.clone();
        let profile = search.profile();
        let pacing = Pacing::new(
            DelayPolicy::new(profile.delay_min, profile.delay_max),
            UserAgentRotation::from_config(&self.config.user_agent),
        );

        for region in &search.regions {
            if self.cancel.is_cancelled() {
                return Ok(());
            }

            tracing::info!("Searching '{}' in region {}", search.query, region);
            let outcome = SearchHarvester::new(
                &mut self.driver,
                profile.clone(),
                search.max_pages,
                pacing.clone(),
            )
            .harvest(&search.query, region, &self.cancel)
            .await;

            summary.regions_searched += 1;
            summary.search_pages += outcome.pages_fetched;
            summary.search_results += outcome.results.len() as u64;
            summary.blocked |= outcome.stop == HarvestStop::Blocked;

            tracing::info!(
                "Region {}: {} result URLs from {} pages ({})",
                region,
                outcome.results.len(),
                outcome.pages_fetched,
                outcome.stop
            );

            if !self.crawl_seeds(outcome.results.into_urls(), summary).await? {
                return Ok(());
            }
        }

        let seeds = self.config.crawler.seeds.clone();
        if !seeds.is_empty() && !self.cancel.is_cancelled() {
            tracing::info!("Crawling {} configured seeds", seeds.len());
            self.crawl_seeds(seeds, summary).await?;
        }

        Ok(())
    }

    /// Crawls each seed in turn
    ///
    /// Returns false once the run has to stop.
    async fn crawl_seeds(&mut self, seeds: Vec<String>, summary: &mut RunSummary) -> Result<bool> {
        let crawler = &self.config.crawler;
        let seed_pause = DelayPolicy::from_millis(crawler.seed_pause_min_ms, crawler.seed_pause_max_ms);
        let batch_size = u64::from(crawler.seed_batch_size);
        let pacing = Pacing::new(
            DelayPolicy::from_millis(crawler.delay_min_ms, crawler.delay_max_ms),
            UserAgentRotation::from_config(&self.config.user_agent),
        );

        let mut engine = CrawlEngine::new(
            &mut self.driver,
            &mut self.sink,
            ContentExtractor::from_config(crawler),
            CrawlSettings::from_config(crawler),
            pacing,
        );

        for seed in seeds {
            if self.cancel.is_cancelled() {
                return Ok(false);
            }

            let report = engine.crawl(&seed, &mut self.visited, &self.cancel).await?;
            summary.crawl.absorb(&report);
            summary.seeds_crawled += 1;

            if report.blocked {
                tracing::warn!("Stopping run after verification page");
                summary.blocked = true;
                return Ok(false);
            }
            if report.cancelled {
                return Ok(false);
            }

            if summary.seeds_crawled % 10 == 0 {
                tracing::info!(
                    "Progress: {} seeds crawled, {} records written, {} URLs visited",
                    summary.seeds_crawled,
                    summary.crawl.records_written,
                    self.visited.len()
                );
            }

            if batch_size > 0 && summary.seeds_crawled % batch_size == 0 {
                tracing::debug!("Pausing after {} seeds", summary.seeds_crawled);
                seed_pause.pause(&self.cancel).await;
            }
        }

        Ok(true)
    }
}

/// Runs a complete harvest over HTTP with the configured output files
///
/// # Example
///
/// ```no_run
/// use sumi_harvest::config::load_config;
/// use sumi_harvest::crawler::{run_harvest, CancellationController};
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("harvest.toml"))?;
/// let controller = CancellationController::new();
/// let summary = run_harvest(config, false, controller.token()).await?;
/// println!("{} records written", summary.crawl.records_written);
/// # Ok(())
/// # }
/// ```
pub async fn run_harvest(
    config: Config,
    fresh: bool,
    cancel: CancellationToken,
) -> Result<RunSummary> {
    let mut coordinator = Coordinator::new(config, fresh, cancel)?;
    coordinator.run().await
}
