//! News-Archiver main entry point
//!
//! This is the command-line interface for the News-Archiver crawler.

use clap::Parser;
use news_archiver::config::load_config_with_hash;
use news_archiver::{Config, CrawlEngine};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// News-Archiver: an incremental news article crawler
///
/// News-Archiver repeatedly sweeps a publisher's site, discovers article
/// pages by URL shape, extracts their structured data, and files them into
/// a per-category CSV archive on disk.
#[derive(Parser, Debug)]
#[command(name = "news-archiver")]
#[command(version = "1.0.0")]
#[command(about = "An incremental news article crawler", long_about = None)]
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

    /// Run a single crawl cycle and exit instead of scheduling
    #[arg(long, conflicts_with = "dry_run")]
    once: bool,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long, conflicts_with = "once")]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, _config_hash) = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (cfg, hash)
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    if cli.dry_run {
        handle_dry_run(&config)?;
    } else if cli.once {
        handle_once(&config).await?;
    } else {
        handle_schedule(&config).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("news_archiver=info,warn"),
            1 => EnvFilter::new("news_archiver=debug,info"),
            2 => EnvFilter::new("news_archiver=trace,debug"),
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

/// Handles the --dry-run mode: validates config and shows what would be crawled
fn handle_dry_run(config: &Config) -> anyhow::Result<()> {
    let publisher = config.active_publisher()?;

    println!("=== News-Archiver Dry Run ===\n");

    println!("Crawl Settings:");
    println!("  Active publisher: {}", config.settings.active_publisher);
    println!("  Max URLs per cycle: {}", config.settings.max_urls_per_cycle);
    println!("  Max retries: {}", config.settings.max_retries);
    println!("  Request delay: {}ms", config.settings.request_delay_ms);
    println!("  Retry delay: {}ms", config.settings.retry_delay_ms);
    println!(
        "  Crawl interval: {} minutes",
        config.settings.crawl_interval_minutes
    );

    println!("\nActive Publisher:");
    println!("  Name: {}", publisher.name);
    println!("  Start URL: {}", publisher.start_url);
    println!("  Article pattern: {}", publisher.article_url_pattern);
    println!("  Category pattern: {}", publisher.category_url_pattern);
    println!("  Freshness window: {} days", publisher.freshness_window_days);
    println!(
        "  Depths: steady-state {}, shallow-archive {}",
        publisher.steady_state_depth, publisher.shallow_archive_depth
    );

    println!("\nOutput:");
    println!("  Data directory: {}", config.output.data_dir);

    println!("\nConfigured Publishers ({}):", config.publisher.len());
    for p in &config.publisher {
        println!("  - {} ({})", p.name, p.start_url);
    }

    println!("\n✓ Configuration is valid");
    println!("✓ Would crawl from: {}", publisher.start_url);

    Ok(())
}

/// Handles the --once mode: one crawl cycle, then exit
async fn handle_once(config: &Config) -> anyhow::Result<()> {
    let mut engine = CrawlEngine::new(config)?;
    let stats = engine.crawl().await;
    tracing::info!(
        "Cycle finished: {} URLs processed, {} articles stored, {} stale, {} failed",
        stats.urls_processed,
        stats.articles_stored,
        stats.articles_skipped_stale,
        stats.articles_failed
    );
    Ok(())
}

/// Runs crawl cycles on a fixed schedule until interrupted
///
/// Cycles never overlap: if a tick fires while the previous cycle still
/// holds the engine, that tick is skipped rather than queued.
async fn handle_schedule(config: &Config) -> anyhow::Result<()> {
    let interval_minutes = config.settings.crawl_interval_minutes;
    tracing::info!(
        "Scheduling crawl every {} minutes for publisher: {}",
        interval_minutes,
        config.settings.active_publisher
    );

    let engine = Arc::new(Mutex::new(CrawlEngine::new(config)?));

    let mut ticker = tokio::time::interval(Duration::from_secs(interval_minutes * 60));
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;

        let engine = Arc::clone(&engine);
        tokio::spawn(async move {
            let Ok(mut engine) = engine.try_lock() else {
                tracing::warn!("Previous crawl cycle still running, skipping this tick");
                return;
            };
            let stats = engine.crawl().await;
            tracing::info!(
                "Cycle finished: {} URLs processed, {} articles stored, {} stale, {} failed",
                stats.urls_processed,
                stats.articles_stored,
                stats.articles_skipped_stale,
                stats.articles_failed
            );
        });
    }
}
