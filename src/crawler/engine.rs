//! Crawl engine - bounded breadth-first traversal of the link graph
//!
//! One `crawl()` call is one cycle: seed the frontier with the publisher's
//! start URL, pop entries in depth order, classify every URL as article,
//! category, or other, and drive the fetcher, extractor, and stores
//! accordingly. The cycle ends when the frontier empties or the per-cycle
//! URL budget runs out.

use crate::config::{Config, PublisherConfig, Settings};
use crate::crawler::depth::determine_max_level;
use crate::crawler::fetcher::FetchClient;
use crate::extract::ContentExtractor;
use crate::storage::{ArchiveStore, FileVisitedLedger, VisitedLedger};
use crate::url::{extract_links, UrlClass, UrlClassifier};
use crate::Result;
use chrono::Utc;
use scraper::Html;
use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, HashSet};
use std::path::Path;
use url::Url;

/// File name of the visited ledger inside the data directory
const VISITED_LEDGER_FILE: &str = "visited_urls.txt";

/// A (URL, discovery depth) pair awaiting traversal
#[derive(Debug, Clone, PartialEq, Eq)]
struct FrontierEntry {
    depth: u32,
    url: Url,
}

// Depth-ascending traversal: entries compare by depth, with the URL string
// as a stable tie-break. Wrapped in `Reverse` for the max-heap.
impl Ord for FrontierEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.depth
            .cmp(&other.depth)
            .then_with(|| self.url.as_str().cmp(other.url.as_str()))
    }
}

impl PartialOrd for FrontierEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Summary of one crawl cycle
#[derive(Debug, Default, Clone)]
pub struct CycleStats {
    /// Depth bound the depth controller chose for this cycle
    pub max_level: u32,

    /// Dequeued URLs that were expanded (the budget counter)
    pub urls_processed: u32,

    /// Articles newly written to the archive
    pub articles_stored: u32,

    /// Articles discarded for being older than the freshness window
    pub articles_skipped_stale: u32,

    /// Article URLs dropped by fetch or extraction failure
    pub articles_failed: u32,
}

/// The frontier scheduler driving one publisher's crawl
pub struct CrawlEngine {
    settings: Settings,
    publisher: PublisherConfig,
    start_url: Url,
    classifier: UrlClassifier,
    fetcher: FetchClient,
    extractor: ContentExtractor,
    archive: ArchiveStore,
    visited: Box<dyn VisitedLedger + Send>,
}

impl CrawlEngine {
    /// Builds an engine for the configuration's active publisher
    ///
    /// Opens the visited ledger and archive store under the configured data
    /// directory and compiles the publisher's URL patterns.
    pub fn new(config: &Config) -> Result<Self> {
        let publisher = config.active_publisher()?.clone();
        let start_url = Url::parse(&publisher.start_url)?;
        let classifier = UrlClassifier::from_publisher(&publisher)?;
        let fetcher = FetchClient::new(&config.settings)?;

        let data_dir = Path::new(&config.output.data_dir);
        let archive = ArchiveStore::open(data_dir, &publisher)?;
        let visited: Box<dyn VisitedLedger + Send> =
            Box::new(FileVisitedLedger::open(&data_dir.join(VISITED_LEDGER_FILE))?);

        let extractor = ContentExtractor::new(
            publisher.clone(),
            &config.settings.default_content_selectors,
        );

        Ok(Self {
            settings: config.settings.clone(),
            publisher,
            start_url,
            classifier,
            fetcher,
            extractor,
            archive,
            visited,
        })
    }

    /// Runs exactly one bounded breadth-first traversal
    ///
    /// Every per-URL failure is contained here; a cycle always runs to
    /// frontier exhaustion or budget exhaustion.
    pub async fn crawl(&mut self) -> CycleStats {
        tracing::info!("Starting BFS crawl from: {}", self.start_url);

        let max_level = determine_max_level(
            self.archive.oldest_publish_time(),
            self.archive.latest_publish_time(),
            &self.publisher,
        );
        tracing::info!("Max level for this crawl: {}", max_level);

        let mut frontier: BinaryHeap<Reverse<FrontierEntry>> = BinaryHeap::new();
        frontier.push(Reverse(FrontierEntry {
            depth: 0,
            url: self.start_url.clone(),
        }));

        // Categories are legitimately revisited across cycles but not within
        // one; this set lives for the cycle only, unlike the durable ledger.
        let mut enqueued_categories: HashSet<Url> = HashSet::new();

        let mut stats = CycleStats {
            max_level,
            ..CycleStats::default()
        };

        while let Some(Reverse(entry)) = frontier.pop() {
            if stats.urls_processed >= self.settings.max_urls_per_cycle {
                tracing::info!(
                    "Reached max URLs per cycle ({}), stopping. Frontier size: {}",
                    self.settings.max_urls_per_cycle,
                    frontier.len() + 1
                );
                break;
            }

            // Lazy pruning: entries beyond the bound are never expanded
            if entry.depth > max_level {
                tracing::debug!(
                    "Reached max level ({}), skipping URL: {}",
                    max_level,
                    entry.url
                );
                continue;
            }

            match self.classifier.classify(entry.url.as_str()) {
                UrlClass::Article => {
                    // Only the seed can classify as an article here; articles
                    // discovered as outlinks are processed immediately and
                    // never enqueued.
                    if self.visited.contains(entry.url.as_str()) {
                        tracing::debug!("Article URL already visited, skipping: {}", entry.url);
                        continue;
                    }
                    self.mark_visited(entry.url.as_str());
                    self.process_article(entry.url.clone(), &mut stats).await;
                    stats.urls_processed += 1;
                }
                UrlClass::Category | UrlClass::Other => {
                    tracing::debug!("Processing URL: {} (level {})", entry.url, entry.depth);
                    self.expand(&entry, &mut frontier, &mut enqueued_categories, &mut stats)
                        .await;
                    stats.urls_processed += 1;
                }
            }
        }

        tracing::info!(
            "Finished BFS crawl. Processed {} URLs, stored {} articles.",
            stats.urls_processed,
            stats.articles_stored
        );
        stats
    }

    /// Fetches a traversal page and handles each of its outlinks
    async fn expand(
        &mut self,
        entry: &FrontierEntry,
        frontier: &mut BinaryHeap<Reverse<FrontierEntry>>,
        enqueued_categories: &mut HashSet<Url>,
        stats: &mut CycleStats,
    ) {
        let body = match self.fetcher.fetch(&entry.url).await {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!("Failed to fetch {}: {}", entry.url, e);
                return;
            }
        };

        let outlinks = collect_links(&body, &entry.url);
        if outlinks.is_empty() {
            tracing::debug!("No outlinks found for URL: {}", entry.url);
        }

        for link in outlinks {
            match self.classifier.classify(link.as_str()) {
                UrlClass::Article => {
                    if self.visited.contains(link.as_str()) {
                        continue;
                    }
                    // Marked before parsing so a failed parse cannot cause a
                    // retry loop across cycles
                    self.mark_visited(link.as_str());
                    self.process_article(link, stats).await;
                }
                UrlClass::Category => {
                    if enqueued_categories.insert(link.clone()) {
                        frontier.push(Reverse(FrontierEntry {
                            depth: entry.depth + 1,
                            url: link,
                        }));
                    }
                }
                UrlClass::Other => {
                    if self.visited.contains(link.as_str()) {
                        continue;
                    }
                    self.mark_visited(link.as_str());
                    frontier.push(Reverse(FrontierEntry {
                        depth: entry.depth + 1,
                        url: link,
                    }));
                }
            }
        }
    }

    /// Fetches, extracts, freshness-filters, and archives one article URL
    async fn process_article(&mut self, url: Url, stats: &mut CycleStats) {
        let body = match self.fetcher.fetch(&url).await {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!("Failed to fetch article {}: {}", url, e);
                stats.articles_failed += 1;
                return;
            }
        };

        let article = {
            let document = Html::parse_document(&body);
            match self.extractor.extract(&document, url.as_str()) {
                Ok(article) => article,
                Err(e) => {
                    tracing::debug!("Extraction rejected {}: {}", url, e);
                    stats.articles_failed += 1;
                    return;
                }
            }
        };

        // Articles strictly older than the freshness window are discarded
        let age = Utc::now() - article.publish_time.with_timezone(&Utc);
        if age > chrono::Duration::days(self.publisher.freshness_window_days) {
            tracing::debug!(
                "Article is older than the freshness window, skipping: {}",
                url
            );
            stats.articles_skipped_stale += 1;
            return;
        }

        match self.archive.save(&article) {
            Ok(true) => stats.articles_stored += 1,
            Ok(false) => {}
            Err(e) => tracing::warn!("Error saving article {}: {}", url, e),
        }
    }

    /// Records a URL in the durable ledger; failures are logged, not fatal
    fn mark_visited(&mut self, url: &str) {
        if let Err(e) = self.visited.add(url) {
            tracing::error!("Error writing URL to visited ledger: {}: {}", url, e);
        }
    }
}

/// Parses a page body and extracts its outlinks
///
/// Kept synchronous so the parsed document never lives across an await.
fn collect_links(body: &str, page_url: &Url) -> HashSet<Url> {
    let document = Html::parse_document(body);
    extract_links(&document, page_url)
}
