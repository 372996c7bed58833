use serde::Deserialize;

/// Main configuration structure for News-Archiver
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub settings: Settings,
    pub output: OutputConfig,
    #[serde(default)]
    pub publisher: Vec<PublisherConfig>,
}

impl Config {
    /// Returns the publisher configuration selected by `active-publisher`.
    ///
    /// The process must not run without it, so callers treat a miss as fatal.
    pub fn active_publisher(&self) -> crate::ConfigResult<&PublisherConfig> {
        self.publisher
            .iter()
            .find(|p| p.name == self.settings.active_publisher)
            .ok_or_else(|| {
                crate::ConfigError::UnknownPublisher(self.settings.active_publisher.clone())
            })
    }
}

/// Global crawler settings shared by all publishers
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Name of the publisher to crawl; must match one `[[publisher]]` entry
    #[serde(rename = "active-publisher")]
    pub active_publisher: String,

    /// Budget of dequeued URLs per crawl cycle
    #[serde(rename = "max-urls-per-cycle")]
    pub max_urls_per_cycle: u32,

    /// Total fetch attempts per URL (first attempt included)
    #[serde(rename = "max-retries")]
    pub max_retries: u32,

    /// Politeness delay applied before every request (milliseconds)
    #[serde(rename = "request-delay-ms")]
    pub request_delay_ms: u64,

    /// Fixed delay between retry attempts (milliseconds)
    #[serde(rename = "retry-delay-ms")]
    pub retry_delay_ms: u64,

    /// HTTP status codes considered transient and worth retrying
    #[serde(rename = "retry-status-codes")]
    pub retry_status_codes: Vec<u16>,

    /// Body selectors tried when a publisher's own selectors all come up empty
    #[serde(rename = "default-content-selectors")]
    pub default_content_selectors: Vec<String>,

    /// Minutes between scheduled crawl cycles
    #[serde(rename = "crawl-interval-minutes")]
    pub crawl_interval_minutes: u64,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Root directory for the archive tree, visited ledger, and metadata files
    #[serde(rename = "data-dir")]
    pub data_dir: String,
}

/// Per-publisher crawl and extraction rules
///
/// Every difference between the supported site layouts is data here, never a
/// code path.
#[derive(Debug, Clone, Deserialize)]
pub struct PublisherConfig {
    /// Publisher identifier; also the first archive path segment
    pub name: String,

    /// Seed URL for each crawl cycle
    #[serde(rename = "start-url")]
    pub start_url: String,

    /// Regex matching article URLs; takes precedence over the category pattern
    #[serde(rename = "article-url-pattern")]
    pub article_url_pattern: String,

    /// Regex matching category/section URLs
    #[serde(rename = "category-url-pattern")]
    pub category_url_pattern: String,

    /// Ordered body selectors; first with non-empty text wins
    #[serde(rename = "content-selectors")]
    pub content_selectors: Vec<String>,

    /// Index into the breadcrumb item list used for category resolution
    #[serde(rename = "category-position")]
    pub category_position: usize,

    /// Whether the breadcrumb element at that position is itself a list
    #[serde(rename = "nested-breadcrumb", default)]
    pub nested_breadcrumb: bool,

    /// Dot-separated field path leading to the category URL inside the item
    #[serde(rename = "category-url-field")]
    pub category_url_field: String,

    /// Suffix stripped from the final category path segment (e.g. ".htm")
    #[serde(rename = "category-url-suffix", default)]
    pub category_url_suffix: String,

    /// Regex with one capture group extracting the timestamp token from an
    /// article URL; names the archive file
    #[serde(rename = "timestamp-pattern")]
    pub timestamp_pattern: String,

    /// UTC offset appended to publish times that carry none (e.g. "+07:00")
    #[serde(rename = "default-utc-offset")]
    pub default_utc_offset: String,

    /// Maximum age of an article eligible for storage (days)
    #[serde(rename = "freshness-window-days")]
    pub freshness_window_days: i64,

    /// Traversal depth once the archive spans six months or more
    #[serde(rename = "steady-state-depth")]
    pub steady_state_depth: u32,

    /// Traversal depth while the archive is empty or still shallow in time
    #[serde(rename = "shallow-archive-depth")]
    pub shallow_archive_depth: u32,
}
