use crate::config::PublisherConfig;
use crate::extract::Article;
use crate::storage::{StorageError, StorageResult};
use chrono::{DateTime, Datelike, NaiveDateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Fixed timestamp format used in per-publisher metadata files (UTC)
const METADATA_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Content-addressed-by-URL archive of article records
///
/// One CSV file per article, at a path derived deterministically from the
/// publisher, category, publish time, and a timestamp token parsed out of
/// the article URL. Also maintains rolling per-publisher metadata (oldest and
/// newest stored publish time) that drives the depth controller.
pub struct ArchiveStore {
    base_dir: PathBuf,
    publisher: String,
    timestamp_pattern: Regex,
    metadata_path: PathBuf,
    latest_publish_time: Option<DateTime<Utc>>,
    oldest_publish_time: Option<DateTime<Utc>>,
}

/// On-disk shape of the metadata file
#[derive(Debug, Default, Serialize, Deserialize)]
struct MetadataFile {
    #[serde(rename = "latestPublishTime", skip_serializing_if = "Option::is_none")]
    latest: Option<String>,

    #[serde(rename = "oldestPublishTime", skip_serializing_if = "Option::is_none")]
    oldest: Option<String>,
}

impl ArchiveStore {
    /// Opens the archive for one publisher, loading its metadata
    ///
    /// A missing or corrupt metadata file is treated as "no prior data" so
    /// the depth controller fails open to its wide-sweep depth.
    pub fn open(base_dir: &Path, publisher: &PublisherConfig) -> StorageResult<Self> {
        std::fs::create_dir_all(base_dir)?;

        // Full-match like the classifier patterns
        let timestamp_pattern = Regex::new(&format!("^(?:{})$", publisher.timestamp_pattern))
            .map_err(|e| StorageError::Pattern(e.to_string()))?;

        let metadata_path = base_dir.join(format!("metadata_{}.json", publisher.name));
        let (latest, oldest) = load_metadata(&metadata_path);

        Ok(Self {
            base_dir: base_dir.to_path_buf(),
            publisher: publisher.name.clone(),
            timestamp_pattern,
            metadata_path,
            latest_publish_time: latest,
            oldest_publish_time: oldest,
        })
    }

    /// Newest stored publish time for this publisher, if any
    pub fn latest_publish_time(&self) -> Option<DateTime<Utc>> {
        self.latest_publish_time
    }

    /// Oldest stored publish time for this publisher, if any
    pub fn oldest_publish_time(&self) -> Option<DateTime<Utc>> {
        self.oldest_publish_time
    }

    /// Checks whether an article is already archived at its derived path
    pub fn exists(&self, article: &Article) -> bool {
        self.build_file_path(article)
            .map(|path| path.exists())
            .unwrap_or(false)
    }

    /// Writes one article record, at most once
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - The record was written and metadata updated
    /// * `Ok(false)` - Path underivable or a file already exists there
    /// * `Err(StorageError)` - I/O failure while writing
    pub fn save(&mut self, article: &Article) -> StorageResult<bool> {
        let Some(path) = self.build_file_path(article) else {
            return Ok(false);
        };
        if path.exists() {
            tracing::debug!("Article already archived, skipping: {}", article.url);
            return Ok(false);
        }

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut writer = csv::Writer::from_path(&path)?;
        writer.write_record([
            "URL",
            "Title",
            "Description",
            "Content",
            "PublishTime",
            "Author",
            "Category",
        ])?;
        writer.write_record([
            article.url.as_str(),
            article.title.as_str(),
            article.description.as_str(),
            article.content.as_str(),
            &article.publish_time.to_rfc3339(),
            article.author.as_str(),
            article.category.as_str(),
        ])?;
        writer.flush()?;
        tracing::info!("Saved article to: {}", path.display());

        self.update_metadata(article.publish_time.with_timezone(&Utc))?;
        Ok(true)
    }

    /// Derives the archive path for an article
    ///
    /// `<base>/<publisher>/<category>/<year>/<month>/<urlTimestamp>.csv`.
    /// Returns None when the URL yields no timestamp token; the publish time
    /// is always present on a constructed Article.
    fn build_file_path(&self, article: &Article) -> Option<PathBuf> {
        let timestamp = self.extract_url_timestamp(&article.url)?;
        let category = sanitize_category(&article.category);

        let published = &article.publish_time;
        Some(
            self.base_dir
                .join(&self.publisher)
                .join(category)
                .join(format!("{:04}", published.year()))
                .join(format!("{:02}", published.month()))
                .join(format!("{}.csv", timestamp)),
        )
    }

    /// Pulls the timestamp token out of an article URL
    fn extract_url_timestamp(&self, url: &str) -> Option<String> {
        let captures = self.timestamp_pattern.captures(url);
        match captures.and_then(|c| c.get(1)) {
            Some(m) => Some(m.as_str().to_string()),
            None => {
                tracing::warn!("Could not extract timestamp from URL: {}", url);
                None
            }
        }
    }

    /// Extends the latest/oldest bounds and persists them when they moved
    ///
    /// `latest` never decreases and `oldest` never increases.
    fn update_metadata(&mut self, publish_time: DateTime<Utc>) -> StorageResult<()> {
        let mut updated = false;
        if self.latest_publish_time.map_or(true, |t| publish_time > t) {
            self.latest_publish_time = Some(publish_time);
            updated = true;
        }
        if self.oldest_publish_time.map_or(true, |t| publish_time < t) {
            self.oldest_publish_time = Some(publish_time);
            updated = true;
        }
        if updated {
            self.save_metadata()?;
        }
        Ok(())
    }

    fn save_metadata(&self) -> StorageResult<()> {
        let metadata = MetadataFile {
            latest: self
                .latest_publish_time
                .map(|t| t.format(METADATA_TIME_FORMAT).to_string()),
            oldest: self
                .oldest_publish_time
                .map(|t| t.format(METADATA_TIME_FORMAT).to_string()),
        };
        let json = serde_json::to_string(&metadata)
            .map_err(|e| StorageError::Io(std::io::Error::other(e)))?;
        std::fs::write(&self.metadata_path, json)?;
        Ok(())
    }
}

/// Loads metadata bounds, failing open on any problem
fn load_metadata(path: &Path) -> (Option<DateTime<Utc>>, Option<DateTime<Utc>>) {
    if !path.exists() {
        return (None, None);
    }

    let parsed: Option<MetadataFile> = std::fs::read_to_string(path)
        .ok()
        .and_then(|content| serde_json::from_str(&content).ok());

    match parsed {
        Some(metadata) => (
            metadata.latest.as_deref().and_then(parse_metadata_time),
            metadata.oldest.as_deref().and_then(parse_metadata_time),
        ),
        None => {
            tracing::error!(
                "Corrupt metadata file at {}, treating as no prior data",
                path.display()
            );
            (None, None)
        }
    }
}

fn parse_metadata_time(value: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(value, METADATA_TIME_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}

/// Normalizes a category for use as a path segment
///
/// Lowercase; anything outside `[a-z0-9-]` becomes `-`.
fn sanitize_category(category: &str) -> String {
    category
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' {
                c
            } else {
                '-'
            }
        })
        .collect()
}
