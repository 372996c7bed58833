//! News-Archiver: an incremental news article crawler
//!
//! This crate implements a breadth-first crawler that discovers and archives
//! news articles from configured publisher websites, driving depth and
//! extraction rules entirely from per-publisher configuration.

pub mod config;
pub mod crawler;
pub mod extract;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for News-Archiver operations
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] crawler::FetchError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid regex pattern in config: {0}")]
    InvalidPattern(String),

    #[error("Unknown publisher: {0}")]
    UnknownPublisher(String),
}

/// Result type alias for News-Archiver operations
pub type Result<T> = std::result::Result<T, CrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::{Config, PublisherConfig};
pub use crawler::{CrawlEngine, CycleStats};
pub use extract::Article;
pub use crate::url::UrlClass;
