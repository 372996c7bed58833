//! Configuration module for News-Archiver
//!
//! This module handles loading, parsing, and validating TOML configuration
//! files. Everything that differs between publishers (URL patterns, content
//! selectors, breadcrumb rules, depth constants) lives in configuration, so a
//! new site layout is a config change, not a code change.
//!
//! # Example
//!
//! ```no_run
//! use news_archiver::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("config.toml")).unwrap();
//! println!("Crawling publisher: {}", config.settings.active_publisher);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, OutputConfig, PublisherConfig, Settings};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
