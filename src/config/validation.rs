use crate::config::types::{Config, OutputConfig, PublisherConfig, Settings};
use crate::ConfigError;
use chrono::FixedOffset;
use regex::Regex;
use scraper::Selector;
use url::Url;

/// Validates the entire configuration
///
/// Validation is fail-fast: the process must not start with a partial or
/// default configuration, so every pattern, selector, and offset is compiled
/// or parsed here.
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_settings(&config.settings)?;
    validate_output(&config.output)?;

    if config.publisher.is_empty() {
        return Err(ConfigError::Validation(
            "at least one [[publisher]] entry is required".to_string(),
        ));
    }
    for publisher in &config.publisher {
        validate_publisher(publisher)?;
    }

    // The selected publisher must exist
    config.active_publisher()?;

    Ok(())
}

/// Validates global settings
fn validate_settings(settings: &Settings) -> Result<(), ConfigError> {
    if settings.active_publisher.is_empty() {
        return Err(ConfigError::Validation(
            "active-publisher cannot be empty".to_string(),
        ));
    }

    if settings.max_urls_per_cycle < 1 {
        return Err(ConfigError::Validation(format!(
            "max-urls-per-cycle must be >= 1, got {}",
            settings.max_urls_per_cycle
        )));
    }

    if settings.max_retries < 1 {
        return Err(ConfigError::Validation(format!(
            "max-retries must be >= 1, got {}",
            settings.max_retries
        )));
    }

    if settings.retry_status_codes.is_empty() {
        return Err(ConfigError::Validation(
            "retry-status-codes cannot be empty".to_string(),
        ));
    }

    for selector in &settings.default_content_selectors {
        validate_selector(selector)?;
    }

    if settings.crawl_interval_minutes < 1 {
        return Err(ConfigError::Validation(format!(
            "crawl-interval-minutes must be >= 1, got {}",
            settings.crawl_interval_minutes
        )));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output(output: &OutputConfig) -> Result<(), ConfigError> {
    if output.data_dir.is_empty() {
        return Err(ConfigError::Validation(
            "data-dir cannot be empty".to_string(),
        ));
    }
    Ok(())
}

/// Validates one publisher entry
fn validate_publisher(publisher: &PublisherConfig) -> Result<(), ConfigError> {
    if publisher.name.is_empty() {
        return Err(ConfigError::Validation(
            "publisher name cannot be empty".to_string(),
        ));
    }

    if !publisher
        .name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "publisher name must be lowercase alphanumeric/hyphen, got '{}'",
            publisher.name
        )));
    }

    let start = Url::parse(&publisher.start_url).map_err(|e| {
        ConfigError::InvalidUrl(format!("invalid start-url for {}: {}", publisher.name, e))
    })?;
    if start.scheme() != "http" && start.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "start-url for {} must be http(s), got {}",
            publisher.name, publisher.start_url
        )));
    }

    validate_pattern(&publisher.article_url_pattern, "article-url-pattern")?;
    validate_pattern(&publisher.category_url_pattern, "category-url-pattern")?;

    let timestamp = validate_pattern(&publisher.timestamp_pattern, "timestamp-pattern")?;
    if timestamp.captures_len() < 2 {
        return Err(ConfigError::InvalidPattern(format!(
            "timestamp-pattern for {} needs one capture group",
            publisher.name
        )));
    }

    if publisher.content_selectors.is_empty() {
        return Err(ConfigError::Validation(format!(
            "content-selectors for {} cannot be empty",
            publisher.name
        )));
    }
    for selector in &publisher.content_selectors {
        validate_selector(selector)?;
    }

    if publisher.category_url_field.is_empty() {
        return Err(ConfigError::Validation(format!(
            "category-url-field for {} cannot be empty",
            publisher.name
        )));
    }

    publisher
        .default_utc_offset
        .parse::<FixedOffset>()
        .map_err(|_| {
            ConfigError::Validation(format!(
                "default-utc-offset for {} must look like \"+07:00\", got '{}'",
                publisher.name, publisher.default_utc_offset
            ))
        })?;

    if publisher.freshness_window_days < 1 {
        return Err(ConfigError::Validation(format!(
            "freshness-window-days for {} must be >= 1, got {}",
            publisher.name, publisher.freshness_window_days
        )));
    }

    Ok(())
}

fn validate_pattern(pattern: &str, key: &str) -> Result<Regex, ConfigError> {
    Regex::new(pattern).map_err(|e| ConfigError::InvalidPattern(format!("{}: {}", key, e)))
}

fn validate_selector(selector: &str) -> Result<(), ConfigError> {
    Selector::parse(selector).map_err(|_| {
        ConfigError::Validation(format!("invalid content selector: '{}'", selector))
    })?;
    Ok(())
}
