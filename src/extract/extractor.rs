use crate::config::PublisherConfig;
use crate::extract::jsonld::scan_structured_blocks;
use crate::extract::timestamp::parse_publish_time;
use crate::extract::{Article, ExtractError};
use html_escape::decode_html_entities;
use scraper::{Html, Selector};
use serde_json::Value;

/// Sentinel category used when breadcrumb resolution fails
const UNKNOWN_CATEGORY: &str = "unknown";

/// Turns one fetched document into a structured article record
///
/// All of the extraction rules — content selectors, breadcrumb position and
/// field path, timestamp offset handling — come from the publisher
/// configuration. A rejection (`Err`) drops the URL; it is never fatal to the
/// crawl cycle.
pub struct ContentExtractor {
    publisher: PublisherConfig,
    selectors: Vec<Selector>,
    default_selectors: Vec<Selector>,
}

impl ContentExtractor {
    /// Creates an extractor for one publisher
    ///
    /// Selector strings were compiled during config validation; one that
    /// still fails here is logged and skipped rather than aborting startup.
    pub fn new(publisher: PublisherConfig, default_content_selectors: &[String]) -> Self {
        let selectors = compile_selectors(&publisher.content_selectors);
        let default_selectors = compile_selectors(default_content_selectors);
        Self {
            publisher,
            selectors,
            default_selectors,
        }
    }

    /// Extracts an article from a fetched document
    ///
    /// # Returns
    ///
    /// * `Ok(Article)` - The structured record, ready for the archive store
    /// * `Err(ExtractError)` - The page is not a usable article
    pub fn extract(&self, document: &Html, url: &str) -> Result<Article, ExtractError> {
        let blocks = scan_structured_blocks(document)?;
        let article_node = blocks.article.ok_or(ExtractError::NoArticleBlock)?;

        let title = decode(required_text(&article_node, "headline")?);
        let description = decode(required_text(&article_node, "description")?);
        let author = decode(&extract_author(&article_node));

        let raw_time = required_text(&article_node, "datePublished")?;
        let publish_time = parse_publish_time(raw_time, &self.publisher.default_utc_offset)
            .ok_or_else(|| ExtractError::UnparseableTimestamp(raw_time.to_string()))?;

        let category = self.resolve_category(blocks.breadcrumb.as_ref());

        let content = self.extract_content(document);
        if content.is_empty() {
            tracing::warn!("Could not extract content for URL: {}", url);
        }

        Ok(Article {
            url: url.to_string(),
            title,
            description,
            content,
            publish_time,
            author,
            category,
        })
    }

    /// Resolves the category slug from the breadcrumb block
    ///
    /// Any missing step degrades to the "unknown" sentinel; category
    /// resolution never fails the whole extraction.
    fn resolve_category(&self, breadcrumb: Option<&Value>) -> String {
        breadcrumb
            .and_then(|node| self.category_from_breadcrumb(node))
            .unwrap_or_else(|| UNKNOWN_CATEGORY.to_string())
    }

    fn category_from_breadcrumb(&self, node: &Value) -> Option<String> {
        let list = node.get("itemListElement")?.as_array()?;
        let mut item = list.get(self.publisher.category_position)?;

        // Some layouts wrap each breadcrumb entry in an extra list
        if self.publisher.nested_breadcrumb {
            item = item.as_array()?.first()?;
        }

        for key in self.publisher.category_url_field.split('.') {
            item = item.get(key)?;
        }
        let category_url = item.as_str()?;

        let segment = category_url.trim_end_matches('/').rsplit('/').next()?;
        let segment = segment
            .strip_suffix(&self.publisher.category_url_suffix)
            .unwrap_or(segment);

        if segment.is_empty() {
            None
        } else {
            Some(segment.to_string())
        }
    }

    /// Extracts the body text using the configured selector list
    ///
    /// The publisher's own selectors are tried first, in order; if every one
    /// yields empty text, the shared default selectors are tried the same
    /// way. An all-empty result is accepted.
    fn extract_content(&self, document: &Html) -> String {
        for selector in self.selectors.iter().chain(self.default_selectors.iter()) {
            let text = selector_text(document, selector);
            if !text.is_empty() {
                return text;
            }
        }
        String::new()
    }
}

fn compile_selectors(raw: &[String]) -> Vec<Selector> {
    raw.iter()
        .filter_map(|s| match Selector::parse(s) {
            Ok(selector) => Some(selector),
            Err(_) => {
                tracing::warn!("Skipping unparseable content selector: '{}'", s);
                None
            }
        })
        .collect()
}

/// Collects the whitespace-normalized text of every node matching a selector
fn selector_text(document: &Html, selector: &Selector) -> String {
    let pieces: Vec<&str> = document
        .select(selector)
        .flat_map(|element| element.text())
        .flat_map(|chunk| chunk.split_whitespace())
        .collect();
    pieces.join(" ")
}

fn required_text<'a>(node: &'a Value, field: &'static str) -> Result<&'a str, ExtractError> {
    node.get(field)
        .and_then(|v| v.as_str())
        .ok_or(ExtractError::MissingField(field))
}

/// Reads the author field: a list of names is comma-joined, a single object
/// contributes its `name`, anything else is an empty string.
fn extract_author(node: &Value) -> String {
    match node.get("author") {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| item.get("name").and_then(|n| n.as_str()))
            .collect::<Vec<_>>()
            .join(", "),
        Some(single) => single
            .get("name")
            .and_then(|n| n.as_str())
            .unwrap_or("")
            .to_string(),
        None => String::new(),
    }
}

fn decode(text: &str) -> String {
    decode_html_entities(text).to_string()
}
