//! JSON-LD structured-data scanning
//!
//! News pages carry their machine-readable metadata in
//! `<script type="application/ld+json">` blocks. A page is only treated as an
//! article when one of those blocks declares the `NewsArticle` type; a block
//! declaring an index type (`ItemList`) marks the whole page as a listing and
//! rejects it outright.

use crate::extract::ExtractError;
use scraper::{Html, Selector};
use serde_json::Value;

/// The structured-data blocks relevant to extraction, in document order
#[derive(Debug, Default)]
pub struct StructuredBlocks {
    /// First block declaring the `NewsArticle` type
    pub article: Option<Value>,

    /// First block declaring the `BreadcrumbList` type
    pub breadcrumb: Option<Value>,
}

/// Scans every JSON-LD block in the document
///
/// Blocks that fail to parse as JSON are skipped. A top-level array counts as
/// a sequence of blocks. Scanning stops immediately on an `ItemList` block —
/// the page is an event/index listing, not an article.
pub fn scan_structured_blocks(document: &Html) -> Result<StructuredBlocks, ExtractError> {
    let script = Selector::parse(r#"script[type="application/ld+json"]"#).unwrap();

    let mut blocks = StructuredBlocks::default();
    for element in document.select(&script) {
        let raw: String = element.text().collect();
        let Ok(value) = serde_json::from_str::<Value>(&raw) else {
            tracing::debug!("Skipping malformed JSON-LD block");
            continue;
        };

        match value {
            Value::Array(items) => {
                for item in items {
                    collect_block(item, &mut blocks)?;
                }
            }
            other => collect_block(other, &mut blocks)?,
        }
    }

    Ok(blocks)
}

fn collect_block(value: Value, blocks: &mut StructuredBlocks) -> Result<(), ExtractError> {
    if declares_type(&value, "ItemList") {
        return Err(ExtractError::EventIndex);
    }
    if blocks.article.is_none() && declares_type(&value, "NewsArticle") {
        blocks.article = Some(value);
    } else if blocks.breadcrumb.is_none() && declares_type(&value, "BreadcrumbList") {
        blocks.breadcrumb = Some(value);
    }
    Ok(())
}

/// Checks whether a block's `@type` declares the given type
///
/// `@type` may be a single string or a list of strings.
pub fn declares_type(value: &Value, wanted: &str) -> bool {
    match value.get("@type") {
        Some(Value::String(s)) => s == wanted,
        Some(Value::Array(list)) => list.iter().any(|t| t.as_str() == Some(wanted)),
        _ => false,
    }
}
