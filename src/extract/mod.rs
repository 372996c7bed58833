//! Structured article extraction
//!
//! Turns fetched documents into [`Article`] records using per-publisher
//! rules: JSON-LD block scanning, timestamp grammar handling, breadcrumb
//! category resolution, and selector-driven body extraction.

mod article;
mod extractor;
mod jsonld;
mod timestamp;

pub use article::Article;
pub use extractor::ContentExtractor;
pub use jsonld::{scan_structured_blocks, StructuredBlocks};
pub use timestamp::parse_publish_time;

use thiserror::Error;

/// Reasons a page is rejected during extraction
///
/// Rejections drop the URL; they never abort the crawl cycle.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("page declares an event/index list type")]
    EventIndex,

    #[error("no NewsArticle structured-data block found")]
    NoArticleBlock,

    #[error("required field missing from article block: {0}")]
    MissingField(&'static str),

    #[error("unparseable publish time: {0}")]
    UnparseableTimestamp(String),
}
