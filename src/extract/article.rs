use chrono::{DateTime, FixedOffset};

/// A structured article record
///
/// Produced only by the content extractor and consumed only by the archive
/// store; immutable once constructed. The source URL is the unique key.
#[derive(Debug, Clone, PartialEq)]
pub struct Article {
    /// Source URL of the article
    pub url: String,

    /// Headline
    pub title: String,

    /// Summary/description
    pub description: String,

    /// Body text; may be empty when no content selector matched
    pub content: String,

    /// Publish time with its timezone resolved, never ambiguous
    pub publish_time: DateTime<FixedOffset>,

    /// Author name(s), comma-joined if the page listed several
    pub author: String,

    /// Category slug, or "unknown" when breadcrumb resolution failed
    pub category: String,
}
