use crate::config::PublisherConfig;
use crate::ConfigError;
use regex::Regex;

/// Classification of a discovered URL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UrlClass {
    /// Content page: fetched once, extracted, archived
    Article,
    /// Section/listing page: revisited across cycles, expanded within one
    Category,
    /// Traversal-through node: visited once, expanded
    Other,
}

/// Classifies URLs against a publisher's article and category patterns
///
/// The article pattern takes precedence: a URL matching both patterns is an
/// article. Both patterns are matched against the entire URL, so configs can
/// rely on precedence instead of lookbehind (which `regex` does not support).
pub struct UrlClassifier {
    article: Regex,
    category: Regex,
}

impl UrlClassifier {
    /// Builds a classifier from a publisher's configured patterns
    pub fn from_publisher(publisher: &PublisherConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            article: anchored(&publisher.article_url_pattern)?,
            category: anchored(&publisher.category_url_pattern)?,
        })
    }

    /// Classifies a URL as article, category, or other
    pub fn classify(&self, url: &str) -> UrlClass {
        if self.article.is_match(url) {
            UrlClass::Article
        } else if self.category.is_match(url) {
            UrlClass::Category
        } else {
            UrlClass::Other
        }
    }
}

/// Compiles a pattern so it must match the whole URL, not a substring
fn anchored(pattern: &str) -> Result<Regex, ConfigError> {
    Regex::new(&format!("^(?:{})$", pattern))
        .map_err(|e| ConfigError::InvalidPattern(e.to_string()))
}
