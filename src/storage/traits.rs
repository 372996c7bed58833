//! Storage traits and error types

use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid timestamp pattern: {0}")]
    Pattern(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Durable, append-only set of URLs already processed
///
/// The ledger is the sole deduplication authority during traversal. It only
/// ever grows; there is no removal operation. Implementations must make
/// `add` durable before returning so a crash never forgets a processed URL.
pub trait VisitedLedger {
    /// Membership test
    fn contains(&self, url: &str) -> bool;

    /// Records a URL as visited; a no-op if already present
    fn add(&mut self, url: &str) -> StorageResult<()>;

    /// Number of URLs in the ledger
    fn len(&self) -> usize;

    /// Returns true when no URL has ever been recorded
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
