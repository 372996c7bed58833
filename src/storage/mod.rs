//! Durable state for the crawler
//!
//! Two stores survive process restarts: the visited ledger (append-only URL
//! set) and the per-publisher article archive with its rolling metadata.
//! Both are flat files, mutated incrementally and never rebuilt wholesale.

mod archive;
mod traits;
mod visited;

pub use archive::ArchiveStore;
pub use traits::{StorageError, StorageResult, VisitedLedger};
pub use visited::FileVisitedLedger;
