//! Crawl orchestration
//!
//! The engine owns a cycle's frontier and drives the fetch, classification,
//! extraction, and storage layers; the fetcher and depth controller are its
//! two policy-bearing collaborators.

mod depth;
mod engine;
mod fetcher;

pub use depth::determine_max_level;
pub use engine::{CrawlEngine, CycleStats};
pub use fetcher::{build_http_client, FetchClient, FetchError, RetryPolicy};
