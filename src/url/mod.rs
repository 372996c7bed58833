//! URL handling module for News-Archiver
//!
//! Classification of discovered URLs against per-publisher patterns, and
//! outlink extraction from fetched documents.

mod classify;
mod links;

pub use classify::{UrlClass, UrlClassifier};
pub use links::extract_links;
