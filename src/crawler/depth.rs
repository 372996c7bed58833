//! Adaptive depth controller
//!
//! The span between the oldest and newest archived publish time decides how
//! deep the next traversal goes. A broad archive (six months or more) means
//! recent content sits near the surface, so the shallow steady-state depth is
//! enough; a narrow or empty archive warrants a wide sweep at the deeper
//! depth.

use crate::config::PublisherConfig;
use chrono::{DateTime, Utc};

/// Derives the maximum traversal depth for the next crawl cycle
///
/// If either bound is undefined there is no prior archive, which falls open
/// to the deeper `shallow-archive-depth`. Otherwise the span in whole months
/// (30-day months) decides: >= 6 months means the archive is mature and the
/// smaller `steady-state-depth` applies.
pub fn determine_max_level(
    oldest: Option<DateTime<Utc>>,
    latest: Option<DateTime<Utc>>,
    publisher: &PublisherConfig,
) -> u32 {
    let (Some(oldest), Some(latest)) = (oldest, latest) else {
        tracing::info!(
            "No archive bounds yet, using shallow-archive depth: {}",
            publisher.shallow_archive_depth
        );
        return publisher.shallow_archive_depth;
    };

    let months_between = (latest - oldest).num_days() / 30;
    if months_between >= 6 {
        tracing::info!(
            "Archive spans {} months, using steady-state depth: {}",
            months_between,
            publisher.steady_state_depth
        );
        publisher.steady_state_depth
    } else {
        tracing::info!(
            "Archive spans only {} months, using shallow-archive depth: {}",
            months_between,
            publisher.shallow_archive_depth
        );
        publisher.shallow_archive_depth
    }
}
