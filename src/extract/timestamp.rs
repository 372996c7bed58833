use chrono::{DateTime, FixedOffset, NaiveDateTime};

/// Timestamp grammars tried in order against `datePublished` values.
///
/// Publishers are inconsistent about fractional seconds and offset spelling,
/// so several shapes of the same ISO form are attempted before giving up.
const OFFSET_FORMATS: &[&str] = &[
    // Full ISO form with fractional seconds and offset
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    // Offset form without fractional seconds
    "%Y-%m-%dT%H:%M:%S%:z",
    // Offset without the colon, optional fraction
    "%Y-%m-%dT%H:%M:%S%.f%z",
];

/// Grammar with no offset at all
const NAIVE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Parses a publish-time string into a fully resolved timestamp
///
/// Each offset grammar is tried in order; then the offset-less grammar, which
/// resolves against the publisher's configured default offset; finally every
/// offset grammar is retried with the default offset appended to the raw
/// string. `None` means the value is unusable — callers must treat that as an
/// extraction failure, never invent a timestamp.
pub fn parse_publish_time(raw: &str, default_offset: &str) -> Option<DateTime<FixedOffset>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Some(parsed) = try_offset_formats(trimmed) {
        return Some(parsed);
    }

    if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, NAIVE_FORMAT) {
        let offset = default_offset.parse::<FixedOffset>().ok()?;
        return naive.and_local_timezone(offset).single();
    }

    // Last resort: the value may be a partial ISO string that only lacks its
    // offset suffix (e.g. "2025-04-11T23:57:00.500")
    try_offset_formats(&format!("{}{}", trimmed, default_offset))
}

fn try_offset_formats(value: &str) -> Option<DateTime<FixedOffset>> {
    OFFSET_FORMATS
        .iter()
        .find_map(|format| DateTime::parse_from_str(value, format).ok())
}
