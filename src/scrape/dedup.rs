//! Record deduplication.
//!
//! Overlapping selectors and repeated page sections can yield the same
//! injury more than once. Identity is the normalized
//! (team, name, position, date, status, comment prefix) tuple; the first
//! occurrence wins and output order follows first appearance.

use std::collections::HashSet;
use tracing::debug;

use crate::types::InjuryRecord;

/// Comment characters that take part in identity.
pub const COMMENT_KEY_CHARS: usize = 50;

/// ASCII unit separator: never present in scraped text.
const KEY_DELIMITER: char = '\u{1f}';

/// Lowercase, trim, collapse internal whitespace runs to one space.
pub fn normalize(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Identity key of a record.
pub fn identity_key(record: &InjuryRecord) -> String {
    let comment: String = normalize(&record.comment).chars().take(COMMENT_KEY_CHARS).collect();
    let parts = [
        normalize(&record.team),
        normalize(&record.name),
        normalize(&record.position),
        normalize(&record.date),
        normalize(&record.status),
        comment,
    ];
    parts.join(&KEY_DELIMITER.to_string())
}

/// Keep the first record of every identity, preserving order.
pub fn dedup_records(records: Vec<InjuryRecord>) -> Vec<InjuryRecord> {
    let mut seen = HashSet::with_capacity(records.len());
    records
        .into_iter()
        .filter(|record| {
            let fresh = seen.insert(identity_key(record));
            if !fresh {
                debug!(name = %record.name, team = %record.team, "Duplicate injury found");
            }
            fresh
        })
        .collect()
}
