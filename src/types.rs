//! Shared types for the injury scraper.
//!
//! These types form the data model used across all modules. The JSON
//! shape (camelCase keys) is the wire contract of the `/injuries` endpoint
//! and of the downstream roster matching code.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Team label used when no attribution heuristic found a team.
pub const UNKNOWN_TEAM: &str = "unknown team";

// ---------------------------------------------------------------------------
// Injury record
// ---------------------------------------------------------------------------

/// One player row from the injury report.
///
/// The source page has no IDs, so identity is derived from the normalized
/// field tuple (see `scrape::dedup::identity_key`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InjuryRecord {
    pub team: String,
    pub name: String,
    /// Short position code ("C", "LW", "D", "G").
    pub position: String,
    pub est_return: String,
    pub date: String,
    pub status: String,
    pub comment: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub player_url: Option<String>,
}

impl fmt::Display for InjuryRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}, {}): {}", self.name, self.position, self.team, self.status)
    }
}

// ---------------------------------------------------------------------------
// Scrape result
// ---------------------------------------------------------------------------

/// A complete scrape snapshot. Built once per successful scrape and never
/// mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeResult {
    pub scraped_at: DateTime<Utc>,
    pub count: usize,
    pub items: Vec<InjuryRecord>,
}

impl ScrapeResult {
    /// Wrap an ordered record list, stamping it with the current time.
    pub fn new(items: Vec<InjuryRecord>) -> Self {
        Self::at(Utc::now(), items)
    }

    pub fn at(scraped_at: DateTime<Utc>, items: Vec<InjuryRecord>) -> Self {
        Self {
            scraped_at,
            count: items.len(),
            items,
        }
    }

    /// A copy of this snapshot keeping only the records accepted by `keep`.
    /// The original timestamp is preserved.
    pub fn filtered<F>(&self, mut keep: F) -> Self
    where
        F: FnMut(&InjuryRecord) -> bool,
    {
        let items: Vec<InjuryRecord> = self.items.iter().filter(|r| keep(r)).cloned().collect();
        Self::at(self.scraped_at, items)
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Domain errors raised while obtaining a scrape.
///
/// Extraction itself never fails: per-row and per-table problems degrade
/// to skipped rows. `Parse` exists for callers that want to report a page
/// that could not be read at all.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScrapeError {
    #[error("Fetch error: {0}")]
    Fetch(String),

    #[error("Request timeout: injuries page took longer than {0:?} to respond")]
    Timeout(Duration),

    #[error("Parse error: {0}")]
    Parse(String),
}

impl ScrapeError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, ScrapeError::Timeout(_))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
