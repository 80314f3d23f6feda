//! Single-slot result cache.
//!
//! Holds the last successful `ScrapeResult` for the life of the process.
//! Entries are immutable and shared through `Arc`; a refresh swaps the whole
//! entry rather than mutating it, so readers holding an old entry keep a
//! consistent snapshot. Concurrent refreshes are not serialized: the last
//! writer wins.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

use crate::types::ScrapeResult;

/// Freshness of the slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheState {
    Empty,
    Fresh,
    /// Past its TTL, or the last refresh attempt failed.
    Stale,
}

impl fmt::Display for CacheState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheState::Empty => write!(f, "EMPTY"),
            CacheState::Fresh => write!(f, "FRESH"),
            CacheState::Stale => write!(f, "STALE"),
        }
    }
}

/// One cached snapshot.
#[derive(Debug)]
pub struct CacheEntry {
    pub result: Arc<ScrapeResult>,
    pub fetched_at: Instant,
    /// Increments on every replace; 1 for the first entry.
    pub version: u64,
}

impl CacheEntry {
    pub fn age(&self) -> Duration {
        self.fetched_at.elapsed()
    }

    pub fn is_fresh(&self, ttl: Duration) -> bool {
        self.age() < ttl
    }
}

#[derive(Debug, Default)]
struct Slot {
    entry: Option<Arc<CacheEntry>>,
    last_failure: Option<String>,
    version: u64,
}

/// Process-wide cache of the latest scrape.
#[derive(Debug)]
pub struct InjuryCache {
    ttl: Duration,
    slot: RwLock<Slot>,
}

impl InjuryCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            slot: RwLock::new(Slot::default()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Current entry, if any.
    pub async fn read(&self) -> Option<Arc<CacheEntry>> {
        self.slot.read().await.entry.clone()
    }

    /// Swap in a new snapshot and clear any recorded failure.
    pub async fn replace(&self, result: ScrapeResult) -> Arc<CacheEntry> {
        let mut slot = self.slot.write().await;
        slot.version += 1;
        let entry = Arc::new(CacheEntry {
            result: Arc::new(result),
            fetched_at: Instant::now(),
            version: slot.version,
        });
        slot.entry = Some(Arc::clone(&entry));
        slot.last_failure = None;
        entry
    }

    /// Record a failed refresh. The existing entry is kept.
    pub async fn note_failure(&self, reason: impl Into<String>) {
        self.slot.write().await.last_failure = Some(reason.into());
    }

    pub async fn last_failure(&self) -> Option<String> {
        self.slot.read().await.last_failure.clone()
    }

    pub async fn state(&self) -> CacheState {
        let slot = self.slot.read().await;
        match &slot.entry {
            None => CacheState::Empty,
            Some(entry) if slot.last_failure.is_none() && entry.is_fresh(self.ttl) => CacheState::Fresh,
            Some(_) => CacheState::Stale,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
