//! Injury service: the cache-or-scrape decision for every request.
//!
//! A request is answered from the cache while it is fresh, otherwise the
//! page is fetched and scraped inline. A failed scrape falls back to
//! whatever is cached, however old; only an empty cache turns a failure
//! into an error.

use std::fmt;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::cache::InjuryCache;
use crate::config::AppConfig;
use crate::fetch::PageFetcher;
use crate::scrape::{scrape_html, ExtractOptions};
use crate::types::{ScrapeError, ScrapeResult};

/// How a response was produced. Sent to clients as `X-Cache`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    /// Fresh cached data, no scrape.
    Hit,
    /// Scraped for this request.
    Miss,
    /// Scrape failed, cached data served instead.
    Stale,
}

impl CacheStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheStatus::Hit => "HIT",
            CacheStatus::Miss => "MISS",
            CacheStatus::Stale => "STALE",
        }
    }
}

impl fmt::Display for CacheStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A payload together with its cache status.
#[derive(Debug, Clone)]
pub struct Served {
    pub payload: Arc<ScrapeResult>,
    pub status: CacheStatus,
}

pub struct InjuryService {
    fetcher: Arc<dyn PageFetcher>,
    cache: InjuryCache,
    opts: ExtractOptions,
}

impl InjuryService {
    pub fn new(fetcher: Arc<dyn PageFetcher>, cache: InjuryCache, opts: ExtractOptions) -> Self {
        Self { fetcher, cache, opts }
    }

    pub fn from_config(fetcher: Arc<dyn PageFetcher>, cfg: &AppConfig) -> Self {
        Self::new(
            fetcher,
            InjuryCache::new(cfg.cache.ttl()),
            ExtractOptions::from_config(&cfg.scraper),
        )
    }

    pub fn cache(&self) -> &InjuryCache {
        &self.cache
    }

    /// Serve the injury list, scraping when the cache is empty, expired, or
    /// `force_refresh` is set.
    pub async fn injuries(&self, force_refresh: bool) -> Result<Served, ScrapeError> {
        let cached = self.cache.read().await;

        if !force_refresh {
            if let Some(entry) = cached.as_ref().filter(|e| e.is_fresh(self.cache.ttl())) {
                info!(version = entry.version, count = entry.result.count, "Returning cached injuries data");
                return Ok(Served {
                    payload: Arc::clone(&entry.result),
                    status: CacheStatus::Hit,
                });
            }
        }

        match self.scrape().await {
            Ok(result) => {
                let previous_failure = self.cache.last_failure().await;
                let entry = self.cache.replace(result).await;
                info!(
                    version = entry.version,
                    count = entry.result.count,
                    recovered_from = previous_failure.as_deref().unwrap_or("none"),
                    "Cached fresh injuries data"
                );
                Ok(Served {
                    payload: Arc::clone(&entry.result),
                    status: CacheStatus::Miss,
                })
            }
            Err(e) => {
                self.cache.note_failure(e.to_string()).await;
                let cache_state = self.cache.state().await;
                // Re-read: another request may have refreshed meanwhile.
                match self.cache.read().await.or(cached) {
                    Some(entry) => {
                        warn!(
                            error = %e,
                            version = entry.version,
                            age_secs = entry.age().as_secs(),
                            cache_state = %cache_state,
                            "Scrape failed, returning stale cache"
                        );
                        Ok(Served {
                            payload: Arc::clone(&entry.result),
                            status: CacheStatus::Stale,
                        })
                    }
                    None => {
                        error!(error = %e, cache_state = %cache_state, "Scrape failed with no cached data");
                        Err(e)
                    }
                }
            }
        }
    }

    /// Fetch and extract one snapshot. The parsed document never lives
    /// across an await.
    async fn scrape(&self) -> Result<ScrapeResult, ScrapeError> {
        info!("Fetching NHL injuries");
        let html = self.fetcher.fetch_page().await?;
        info!(bytes = html.len(), "Fetched injuries page");
        Ok(ScrapeResult::new(scrape_html(&html, &self.opts)))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
