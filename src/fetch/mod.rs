//! Page fetching.
//!
//! Defines the `PageFetcher` trait so the orchestrator can be driven by
//! the real HTTP client or by an in-memory page in tests.

pub mod http;

use async_trait::async_trait;

use crate::types::ScrapeError;

/// Abstraction over the source of the injuries page HTML.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Retrieve the raw page HTML.
    ///
    /// Fails with `ScrapeError::Timeout` when the time budget runs out and
    /// `ScrapeError::Fetch` for network errors, non-success statuses, and
    /// implausibly short bodies.
    async fn fetch_page(&self) -> Result<String, ScrapeError>;
}
