//! Shared helpers for integration tests.
//!
//! Provides a deterministic in-memory `PageFetcher` that replays a
//! scripted sequence of pages and failures, plus fixture loading.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use rinkside::fetch::PageFetcher;
use rinkside::types::ScrapeError;

/// Read a file from `tests/fixtures`.
pub fn fixture(name: &str) -> String {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    std::fs::read_to_string(&path).unwrap_or_else(|e| panic!("fixture {}: {e}", path.display()))
}

pub fn espn_page() -> String {
    fixture("espn_injuries.html")
}

/// A fetcher that answers from a script of responses.
///
/// Each call pops the next scripted response. Once the script runs out,
/// the last response is repeated.
pub struct ScriptedFetcher {
    script: Mutex<VecDeque<Result<String, ScrapeError>>>,
    last: Mutex<Option<Result<String, ScrapeError>>>,
    calls: Arc<AtomicUsize>,
}

impl ScriptedFetcher {
    pub fn new(script: Vec<Result<String, ScrapeError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            last: Mutex::new(None),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Always serves `html`.
    pub fn serving(html: impl Into<String>) -> Self {
        Self::new(vec![Ok(html.into())])
    }

    /// Always fails with `err`.
    pub fn failing(err: ScrapeError) -> Self {
        Self::new(vec![Err(err)])
    }

    /// Shared handle on the call counter, usable after the fetcher has
    /// been moved into a service.
    pub fn call_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PageFetcher for ScriptedFetcher {
    async fn fetch_page(&self) -> Result<String, ScrapeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let next = self.script.lock().unwrap().pop_front();
        let mut last = self.last.lock().unwrap();
        match next {
            Some(response) => {
                *last = Some(response.clone());
                response
            }
            None => last
                .clone()
                .unwrap_or_else(|| Err(ScrapeError::Fetch("script exhausted".into()))),
        }
    }
}
