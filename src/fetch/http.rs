//! HTTP fetcher for the public injuries page.
//!
//! Sends a browser-like GET to the primary host. A 404 from the primary
//! triggers exactly one retry against the fallback host; any other status,
//! a network error, or a timeout is final. The whole exchange (both hosts)
//! shares one time budget.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, UPGRADE_INSECURE_REQUESTS};
use reqwest::{Client, Response, StatusCode};
use std::time::Duration;
use tracing::{debug, info};

use super::PageFetcher;
use crate::config::ScraperConfig;
use crate::types::ScrapeError;

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// reqwest-backed `PageFetcher`.
pub struct HttpFetcher {
    http: Client,
    primary_url: String,
    fallback_url: String,
    timeout: Duration,
    min_body_chars: usize,
}

impl HttpFetcher {
    /// Create a fetcher from the scraper section of the config.
    pub fn new(cfg: &ScraperConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8"),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));
        headers.insert(UPGRADE_INSECURE_REQUESTS, HeaderValue::from_static("1"));

        let http = Client::builder()
            .user_agent(cfg.user_agent.as_str())
            .default_headers(headers)
            .build()
            .context("Failed to build HTTP client for injuries page")?;

        Ok(Self {
            http,
            primary_url: cfg.primary_url.clone(),
            fallback_url: cfg.fallback_url.clone(),
            timeout: cfg.timeout(),
            min_body_chars: cfg.min_body_chars,
        })
    }

    /// Override the overall time budget.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn get(&self, url: &str) -> Result<Response, ScrapeError> {
        debug!(url, "Fetching injuries page");
        self.http.get(url).send().await.map_err(|e| self.map_err(e))
    }

    fn map_err(&self, e: reqwest::Error) -> ScrapeError {
        if e.is_timeout() {
            ScrapeError::Timeout(self.timeout)
        } else {
            ScrapeError::Fetch(e.to_string())
        }
    }

    /// Primary → (404 only) fallback → status and body checks.
    async fn fetch_with_fallback(&self) -> Result<String, ScrapeError> {
        let mut resp = self.get(&self.primary_url).await?;

        if resp.status() == StatusCode::NOT_FOUND {
            info!(
                primary = %self.primary_url,
                fallback = %self.fallback_url,
                "Primary injuries URL returned 404, trying fallback host"
            );
            resp = self.get(&self.fallback_url).await?;
        }

        let status = resp.status();
        if !status.is_success() {
            return Err(ScrapeError::Fetch(format!("HTTP error! status: {}", status.as_u16())));
        }

        let html = resp.text().await.map_err(|e| self.map_err(e))?;
        if html.chars().count() < self.min_body_chars {
            return Err(ScrapeError::Fetch(
                "Received empty or very short HTML response".to_string(),
            ));
        }

        debug!(bytes = html.len(), "Injuries page fetched");
        Ok(html)
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch_page(&self) -> Result<String, ScrapeError> {
        match tokio::time::timeout(self.timeout, self.fetch_with_fallback()).await {
            Ok(result) => result,
            Err(_) => Err(ScrapeError::Timeout(self.timeout)),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const PAGE_PATH: &str = "/nhl/injuries";

    fn page_body() -> String {
        format!(
            "<html><body><table class=\"Table\">{}</table></body></html>",
            "<tr><td>Charlie McAvoy</td><td>D</td></tr>".repeat(5)
        )
    }

    fn fetcher(primary: &MockServer, fallback: &MockServer, timeout: Duration) -> HttpFetcher {
        let cfg = ScraperConfig {
            primary_url: format!("{}{PAGE_PATH}", primary.uri()),
            fallback_url: format!("{}{PAGE_PATH}", fallback.uri()),
            ..ScraperConfig::default()
        };
        HttpFetcher::new(&cfg).unwrap().with_timeout(timeout)
    }

    #[tokio::test]
    async fn test_primary_success() {
        let primary = MockServer::start().await;
        let fallback = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(PAGE_PATH))
            .and(header_exists("user-agent"))
            .respond_with(ResponseTemplate::new(200).set_body_string(page_body()))
            .expect(1)
            .mount(&primary)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(page_body()))
            .expect(0)
            .mount(&fallback)
            .await;

        let html = fetcher(&primary, &fallback, Duration::from_secs(5))
            .fetch_page()
            .await
            .unwrap();
        assert!(html.contains("Charlie McAvoy"));
    }

    #[tokio::test]
    async fn test_404_falls_back_to_secondary_host() {
        let primary = MockServer::start().await;
        let fallback = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(PAGE_PATH))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&primary)
            .await;
        Mock::given(method("GET"))
            .and(path(PAGE_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_string(page_body()))
            .expect(1)
            .mount(&fallback)
            .await;

        let html = fetcher(&primary, &fallback, Duration::from_secs(5))
            .fetch_page()
            .await
            .unwrap();
        assert!(html.contains("<table"));
    }

    #[tokio::test]
    async fn test_server_error_does_not_fall_back() {
        let primary = MockServer::start().await;
        let fallback = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&primary)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(page_body()))
            .expect(0)
            .mount(&fallback)
            .await;

        let err = fetcher(&primary, &fallback, Duration::from_secs(5))
            .fetch_page()
            .await
            .unwrap_err();
        assert_eq!(err, ScrapeError::Fetch("HTTP error! status: 503".into()));
    }

    #[tokio::test]
    async fn test_fallback_404_is_fetch_error() {
        let primary = MockServer::start().await;
        let fallback = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&primary)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&fallback)
            .await;

        let err = fetcher(&primary, &fallback, Duration::from_secs(5))
            .fetch_page()
            .await
            .unwrap_err();
        assert!(matches!(err, ScrapeError::Fetch(msg) if msg.contains("404")));
    }

    #[tokio::test]
    async fn test_short_body_is_fetch_error() {
        let primary = MockServer::start().await;
        let fallback = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
            .mount(&primary)
            .await;

        let err = fetcher(&primary, &fallback, Duration::from_secs(5))
            .fetch_page()
            .await
            .unwrap_err();
        assert!(matches!(err, ScrapeError::Fetch(msg) if msg.contains("short")));
    }

    #[tokio::test]
    async fn test_timeout_on_primary_skips_fallback() {
        let primary = MockServer::start().await;
        let fallback = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(page_body())
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&primary)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(page_body()))
            .expect(0)
            .mount(&fallback)
            .await;

        let budget = Duration::from_millis(200);
        let err = fetcher(&primary, &fallback, budget)
            .fetch_page()
            .await
            .unwrap_err();
        assert_eq!(err, ScrapeError::Timeout(budget));
    }

    #[tokio::test]
    async fn test_refused_connection_is_fetch_error() {
        // Bind then drop to get a local port with nothing listening.
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let fallback = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(page_body()))
            .expect(0)
            .mount(&fallback)
            .await;

        let cfg = ScraperConfig {
            primary_url: format!("http://127.0.0.1:{port}{PAGE_PATH}"),
            fallback_url: format!("{}{PAGE_PATH}", fallback.uri()),
            ..ScraperConfig::default()
        };
        let err = HttpFetcher::new(&cfg)
            .unwrap()
            .with_timeout(Duration::from_secs(5))
            .fetch_page()
            .await
            .unwrap_err();
        assert!(matches!(err, ScrapeError::Fetch(_)), "{err:?}");
        assert!(!err.is_timeout());
    }
}
