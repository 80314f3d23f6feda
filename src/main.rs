//! Rinkside: NHL injury report service.
//!
//! Entry point. Loads configuration, initialises structured logging,
//! wires the fetcher, cache and optional roster together, and serves the
//! HTTP API until Ctrl+C.

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{info, warn};

use rinkside::api::{self, ApiState};
use rinkside::config::AppConfig;
use rinkside::fetch::http::HttpFetcher;
use rinkside::roster::Roster;
use rinkside::service::InjuryService;

const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    let config_path = std::env::var("RINKSIDE_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.into());
    let cfg = AppConfig::load(&config_path)?;

    init_logging();

    info!(
        config = %config_path,
        port = cfg.server.port,
        primary_url = %cfg.scraper.primary_url,
        fallback_url = %cfg.scraper.fallback_url,
        ttl_secs = cfg.cache.ttl_secs,
        "Rinkside starting up"
    );

    let fetcher = HttpFetcher::new(&cfg.scraper).context("Failed to build HTTP client")?;
    let service = InjuryService::from_config(Arc::new(fetcher), &cfg);

    let roster = match &cfg.roster.path {
        Some(path) => {
            let roster = Roster::load(path)?;
            info!(
                path = %path.display(),
                teams = roster.teams.len(),
                players = roster.player_count(),
                "Roster loaded"
            );
            Some(roster)
        }
        None => {
            warn!("No roster configured, owner filtering will match nothing");
            None
        }
    };

    let state = Arc::new(ApiState::new(service, roster, &cfg.cache));

    api::serve(state, cfg.server.port, shutdown_signal()).await?;
    info!("Rinkside shut down cleanly.");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl+C");
        // Keep serving.
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received.");
}

/// Initialise the `tracing` subscriber.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("rinkside=info"));

    let json_logging = std::env::var("RINKSIDE_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_thread_ids(true)
            .init();
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    }
}
