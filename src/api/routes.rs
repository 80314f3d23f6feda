//! API route handlers.
//!
//! All endpoints return JSON. State is shared via `Arc<ApiState>`.

use axum::{
    extract::{Query, State},
    http::{header, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use crate::config::CacheConfig;
use crate::roster::Roster;
use crate::service::{InjuryService, Served};
use crate::types::{InjuryRecord, ScrapeError, ScrapeResult};

pub const X_CACHE: HeaderName = HeaderName::from_static("x-cache");

/// Error text shown to clients when no data can be served.
pub const FETCH_FAILED: &str = "Failed to fetch injuries data";

// ---------------------------------------------------------------------------
// Shared state
// ---------------------------------------------------------------------------

/// Shared state accessible by all route handlers.
pub struct ApiState {
    pub service: InjuryService,
    /// Used for `?owner=` filtering. Without one, no owner matches.
    pub roster: Option<Roster>,
    cache_control: HeaderValue,
}

impl ApiState {
    pub fn new(service: InjuryService, roster: Option<Roster>, cache: &CacheConfig) -> Self {
        Self {
            service,
            roster,
            cache_control: cache_control_value(cache),
        }
    }

    /// Keep only the records whose player belongs to `owner`.
    pub fn filter_by_owner(&self, result: &ScrapeResult, owner: &str) -> ScrapeResult {
        result.filtered(|record| {
            self.roster
                .as_ref()
                .and_then(|roster| roster.owner_of(&record.name))
                .is_some_and(|o| o == owner)
        })
    }
}

pub type AppState = Arc<ApiState>;

fn cache_control_value(cache: &CacheConfig) -> HeaderValue {
    let value = format!(
        "public, s-maxage={}, stale-while-revalidate={}",
        cache.ttl_secs, cache.stale_while_revalidate_secs
    );
    // Digits and ASCII only, always a valid header value.
    HeaderValue::from_str(&value).unwrap_or_else(|_| HeaderValue::from_static("public"))
}

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
pub struct InjuriesQuery {
    pub refresh: Option<String>,
    pub owner: Option<String>,
}

impl InjuriesQuery {
    /// Only the literal `true` forces a refresh.
    pub fn force_refresh(&self) -> bool {
        self.refresh.as_deref() == Some("true")
    }
}

/// Body returned when the scrape failed and nothing is cached.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorEnvelope {
    pub error: String,
    pub message: String,
    pub scraped_at: DateTime<Utc>,
    pub count: usize,
    pub items: Vec<InjuryRecord>,
}

impl From<&ScrapeError> for ErrorEnvelope {
    fn from(err: &ScrapeError) -> Self {
        Self {
            error: FETCH_FAILED.into(),
            message: err.to_string(),
            scraped_at: Utc::now(),
            count: 0,
            items: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Route handlers
// ---------------------------------------------------------------------------

/// GET /injuries?refresh=<bool>&owner=<str>
pub async fn get_injuries(State(state): State<AppState>, Query(query): Query<InjuriesQuery>) -> Response {
    match state.service.injuries(query.force_refresh()).await {
        Ok(served) => injuries_response(&state, served, query.owner.as_deref()),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, Json(ErrorEnvelope::from(&e))).into_response(),
    }
}

fn injuries_response(state: &ApiState, served: Served, owner: Option<&str>) -> Response {
    let headers = [
        (X_CACHE, HeaderValue::from_static(served.status.as_str())),
        (header::CACHE_CONTROL, state.cache_control.clone()),
    ];

    match owner {
        Some(owner) => {
            let filtered = state.filter_by_owner(&served.payload, owner);
            debug!(owner, kept = filtered.count, of = served.payload.count, "Filtered injuries by owner");
            (headers, Json(filtered)).into_response()
        }
        None => (headers, Json(served.payload.as_ref())).into_response(),
    }
}

/// GET /health
pub async fn health() -> StatusCode {
    StatusCode::OK
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
