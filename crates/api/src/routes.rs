use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, Redirect},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use signalminer_core::cache::SignalCache;
use signalminer_core::domain::signal::StartupSignal;
use signalminer_core::fetcher::{FetchOutcome, SignalFetcher, SignalSource};
use signalminer_core::filter::{Facets, SignalFilter};
use signalminer_core::storage::startups::{
    self, TrendSummary, DEFAULT_HISTORY_LIMIT, DEFAULT_TREND_DAYS,
};
use signalminer_core::summary::Summary;

use crate::dashboard;

#[derive(Clone)]
pub struct AppState {
    pub fetcher: SignalFetcher,
    pub cache: Arc<SignalCache>,
    pub pool: Option<PgPool>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/", get(get_dashboard))
        .route("/refresh", post(post_refresh))
        .route("/api/signals", get(get_signals))
        .route("/api/facets", get(get_facets))
        .route("/api/summary", get(get_summary))
        .route("/api/history", get(get_history))
        .route("/api/trends", get(get_trends))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

async fn healthz() -> &'static str {
    "ok"
}

#[derive(Debug, Default, Deserialize)]
pub struct FilterParams {
    sector: Option<String>,
    funding_stage: Option<String>,
    signal_type: Option<String>,
    min_score: Option<String>,
}

impl FilterParams {
    fn into_filter(self) -> Result<SignalFilter, StatusCode> {
        let min_score = match self.min_score.as_deref().map(str::trim) {
            None | Some("") => 0,
            Some(s) => s.parse::<i32>().map_err(|_| StatusCode::BAD_REQUEST)?,
        };
        Ok(SignalFilter {
            sector: self.sector,
            funding_stage: self.funding_stage,
            signal_type: self.signal_type,
            min_score,
        })
    }
}

/// Reads the cache and writes freshly fetched live results through to the
/// database when one is configured.
async fn load(state: &AppState) -> Arc<FetchOutcome> {
    let read = state.cache.get_or_fetch(&state.fetcher).await;

    if read.refreshed && !read.outcome.is_fallback() {
        if let Some(pool) = &state.pool {
            match startups::store_signals(pool, &read.outcome.signals).await {
                Ok(rows) => tracing::info!(rows, "persisted startup signals"),
                Err(e) => {
                    sentry_anyhow::capture_anyhow(&e);
                    tracing::error!(error = %e, "persisting startup signals failed");
                }
            }
        }
    }

    read.outcome
}

async fn get_dashboard(
    State(state): State<AppState>,
    Query(params): Query<FilterParams>,
) -> Result<Html<String>, StatusCode> {
    let filter = params.into_filter()?;
    let outcome = load(&state).await;

    let facets = Facets::of(&outcome.signals);
    let filtered = filter.apply(&outcome.signals);
    let summary = Summary::of(&filtered);

    Ok(Html(dashboard::render(&dashboard::Page {
        outcome: &outcome,
        filter: &filter,
        facets: &facets,
        filtered: &filtered,
        summary: &summary,
    })))
}

async fn post_refresh(State(state): State<AppState>) -> Redirect {
    state.cache.invalidate().await;
    Redirect::to("/")
}

#[derive(Debug, Serialize)]
struct ApiSignals {
    source: SignalSource,
    notice: Option<&'static str>,
    fetched_at: DateTime<Utc>,
    total: usize,
    signals: Vec<StartupSignal>,
}

async fn get_signals(
    State(state): State<AppState>,
    Query(params): Query<FilterParams>,
) -> Result<Json<ApiSignals>, StatusCode> {
    let filter = params.into_filter()?;
    let outcome = load(&state).await;

    Ok(Json(ApiSignals {
        source: outcome.source,
        notice: outcome.notice(),
        fetched_at: outcome.fetched_at,
        total: outcome.signals.len(),
        signals: filter.apply(&outcome.signals),
    }))
}

async fn get_facets(State(state): State<AppState>) -> Json<Facets> {
    let outcome = load(&state).await;
    Json(Facets::of(&outcome.signals))
}

async fn get_summary(
    State(state): State<AppState>,
    Query(params): Query<FilterParams>,
) -> Result<Json<Summary>, StatusCode> {
    let filter = params.into_filter()?;
    let outcome = load(&state).await;
    Ok(Json(Summary::of(&filter.apply(&outcome.signals))))
}

#[derive(Debug, Deserialize)]
struct HistoryParams {
    limit: Option<i64>,
}

async fn get_history(
    State(state): State<AppState>,
    Query(params): Query<HistoryParams>,
) -> Result<Json<Vec<StartupSignal>>, StatusCode> {
    let Some(pool) = &state.pool else {
        return Err(StatusCode::SERVICE_UNAVAILABLE);
    };

    let limit = params.limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
    let signals = startups::recent_signals(pool, limit).await.map_err(|e| {
        sentry_anyhow::capture_anyhow(&e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    Ok(Json(signals))
}

#[derive(Debug, Deserialize)]
struct TrendParams {
    days: Option<i64>,
}

async fn get_trends(
    State(state): State<AppState>,
    Query(params): Query<TrendParams>,
) -> Result<Json<TrendSummary>, StatusCode> {
    let days = params.days.unwrap_or(DEFAULT_TREND_DAYS);
    if let Err(e) = startups::trend_cutoff(Utc::now(), days) {
        tracing::debug!(error = %e, "rejected trend window");
        return Err(StatusCode::BAD_REQUEST);
    }

    let Some(pool) = &state.pool else {
        return Err(StatusCode::SERVICE_UNAVAILABLE);
    };

    let trend = startups::trends(pool, days).await.map_err(|e| {
        sentry_anyhow::capture_anyhow(&e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    Ok(Json(trend))
}
