use axum::{
    extract::{Request, State},
    http::{header, HeaderName, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::Utc;
use serde_json::json;
use std::sync::Arc;
use std::time::Instant;

use crate::config::Campaign;
use crate::error::ProxyError;
use crate::leaderboard::build_payload;
use crate::logging::log_request;
use crate::upstream::LeaderboardSource;

pub const JSON_UTF8: &str = "application/json; charset=utf-8";
pub const EDGE_CACHE: &str = "s-maxage=60, stale-while-revalidate=600";

/// Shared read-only state: the fixed campaign and the upstream client.
#[derive(Clone)]
pub struct AppState {
    pub campaign: Arc<Campaign>,
    pub source: Arc<dyn LeaderboardSource>,
}

impl AppState {
    pub fn new(campaign: Campaign, source: impl LeaderboardSource + 'static) -> Self {
        Self {
            campaign: Arc::new(campaign),
            source: Arc::new(source),
        }
    }
}

pub fn cors_headers() -> [(HeaderName, &'static str); 2] {
    [
        (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
        (header::ACCESS_CONTROL_ALLOW_METHODS, "GET, OPTIONS"),
    ]
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(get_leaderboard).options(preflight))
        .route("/api/leaderboard", get(get_leaderboard).options(preflight))
        .route("/health", get(|| async { Json(json!({ "status": "ok" })) }))
        .layer(middleware::from_fn(access_log))
        .with_state(state)
}

async fn get_leaderboard(State(state): State<AppState>) -> Result<Response, ProxyError> {
    let page = state.source.fetch_page().await?;
    let payload = build_payload(&page, &state.campaign, Utc::now());
    let body = serde_json::to_string_pretty(&payload)?;

    Ok((
        StatusCode::OK,
        cors_headers(),
        [(header::CONTENT_TYPE, JSON_UTF8), (header::CACHE_CONTROL, EDGE_CACHE)],
        body,
    )
        .into_response())
}

async fn preflight() -> impl IntoResponse {
    (StatusCode::NO_CONTENT, cors_headers())
}

async fn access_log(req: Request, next: Next) -> Response {
    let method = req.method().to_string();
    let path = req.uri().path().to_string();
    let started = Instant::now();
    let resp = next.run(req).await;
    log_request(
        &method,
        &path,
        resp.status().as_u16(),
        started.elapsed().as_secs_f64() * 1000.0,
    );
    resp
}
