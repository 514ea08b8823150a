//! Health check endpoints

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use serde_json::json;

use super::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub version: String,
    pub fetchers: Vec<&'static str>,
    pub rate_limit: Option<String>,
}

#[derive(Serialize, Clone, Copy, PartialEq, Eq, Debug)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
}

/// GET /_health
pub async fn ping() -> impl IntoResponse {
    Json(json!({ "ok": true }))
}

/// GET /health - degraded when only the plain HTTP fetchers are available
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let fetchers = state.fetchers.as_ref().clone();
    let status = if fetchers.contains(&"browser") {
        HealthStatus::Healthy
    } else {
        HealthStatus::Degraded
    };

    let response = HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION").to_string(),
        fetchers,
        rate_limit: state
            .rate_limiter
            .as_ref()
            .map(|limiter| limiter.rule().to_string()),
    };

    (StatusCode::OK, Json(response))
}

/// GET /live
pub async fn live_check() -> impl IntoResponse {
    StatusCode::OK
}
