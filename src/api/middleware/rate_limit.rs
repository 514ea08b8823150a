//! Per-client rate limiting for the scraping routes

use std::net::SocketAddr;

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{header, HeaderMap, HeaderValue, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::warn;

use super::logging::matched_path;
use crate::api::state::AppState;
use crate::api::types::ApiError;
use crate::infrastructure::observability::record_rate_limited;

const LIMIT_HEADER: &str = "x-ratelimit-limit";
const REMAINING_HEADER: &str = "x-ratelimit-remaining";

pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let Some(limiter) = state.rate_limiter.clone() else {
        return next.run(request).await;
    };

    let client = client_key(&request, state.trust_forwarded_for);
    let result = limiter.check_and_record(&client).await;

    if !result.allowed {
        let path = matched_path(&request);
        record_rate_limited(&path);
        warn!(client = %client, path = %path, "Rate limit exceeded");

        let mut response =
            ApiError::rate_limited(format!("Rate limit exceeded: {}", limiter.rule())).into_response();
        let headers = response.headers_mut();
        headers.insert(header::RETRY_AFTER, HeaderValue::from(result.reset_in_seconds));
        set_limit_headers(headers, result.limit, 0);
        return response;
    }

    let mut response = next.run(request).await;
    set_limit_headers(response.headers_mut(), result.limit, result.remaining);
    response
}

fn set_limit_headers(headers: &mut HeaderMap, limit: u32, remaining: u32) {
    headers.insert(LIMIT_HEADER, HeaderValue::from(limit));
    headers.insert(REMAINING_HEADER, HeaderValue::from(remaining));
}

/// Peer IP, or the first forwarded hop when proxies are trusted
fn client_key(request: &Request<Body>, trust_forwarded_for: bool) -> String {
    if trust_forwarded_for {
        let forwarded = request
            .headers()
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty());

        if let Some(ip) = forwarded {
            return ip.to_string();
        }
    }

    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}
