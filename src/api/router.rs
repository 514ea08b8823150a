use axum::{middleware, routing::get, Router};
use tower_http::trace::TraceLayer;

use super::health;
use super::middleware::{logging_middleware, metrics_middleware, security_headers_middleware};
use super::scrape;
use super::state::AppState;
use crate::infrastructure::observability::{create_metrics_router, PrometheusMetrics};

/// Create the full router with application state
pub fn create_router(state: AppState, metrics: Option<PrometheusMetrics>) -> Router {
    let mut router = Router::new()
        .route("/_health", get(health::ping))
        .route("/health", get(health::health_check))
        .route("/live", get(health::live_check))
        .merge(scrape::create_scrape_router(state.clone()))
        .with_state(state)
        .layer(middleware::from_fn(security_headers_middleware))
        .layer(middleware::from_fn(logging_middleware))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http());

    if let Some(m) = metrics {
        router = router.merge(create_metrics_router(m));
    }

    router
}

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;
    use std::sync::Arc;
    use std::time::Duration;

    use axum::body::{to_bytes, Body};
    use axum::extract::ConnectInfo;
    use axum::http::{Request, StatusCode};
    use axum::response::Response;
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;
    use crate::domain::fetch::StubFetcher;
    use crate::domain::RateLimitRule;
    use crate::infrastructure::rate_limit::RateLimiter;
    use crate::infrastructure::response_cache::ResponseCache;
    use crate::infrastructure::services::ScraperService;

    const LIST_HTML: &str = r#"<a class="manga-card" href="/manga/solo"><img src="/covers/solo.jpg" alt="Solo"></a>"#;
    const READER_HTML: &str = r#"<div class="reader"><img src="/uploads/solo/1/01.jpg"></div>"#;

    fn stub() -> StubFetcher {
        StubFetcher::new()
            .with_page("https://mangatek.com/manga-list?sort=views", LIST_HTML)
            .with_page("https://mangatek.com/reader/solo/1", READER_HTML)
            .with_error("https://mangatek.com/manga/gone", "Fetching failed. last=http fetch failed: HTTP 404 Not Found")
    }

    fn state(limit: Option<u32>) -> AppState {
        let scraper = ScraperService::new(
            Arc::new(stub()),
            ResponseCache::with_ttl(Duration::from_secs(60), 64),
            "https://mangatek.com",
            "mangatek.com",
        )
        .unwrap();

        let state = AppState::new(Arc::new(scraper), vec!["http", "browser_like"]);
        match limit {
            Some(n) => state.with_rate_limiter(RateLimiter::new(RateLimitRule::per_minute(n))),
            None => state,
        }
    }

    fn app(limit: Option<u32>) -> Router {
        create_router(state(limit), None)
    }

    fn get(uri: &str) -> Request<Body> {
        let mut request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        request
            .extensions_mut()
            .insert(ConnectInfo("127.0.0.1:40000".parse::<SocketAddr>().unwrap()));
        request
    }

    async fn json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_legacy_health() {
        let response = app(None).oneshot(get("/_health")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json(response).await, serde_json::json!({"ok": true}));
    }

    #[tokio::test]
    async fn test_health_reports_fetchers() {
        let response = app(Some(15)).oneshot(get("/health")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json(response).await;
        assert_eq!(body["status"], "degraded");
        assert_eq!(body["fetchers"], serde_json::json!(["http", "browser_like"]));
        assert_eq!(body["rate_limit"], "15 per 1 minute");
    }

    #[tokio::test]
    async fn test_live() {
        let response = app(None).oneshot(get("/live")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_manga_list() {
        let response = app(None).oneshot(get("/manga-list")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get("x-content-type-options").unwrap(),
            "nosniff"
        );
        let body = json(response).await;
        assert_eq!(body["items"][0]["slug"], "solo");
        assert_eq!(body["items"][0]["url"], "https://mangatek.com/manga/solo");
        assert_eq!(body["pagination"]["current"], 1);
        assert!(body["note"].is_null());
    }

    #[tokio::test]
    async fn test_manga_list_invalid_page() {
        for uri in ["/manga-list?page=0", "/manga-list?page=abc", "/manga-list?page=-1"] {
            let response = app(None).oneshot(get(uri)).await.unwrap();

            assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY, "{}", uri);
            assert!(json(response).await["detail"].is_string());
        }
    }

    #[tokio::test]
    async fn test_upstream_failure_is_bad_gateway() {
        let response = app(None).oneshot(get("/manga/gone")).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(
            json(response).await["detail"],
            "Fetching failed. last=http fetch failed: HTTP 404 Not Found"
        );
    }

    #[tokio::test]
    async fn test_chapter_images_with_and_without_debug() {
        let app = app(None);

        let response = app.clone().oneshot(get("/reader/solo/1")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json(response).await;
        assert_eq!(body["images"][0], "https://mangatek.com/uploads/solo/1/01.jpg");
        assert_eq!(body["chapter"], 1);
        assert!(body.get("debug").is_none());

        let response = app.oneshot(get("/reader/solo/1?debug=true")).await.unwrap();
        let body = json(response).await;
        assert_eq!(body["debug"]["strategy"], "reader_container");
    }

    #[tokio::test]
    async fn test_non_numeric_chapter_is_unprocessable() {
        let response = app(None).oneshot(get("/reader/solo/one")).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_from_url() {
        let response = app(None)
            .oneshot(get("/reader/from-url?url=https%3A%2F%2Fmangatek.com%2Freader%2Fsolo%2F1"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json(response).await["slug"], "solo");
    }

    #[tokio::test]
    async fn test_from_url_rejections() {
        let response = app(None)
            .oneshot(get("/reader/from-url?url=https://example.org/reader/solo/1"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json(response).await["detail"], "Only mangatek.com URLs allowed");

        let response = app(None)
            .oneshot(get("/reader/from-url?url=https://mangatek.com/about"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            json(response).await["detail"],
            "Could not extract slug/chapter from URL"
        );

        let response = app(None).oneshot(get("/reader/from-url")).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_rate_limit() {
        let app = app(Some(2));

        for remaining in ["1", "0"] {
            let response = app.clone().oneshot(get("/manga-list")).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK);
            assert_eq!(response.headers().get("x-ratelimit-limit").unwrap(), "2");
            assert_eq!(response.headers().get("x-ratelimit-remaining").unwrap(), remaining);
        }

        let response = app.clone().oneshot(get("/reader/solo/1")).await.unwrap();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert!(response.headers().contains_key("retry-after"));
        assert_eq!(
            json(response).await["detail"],
            "Rate limit exceeded: 2 per 1 minute"
        );

        let response = app.oneshot(get("/_health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
