//! Scraping endpoints

pub mod manga;
pub mod reader;

use axum::{middleware, routing::get, Router};

use super::middleware::rate_limit_middleware;
use super::state::AppState;

/// Catalogue and reader routes, rate limited per client
pub fn create_scrape_router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/manga-list", get(manga::list_manga))
        .route("/manga/{slug}", get(manga::get_manga))
        .route("/reader/from-url", get(reader::chapter_from_url))
        .route("/reader/{slug}/{chapter}", get(reader::get_chapter))
        .route_layer(middleware::from_fn_with_state(state, rate_limit_middleware))
}
