//! Mangatek Scraper
//!
//! JSON API over the mangatek catalogue:
//! - Manga listings, details and chapter image URLs
//! - Headless browser fetching with plain HTTP fallbacks
//! - Per-endpoint response cache and per-client rate limiting

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use api::AppState;
use infrastructure::fetch::build_fetcher;
use infrastructure::rate_limit::RateLimiter;
use infrastructure::response_cache::ResponseCache;
use infrastructure::services::ScraperService;

/// Wire fetchers, cache, scraper service and rate limiter from configuration
pub fn create_app_state(config: &AppConfig) -> anyhow::Result<AppState> {
    let chain = build_fetcher(config).context("failed to build fetcher chain")?;
    let fetchers = chain.fetcher_names();

    let cache = ResponseCache::new(&config.cache);
    let scraper = ScraperService::new(
        Arc::new(chain),
        cache,
        config.scraper.base(),
        config.scraper.allowed_host()?,
    )?;

    let mut state = AppState::new(Arc::new(scraper), fetchers)
        .with_trust_forwarded_for(config.server.trust_forwarded_for);

    if config.rate_limit.enabled {
        let rule = config
            .rate_limit
            .rule()
            .context("invalid rate_limit.limit")?;
        info!("Rate limiting scraping routes at {}", rule);
        state = state.with_rate_limiter(RateLimiter::new(rule));
    } else {
        info!("Rate limiting disabled");
    }

    Ok(state)
}
