//! Document fetchers and the fallback chain built from configuration

mod browser_like;
mod chain;
mod http;

pub use browser_like::BrowserLikeFetcher;
pub use chain::FallbackFetcher;
pub use http::HttpFetcher;

use std::sync::Arc;

use tracing::info;

use crate::config::AppConfig;
use crate::domain::{DomainError, PageFetcher};
use crate::infrastructure::browser::BrowserFetcher;

/// Assemble the chain: headless browser (when enabled), plain HTTP, then browser-like HTTP
pub fn build_fetcher(config: &AppConfig) -> Result<FallbackFetcher, DomainError> {
    let mut fetchers: Vec<Arc<dyn PageFetcher>> = Vec::with_capacity(3);

    if config.browser.enabled {
        fetchers.push(Arc::new(BrowserFetcher::new(
            config.browser.clone(),
            &config.scraper,
        )));
    }
    fetchers.push(Arc::new(HttpFetcher::new(&config.scraper)?));
    fetchers.push(Arc::new(BrowserLikeFetcher::new(&config.scraper)?));

    let chain = FallbackFetcher::new(fetchers, config.scraper.min_document_len);
    info!(fetchers = ?chain.fetcher_names(), "Fetcher chain ready");

    Ok(chain)
}
