//! Application state for shared services

use std::sync::Arc;

use crate::infrastructure::rate_limit::RateLimiter;
use crate::infrastructure::services::ScraperService;

/// Shared handles cloned into every request
#[derive(Clone, Debug)]
pub struct AppState {
    pub scraper: Arc<ScraperService>,
    /// `None` when rate limiting is disabled
    pub rate_limiter: Option<Arc<RateLimiter>>,
    /// Key clients by the first `X-Forwarded-For` hop instead of the peer address
    pub trust_forwarded_for: bool,
    /// Fetcher chain in the order it is tried
    pub fetchers: Arc<Vec<&'static str>>,
}

impl AppState {
    pub fn new(scraper: Arc<ScraperService>, fetchers: Vec<&'static str>) -> Self {
        Self {
            scraper,
            rate_limiter: None,
            trust_forwarded_for: false,
            fetchers: Arc::new(fetchers),
        }
    }

    pub fn with_rate_limiter(mut self, limiter: RateLimiter) -> Self {
        self.rate_limiter = Some(Arc::new(limiter));
        self
    }

    pub fn with_trust_forwarded_for(mut self, trust: bool) -> Self {
        self.trust_forwarded_for = trust;
        self
    }
}
