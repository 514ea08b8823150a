//! Cookie-keeping HTTP fetcher that presents a full browser header set

use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::{info, warn};
use url::Url;

use super::http::{build_client, get_text};
use crate::config::ScraperConfig;
use crate::domain::{DomainError, PageFetcher};

const FETCHER_NAME: &str = "browser_like";

const BROWSER_HEADERS: [(&str, &str); 7] = [
    (
        "accept",
        "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8",
    ),
    ("upgrade-insecure-requests", "1"),
    ("sec-fetch-dest", "document"),
    ("sec-fetch-mode", "navigate"),
    ("sec-fetch-site", "none"),
    ("sec-fetch-user", "?1"),
    ("cache-control", "no-cache"),
];

/// Last-resort fetcher for sites that gate bare clients.
///
/// A 403 or 503 answer triggers one visit to the site root so that any
/// cookies handed out there are replayed on the retry.
#[derive(Debug, Clone)]
pub struct BrowserLikeFetcher {
    client: reqwest::Client,
}

impl BrowserLikeFetcher {
    pub fn new(config: &ScraperConfig) -> Result<Self, DomainError> {
        Ok(Self {
            client: build_client(config, &BROWSER_HEADERS, true, FETCHER_NAME)?,
        })
    }

    fn is_gated(status: StatusCode) -> bool {
        matches!(status, StatusCode::FORBIDDEN | StatusCode::SERVICE_UNAVAILABLE)
    }

    fn origin_of(url: &str) -> Option<String> {
        Url::parse(url).ok()?.join("/").ok().map(|u| u.to_string())
    }
}

#[async_trait]
impl PageFetcher for BrowserLikeFetcher {
    fn name(&self) -> &'static str {
        FETCHER_NAME
    }

    async fn fetch(&self, url: &str) -> Result<String, DomainError> {
        info!(url = %url, "Browser-like fetch");

        let (mut status, mut body) = get_text(&self.client, url, FETCHER_NAME).await?;

        if Self::is_gated(status) {
            if let Some(origin) = Self::origin_of(url) {
                warn!(url = %url, status = %status, "Gated response, warming cookies at {}", origin);

                if let Err(e) = get_text(&self.client, &origin, FETCHER_NAME).await {
                    warn!("Cookie warm-up failed: {}", e);
                }

                (status, body) = get_text(&self.client, url, FETCHER_NAME).await?;
            }
        }

        if !status.is_success() {
            return Err(DomainError::fetch(FETCHER_NAME, format!("HTTP {}", status)));
        }

        Ok(body)
    }
}
