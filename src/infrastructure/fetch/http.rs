//! Plain HTTP fetcher (no script execution)

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT_LANGUAGE, USER_AGENT};
use reqwest::redirect::Policy;
use tracing::info;

use crate::config::ScraperConfig;
use crate::domain::{DomainError, PageFetcher};

const FETCHER_NAME: &str = "http";

/// Build a reqwest client carrying the configured identity headers
pub(super) fn build_client(
    config: &ScraperConfig,
    extra_headers: &[(&'static str, &'static str)],
    cookie_store: bool,
    fetcher: &str,
) -> Result<reqwest::Client, DomainError> {
    let invalid = |what: &str, e: String| {
        DomainError::configuration(format!("{} client: invalid {}: {}", fetcher, what, e))
    };

    let mut headers = HeaderMap::new();
    headers.insert(
        USER_AGENT,
        HeaderValue::from_str(&config.user_agent).map_err(|e| invalid("user agent", e.to_string()))?,
    );
    headers.insert(
        ACCEPT_LANGUAGE,
        HeaderValue::from_str(&config.accept_language)
            .map_err(|e| invalid("accept language", e.to_string()))?,
    );

    for &(name, value) in extra_headers {
        headers.insert(HeaderName::from_static(name), HeaderValue::from_static(value));
    }

    let mut builder = reqwest::Client::builder()
        .default_headers(headers)
        .timeout(Duration::from_secs(config.timeout_secs))
        .redirect(Policy::limited(10))
        .cookie_store(cookie_store);

    if let Some(proxy) = config.http_proxy.as_deref() {
        let proxy = reqwest::Proxy::all(proxy).map_err(|e| invalid("proxy", e.to_string()))?;
        builder = builder.proxy(proxy);
    }

    builder
        .build()
        .map_err(|e| DomainError::configuration(format!("{} client: {}", fetcher, e)))
}

/// GET the body; transport failures are errors, statuses are left to the caller
pub(super) async fn get_text(
    client: &reqwest::Client,
    url: &str,
    fetcher: &str,
) -> Result<(reqwest::StatusCode, String), DomainError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| DomainError::fetch(fetcher, format!("Request failed: {}", e)))?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| DomainError::fetch(fetcher, format!("Failed to read body: {}", e)))?;

    Ok((status, body))
}

/// Fetches raw server HTML with reqwest
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(config: &ScraperConfig) -> Result<Self, DomainError> {
        Ok(Self {
            client: build_client(config, &[], false, FETCHER_NAME)?,
        })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    fn name(&self) -> &'static str {
        FETCHER_NAME
    }

    async fn fetch(&self, url: &str) -> Result<String, DomainError> {
        info!(url = %url, "HTTP fetch");

        let (status, body) = get_text(&self.client, url, FETCHER_NAME).await?;

        if !status.is_success() {
            return Err(DomainError::fetch(FETCHER_NAME, format!("HTTP {}", status)));
        }

        Ok(body)
    }
}
