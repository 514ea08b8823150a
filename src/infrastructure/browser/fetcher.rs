//! Page fetcher that renders documents in a headless browser

use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use super::connection::{discover_ws_url, CdpConnection, PageSession};
use super::error::BrowserError;
use super::launcher::BrowserProcess;
use crate::config::{BrowserConfig, ScraperConfig};
use crate::domain::{DomainError, PageFetcher};

const FETCHER_NAME: &str = "browser";
const READY_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Renders each page in a fresh browser context so scripted content is present.
///
/// Uses the browser at `endpoint` when configured; otherwise a local
/// browser is started for the fetch and stopped afterwards.
#[derive(Debug, Clone)]
pub struct BrowserFetcher {
    config: BrowserConfig,
    user_agent: String,
    accept_language: String,
    timeout: Duration,
}

impl BrowserFetcher {
    pub fn new(config: BrowserConfig, scraper: &ScraperConfig) -> Self {
        Self {
            config,
            user_agent: scraper.user_agent.clone(),
            accept_language: scraper.accept_language.clone(),
            timeout: Duration::from_secs(scraper.timeout_secs),
        }
    }

    /// Start or reach the browser, render a blank page and report the product string
    pub async fn self_check(&self) -> Result<String, DomainError> {
        self.with_connection(|connection| async move {
            let version = connection.call("Browser.getVersion", None, None).await?;
            let html = self.render(&connection, "about:blank").await?;

            if !html.contains("<html") {
                return Err(BrowserError::InvalidResponse(format!(
                    "unexpected blank page markup: {}",
                    html
                )));
            }

            Ok(version["product"].as_str().unwrap_or("unknown").to_string())
        })
        .await
        .map_err(|e| DomainError::fetch(FETCHER_NAME, e.to_string()))
    }

    fn remote_endpoint(&self) -> Option<&str> {
        self.config
            .endpoint
            .as_deref()
            .filter(|e| !e.trim().is_empty())
    }

    async fn with_connection<T, F, Fut>(&self, f: F) -> Result<T, BrowserError>
    where
        F: FnOnce(std::sync::Arc<CdpConnection>) -> Fut,
        Fut: std::future::Future<Output = Result<T, BrowserError>>,
    {
        let (process, ws_url) = match self.remote_endpoint() {
            Some(endpoint) => (None, discover_ws_url(endpoint, self.timeout).await?),
            None => {
                let process = BrowserProcess::launch(&self.config).await?;
                let ws_url = process.ws_url().to_string();
                (Some(process), ws_url)
            }
        };

        let result = match CdpConnection::connect(&ws_url, self.timeout).await {
            Ok(connection) => {
                let connection = std::sync::Arc::new(connection);
                let result = f(connection.clone()).await;
                connection.close().await;
                result
            }
            Err(e) => Err(e),
        };

        if let Some(process) = process {
            process.shutdown().await;
        }

        result
    }

    async fn render(&self, connection: &CdpConnection, url: &str) -> Result<String, BrowserError> {
        // Per-context proxy only applies to a shared remote browser
        let context_params = match (self.remote_endpoint(), &self.config.proxy) {
            (Some(_), Some(proxy)) if !proxy.trim().is_empty() => json!({ "proxyServer": proxy }),
            _ => json!({}),
        };

        let context = connection
            .call("Target.createBrowserContext", Some(context_params), None)
            .await?;
        let context_id = required_str(&context, "browserContextId")?;

        let result = self.render_in_context(connection, &context_id, url).await;

        if let Err(e) = connection
            .call(
                "Target.disposeBrowserContext",
                Some(json!({ "browserContextId": context_id })),
                None,
            )
            .await
        {
            debug!("Failed to dispose browser context: {}", e);
        }

        result
    }

    async fn render_in_context(
        &self,
        connection: &CdpConnection,
        context_id: &str,
        url: &str,
    ) -> Result<String, BrowserError> {
        let target = connection
            .call(
                "Target.createTarget",
                Some(json!({ "url": "about:blank", "browserContextId": context_id })),
                None,
            )
            .await?;
        let target_id = required_str(&target, "targetId")?;

        let attached = connection
            .call(
                "Target.attachToTarget",
                Some(json!({ "targetId": target_id, "flatten": true })),
                None,
            )
            .await?;
        let page = PageSession::new(connection, required_str(&attached, "sessionId")?);

        let result = self.load_document(&page, url).await;

        if let Err(e) = connection
            .call("Target.closeTarget", Some(json!({ "targetId": target_id })), None)
            .await
        {
            debug!("Failed to close target: {}", e);
        }

        result
    }

    async fn load_document(&self, page: &PageSession<'_>, url: &str) -> Result<String, BrowserError> {
        page.call(
            "Network.setUserAgentOverride",
            json!({
                "userAgent": self.user_agent,
                "acceptLanguage": self.accept_language,
            }),
        )
        .await?;

        let navigation = page.call("Page.navigate", json!({ "url": url })).await?;
        if let Some(error) = navigation.get("errorText").and_then(Value::as_str) {
            return Err(BrowserError::Navigation(error.to_string()));
        }

        if let Err(e) = wait_for_ready_state(page, &["complete"], self.timeout).await {
            if !e.is_timeout() {
                return Err(e);
            }

            warn!(url = %url, "Load did not complete, waiting for DOM content");
            let fallback = Duration::from_millis(self.config.load_fallback_timeout_ms);
            if let Err(e) = wait_for_ready_state(page, &["interactive", "complete"], fallback).await {
                debug!("DOM content wait gave up: {}", e);
            }
        }

        tokio::time::sleep(Duration::from_millis(self.config.settle_ms)).await;

        page.evaluate("document.documentElement.outerHTML")
            .await?
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| BrowserError::InvalidResponse("outerHTML is not a string".to_string()))
    }
}

async fn wait_for_ready_state(
    page: &PageSession<'_>,
    accepted: &[&str],
    timeout: Duration,
) -> Result<(), BrowserError> {
    let start = Instant::now();

    loop {
        // Evaluation may fail briefly while the new document replaces the old one
        match page.evaluate("document.readyState").await {
            Ok(state) => {
                if state.as_str().is_some_and(|s| accepted.contains(&s)) {
                    return Ok(());
                }
            }
            Err(e @ BrowserError::SessionClosed) => return Err(e),
            Err(e) => debug!("readyState poll failed: {}", e),
        }

        if start.elapsed() > timeout {
            return Err(BrowserError::Timeout(format!(
                "document not {} after {:?}",
                accepted.join("/"),
                timeout
            )));
        }

        tokio::time::sleep(READY_POLL_INTERVAL).await;
    }
}

fn required_str(value: &Value, key: &str) -> Result<String, BrowserError> {
    value[key]
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| BrowserError::InvalidResponse(format!("missing {}", key)))
}

#[async_trait]
impl PageFetcher for BrowserFetcher {
    fn name(&self) -> &'static str {
        FETCHER_NAME
    }

    async fn fetch(&self, url: &str) -> Result<String, DomainError> {
        info!(url = %url, "Browser fetch");
        let start = Instant::now();

        let url = url.to_string();
        let html = self
            .with_connection(|connection| async move { self.render(&connection, &url).await })
            .await
            .map_err(|e| DomainError::fetch(FETCHER_NAME, e.to_string()))?;

        debug!(elapsed_ms = start.elapsed().as_millis() as u64, "Browser render finished");
        Ok(html)
    }
}
