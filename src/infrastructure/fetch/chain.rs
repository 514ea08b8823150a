//! Ordered fallback across fetchers

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use tracing::{error, info, warn};

use crate::domain::{DomainError, PageFetcher};
use crate::infrastructure::observability::{record_fetch_attempt, FetchOutcome};

/// Tries each fetcher in order and returns the first usable document.
///
/// A document is usable when it is longer than `min_document_len`
/// characters. When every fetcher fails the last failure is reported.
pub struct FallbackFetcher {
    fetchers: Vec<Arc<dyn PageFetcher>>,
    min_document_len: usize,
}

impl FallbackFetcher {
    pub fn new(fetchers: Vec<Arc<dyn PageFetcher>>, min_document_len: usize) -> Self {
        Self {
            fetchers,
            min_document_len,
        }
    }

    pub fn fetcher_names(&self) -> Vec<&'static str> {
        self.fetchers.iter().map(|f| f.name()).collect()
    }

    /// Fetch and report which fetcher produced the document
    pub async fn fetch_attributed(&self, url: &str) -> Result<(String, &'static str), DomainError> {
        let mut last_error = String::from("no fetchers configured");

        for fetcher in &self.fetchers {
            let start = Instant::now();

            match fetcher.fetch(url).await {
                Ok(html) => {
                    let length = html.chars().count();

                    if length > self.min_document_len {
                        record_fetch_attempt(fetcher.name(), FetchOutcome::Success, start.elapsed());
                        info!(fetcher = fetcher.name(), url = %url, length, "Fetched document");
                        return Ok((html, fetcher.name()));
                    }

                    record_fetch_attempt(fetcher.name(), FetchOutcome::TooShort, start.elapsed());
                    warn!(fetcher = fetcher.name(), url = %url, length, "Response too short");
                    last_error = DomainError::fetch(
                        fetcher.name(),
                        format!("response too short ({} chars)", length),
                    )
                    .to_string();
                }
                Err(e) => {
                    record_fetch_attempt(fetcher.name(), FetchOutcome::Error, start.elapsed());
                    warn!(fetcher = fetcher.name(), url = %url, "Attempt failed: {}", e);
                    last_error = e.to_string();
                }
            }
        }

        error!(url = %url, "All fetchers failed. last={}", last_error);

        Err(DomainError::upstream(format!(
            "Fetching failed. last={}",
            last_error
        )))
    }
}

impl std::fmt::Debug for FallbackFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FallbackFetcher")
            .field("fetchers", &self.fetcher_names())
            .field("min_document_len", &self.min_document_len)
            .finish()
    }
}

#[async_trait]
impl PageFetcher for FallbackFetcher {
    fn name(&self) -> &'static str {
        "fallback"
    }

    async fn fetch(&self, url: &str) -> Result<String, DomainError> {
        self.fetch_attributed(url).await.map(|(html, _)| html)
    }
}
