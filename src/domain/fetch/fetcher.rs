use async_trait::async_trait;

use crate::domain::DomainError;

#[cfg(test)]
use mockall::automock;

/// Retrieves the HTML document behind a URL
#[cfg_attr(test, automock)]
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Short name used in logs, metrics and error messages
    fn name(&self) -> &'static str;

    /// Fetch the document body
    async fn fetch(&self, url: &str) -> Result<String, DomainError>;
}

#[cfg(test)]
pub mod mock {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    /// Fetcher serving canned documents by URL, counting calls
    #[derive(Debug, Default)]
    pub struct StubFetcher {
        pages: HashMap<String, String>,
        errors: HashMap<String, String>,
        calls: AtomicUsize,
    }

    impl StubFetcher {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_page(mut self, url: impl Into<String>, html: impl Into<String>) -> Self {
            self.pages.insert(url.into(), html.into());
            self
        }

        pub fn with_error(mut self, url: impl Into<String>, message: impl Into<String>) -> Self {
            self.errors.insert(url.into(), message.into());
            self
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl PageFetcher for StubFetcher {
        fn name(&self) -> &'static str {
            "stub"
        }

        async fn fetch(&self, url: &str) -> Result<String, DomainError> {
            self.calls.fetch_add(1, Ordering::SeqCst);

            if let Some(message) = self.errors.get(url) {
                return Err(DomainError::upstream(message.clone()));
            }

            self.pages
                .get(url)
                .cloned()
                .ok_or_else(|| DomainError::upstream(format!("Fetching failed. last=no page for {}", url)))
        }
    }
}
