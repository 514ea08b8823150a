//! Check command - browser self-check

use anyhow::Context;
use tracing::info;

use crate::infrastructure::browser::BrowserFetcher;

/// Exit non-zero unless the configured browser renders a blank page
pub async fn run() -> anyhow::Result<()> {
    let config = super::bootstrap()?;

    let target = config
        .browser
        .endpoint
        .clone()
        .unwrap_or_else(|| config.browser.executable.clone());
    info!("Checking browser {}", target);

    let fetcher = BrowserFetcher::new(config.browser.clone(), &config.scraper);
    let product = fetcher
        .self_check()
        .await
        .with_context(|| format!("browser self-check failed for {}", target))?;

    println!("ok: {}", product);
    Ok(())
}
