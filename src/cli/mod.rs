//! CLI module for the mangatek scraper
//!
//! - `serve`: HTTP API server (default)
//! - `check`: verify the headless browser can render a page
//! - `fetch`: run the fetcher chain once against a URL

pub mod check;
pub mod fetch;
pub mod serve;

use anyhow::Context;
use clap::{Parser, Subcommand};

use crate::config::AppConfig;
use crate::infrastructure::observability::init_tracing;

/// Mangatek scraper - JSON API over the mangatek catalogue
#[derive(Parser)]
#[command(name = "mangatek-scraper")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP API server (default)
    Serve,

    /// Launch or reach the configured browser and render a blank page
    Check,

    /// Fetch a URL through the fallback chain and report which fetcher succeeded
    Fetch(fetch::FetchArgs),
}

/// Load `.env`, layered configuration and logging shared by every command
pub(crate) fn bootstrap() -> anyhow::Result<AppConfig> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("failed to load configuration")?;
    init_tracing(&config.logging, &config.observability.tracing);

    Ok(config)
}
