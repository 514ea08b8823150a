//! Fetch command - one-off run of the fetcher chain

use anyhow::Context;
use clap::Args;

use crate::infrastructure::fetch::build_fetcher;

#[derive(Args, Debug)]
pub struct FetchArgs {
    /// Page to fetch
    pub url: String,

    /// Skip the headless browser
    #[arg(long)]
    pub no_browser: bool,

    /// Print the document instead of a summary
    #[arg(long)]
    pub print: bool,
}

pub async fn run(args: FetchArgs) -> anyhow::Result<()> {
    let mut config = super::bootstrap()?;
    if args.no_browser {
        config.browser.enabled = false;
    }

    let chain = build_fetcher(&config)?;
    let (html, source) = chain
        .fetch_attributed(&args.url)
        .await
        .with_context(|| format!("fetching {}", args.url))?;

    if args.print {
        println!("{}", html);
    } else {
        println!("{} bytes via {}", html.len(), source);
    }

    Ok(())
}
