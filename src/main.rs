use clap::Parser;
use mangatek_scraper::cli::{self, Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => cli::serve::run().await,
        Command::Check => cli::check::run().await,
        Command::Fetch(args) => cli::fetch::run(args).await,
    }
}
