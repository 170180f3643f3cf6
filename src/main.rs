//! vidgrid - Browse a remote video catalog with history-synced grid and player views

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod api;
mod browse;
mod catalog;
mod cli;
mod config;
mod utils;
mod view;

use cli::{Cli, Commands};
use config::AppConfig;
use utils::ConditionalStderrLayer;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        "vidgrid=debug,reqwest=debug"
    } else {
        "vidgrid=info"
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with(ConditionalStderrLayer::new(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        ))
        .init();

    let stored = AppConfig::load()?;

    // Command-line endpoint wins over the stored one for this run
    let mut config = stored.clone();
    if let Some(url) = &cli.api_url {
        config.api_url = url.clone();
    }

    match cli.command {
        Commands::Browse { page, id, sort } => {
            cli::commands::browse(&config, page, id, sort).await?;
        }
        Commands::List { sort, search, limit } => {
            cli::commands::list(&config, sort, search, limit).await?;
        }
        Commands::Show { id } => {
            cli::commands::show(&config, id).await?;
        }
        Commands::Config {
            site_url,
            related_limit,
            sort,
            page,
        } => {
            cli::commands::config(stored, cli.api_url, site_url, related_limit, sort, page)?;
        }
        Commands::Completion { shell } => {
            cli::commands::completion(shell);
        }
    }

    Ok(())
}
