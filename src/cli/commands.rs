//! CLI command handlers

use anyhow::{Context, Result};
use clap_complete::generate;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::api::{CatalogClient, VideoRecord};
use crate::browse;
use crate::catalog::{
    filter_records, related_to, resolve_query, sort_records, CatalogStore, Resolution, SortKey,
    StoreStatus,
};
use crate::config::AppConfig;
use crate::utils::format_date;
use crate::view::{App, PageMode};

/// Handle the `browse` command
pub async fn browse(
    config: &AppConfig,
    page: Option<PageMode>,
    id: Option<String>,
    sort: Option<SortKey>,
) -> Result<()> {
    let client = Arc::new(CatalogClient::new(&config.api_url)?);

    let mut settings = config.view_settings();
    if let Some(sort) = sort {
        settings.sort = sort;
    }

    let mode = page.unwrap_or(config.page);
    let mut app = App::new(client, config.routes()?, settings, mode, id.as_deref());

    browse::run_browser(&mut app).await?;

    println!("Last address: {}", app.location().as_str().cyan());
    Ok(())
}

/// Handle the `list` command
pub async fn list(
    config: &AppConfig,
    sort: Option<SortKey>,
    search: Option<String>,
    limit: Option<usize>,
) -> Result<()> {
    let client = CatalogClient::new(&config.api_url)?;
    let store = fetch_store(&client).await?;

    if let StoreStatus::Empty | StoreStatus::Unfetched = store.status() {
        println!("{}", "No videos found.".yellow());
        return Ok(());
    }

    let sort = sort.unwrap_or(config.default_sort);
    let sorted = sort_records(store.records(), sort, &mut rand::thread_rng());
    let shown = filter_records(sorted, search.as_deref().unwrap_or(""));

    if shown.is_empty() {
        println!("{}", "No videos match the search.".yellow());
        return Ok(());
    }

    println!(
        "{} ({} of {} videos, {})",
        "Catalog".green().bold(),
        shown.len(),
        store.len(),
        sort.label()
    );
    if !sort.is_deterministic() {
        println!("{}", "  (placeholder ordering, changes on every run)".dimmed());
    }
    println!();

    for record in shown.iter().take(limit.unwrap_or(usize::MAX)) {
        print_card(record);
    }

    Ok(())
}

/// Handle the `show` command
pub async fn show(config: &AppConfig, raw_id: String) -> Result<()> {
    let routes = config.routes()?;

    let client = CatalogClient::new(&config.api_url)?;
    let store = fetch_store(&client).await?;

    let record = match resolve_query(&raw_id, &store)? {
        Resolution::Found(record) => record,
        Resolution::NotFound | Resolution::PendingFetch => {
            anyhow::bail!("Video {} not found. Run 'vidgrid list' to see available videos.", raw_id)
        }
    };
    let id = record.id;

    println!("{}", record.title.green().bold());
    println!("  Published: {}", format_date(&record.created_at));
    println!("  Play:      {}", record.drive_url);
    println!("  Thumbnail: {}", record.image_url);
    println!("  Link:      {}", routes.player(id).as_str().cyan());

    let related = related_to(id, store.records(), config.related_limit);
    if !related.is_empty() {
        println!();
        println!("{}", "Related videos:".bold());
        for record in related {
            print_card(record);
        }
    }

    Ok(())
}

/// Handle the `config` command
pub fn config(
    mut config: AppConfig,
    api_url: Option<String>,
    site_url: Option<String>,
    related_limit: Option<usize>,
    sort: Option<SortKey>,
    page: Option<PageMode>,
) -> Result<()> {
    let changed = api_url.is_some()
        || site_url.is_some()
        || related_limit.is_some()
        || sort.is_some()
        || page.is_some();

    if let Some(url) = api_url {
        config.api_url = url;
    }
    if let Some(url) = site_url {
        config.site_url = url;
    }
    if let Some(limit) = related_limit {
        config.related_limit = limit;
    }
    if let Some(sort) = sort {
        config.default_sort = sort;
    }
    if let Some(page) = page {
        config.page = page;
    }

    if changed {
        // validate before persisting
        CatalogClient::new(&config.api_url)?;
        config.routes()?;

        let path = config.save()?;
        println!("{} {}", "Saved configuration to".green(), path.display());
        println!();
    }

    println!("{}", "Configuration:".bold());
    println!("  API URL:       {}", config.api_url);
    println!("  Site URL:      {}", config.site_url);
    println!("  Related limit: {}", config.related_limit);
    println!("  Default sort:  {}", config.default_sort);
    println!("  Start page:    {:?}", config.page);

    Ok(())
}

/// Handle the `completion` command
pub fn completion(shell: clap_complete::Shell) {
    let mut cmd = super::Cli::command();
    generate(shell, &mut cmd, "vidgrid", &mut io::stdout());
}

// Extension trait for Cli to get clap Command
impl super::Cli {
    fn command() -> clap::Command {
        <Self as clap::CommandFactory>::command()
    }
}

/// Fetch the catalog behind a spinner
async fn fetch_store(client: &CatalogClient) -> Result<CatalogStore> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    spinner.set_message(format!("Fetching catalog from {}", client.endpoint()));
    spinner.enable_steady_tick(Duration::from_millis(100));

    let mut store = CatalogStore::new();
    let loaded = store.load(client).await.map(|records| records.len());
    spinner.finish_and_clear();

    let count = loaded.context("Failed to load videos")?;
    debug!("Fetched {} videos", count);
    Ok(store)
}

fn print_card(record: &VideoRecord) {
    println!(
        "  {:>5}  {}  {}",
        format!("#{}", record.id).cyan(),
        record.title,
        format_date(&record.created_at).dimmed()
    );
}
