//! CLI module for vidgrid

use clap::{Parser, Subcommand};

use crate::catalog::SortKey;
use crate::view::PageMode;

pub mod commands;

#[derive(Parser, Debug)]
#[command(name = "vidgrid", about = "Browse a remote video catalog from the terminal")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Catalog API endpoint (overrides the config file)
    #[arg(long, global = true, env = "VIDGRID_API_URL")]
    pub api_url: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Interactive grid and player browser
    Browse {
        /// Page to open (catalog, player, or both on a single page)
        #[arg(long, value_enum)]
        page: Option<PageMode>,

        /// Video id to open, as it would appear in the address
        #[arg(long)]
        id: Option<String>,

        /// Initial grid ordering
        #[arg(long, value_enum)]
        sort: Option<SortKey>,
    },

    /// Print the catalog grid
    List {
        /// Grid ordering
        #[arg(long, value_enum)]
        sort: Option<SortKey>,

        /// Only show videos whose title contains this text
        #[arg(short, long)]
        search: Option<String>,

        /// Maximum number of videos to print
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Show one video and its related videos
    Show {
        /// Video id
        #[arg(value_name = "ID")]
        id: String,
    },

    /// Show or change stored defaults
    Config {
        /// Site root for page addresses
        #[arg(long)]
        site_url: Option<String>,

        /// Number of related videos shown next to the player
        #[arg(long)]
        related_limit: Option<usize>,

        /// Default grid ordering
        #[arg(long, value_enum)]
        sort: Option<SortKey>,

        /// Default page for `browse`
        #[arg(long, value_enum)]
        page: Option<PageMode>,
    },

    /// Generate shell completions
    Completion {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
}
