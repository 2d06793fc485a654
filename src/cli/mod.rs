//! Command-line interface.

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// MovieLens explorer: link enrichment and a browser dashboard
/// over pre-aggregated MovieLens tables.
#[derive(Parser)]
#[command(name = "movielens-explorer")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the dashboard web server
    #[command(alias = "daemon", alias = "web")]
    Serve,

    /// Derive IMDb and poster URLs from links.csv and write links_enriched.parquet
    Enrich {
        /// Link table to read (defaults to data.links_csv)
        #[arg(long)]
        input: Option<PathBuf>,
        /// Parquet file to write (defaults to <output_dir>/links_enriched.parquet)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Check that the movie service answers
    Health,

    /// Run the explorer filters from the terminal
    #[command(alias = "s")]
    Search(SearchArgs),

    /// List the data tables and their row counts
    #[command(alias = "ls")]
    Tables,

    /// Create a default config.toml
    #[command(alias = "init")]
    InitConfig,
}

#[derive(clap::Args, Debug, Default)]
pub struct SearchArgs {
    /// Genre to match; repeat for several
    #[arg(long = "genre", short = 'g')]
    pub genres: Vec<String>,
    /// First release year (inclusive)
    #[arg(long)]
    pub year_from: Option<i32>,
    /// Last release year (inclusive)
    #[arg(long)]
    pub year_to: Option<i32>,
    #[arg(long)]
    pub min_rating: Option<f64>,
    #[arg(long)]
    pub min_votes: Option<u64>,
    /// Case-insensitive title substring
    #[arg(long, short = 'k')]
    pub keyword: Option<String>,
    /// Tag every result must carry; repeat for several
    #[arg(long = "tag", short = 't')]
    pub tags: Vec<String>,
    /// Maximum rows to print
    #[arg(long, default_value = "20")]
    pub limit: usize,
}

pub use commands::*;
