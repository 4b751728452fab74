//! `storefront` command line entry point

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use pns_data::{CategoryFilter, LocationFilter, SortKey, StorefrontConfig};

mod admin;
mod browse;
mod sample_data;

#[derive(Parser)]
#[command(name = "storefront")]
#[command(about = "PushNshop storefront: browse listings and run the admin queue")]
struct Cli {
    /// JSON config file; defaults apply when omitted
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Query listings the way the listing page does
    Browse(BrowseArgs),

    /// Run a batch of generated submissions through the approval queue
    Admin {
        /// Number of submissions to generate
        #[arg(long, default_value_t = 6)]
        submissions: usize,
    },

    /// Write a generated catalogue to a CSV file
    GenerateSample {
        #[arg(long, default_value_t = 120)]
        count: usize,

        #[arg(long, default_value = "data/listings.csv")]
        output: PathBuf,

        /// Seed for reproducible output
        #[arg(long)]
        seed: Option<u64>,
    },
}

#[derive(Args)]
struct BrowseArgs {
    /// CSV file of listings; a generated catalogue is used when omitted
    #[arg(long)]
    listings: Option<PathBuf>,

    /// Category id or "all"
    #[arg(long, default_value = "all")]
    category: CategoryFilter,

    /// Location name or "All Locations"
    #[arg(long, default_value = "All Locations")]
    location: LocationFilter,

    /// Price range encoding, e.g. "0-50000" or "500000+"
    #[arg(long, default_value = "all")]
    price: String,

    /// Free-text search over titles and descriptions
    #[arg(long)]
    search: Option<String>,

    #[arg(long, default_value = "newest")]
    sort: SortKey,

    /// Zero-based grid page
    #[arg(long, default_value_t = 0)]
    page: usize,

    /// Viewport width in pixels, drives carousel items per page
    #[arg(long, default_value_t = 1280)]
    viewport: u32,

    /// Let the carousel rotate for this long, e.g. "12s"
    #[arg(long, value_parser = humantime::parse_duration)]
    rotate_for: Option<Duration>,

    /// Share the listing with this id to every platform
    #[arg(long)]
    share: Option<String>,
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(fmt::layer())
        .init();
}

fn load_config(path: Option<&PathBuf>) -> Result<StorefrontConfig> {
    match path {
        Some(path) => StorefrontConfig::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => Ok(StorefrontConfig::default()),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref())?;

    match cli.command {
        Commands::Browse(args) => browse::run(&config, args).await,
        Commands::Admin { submissions } => admin::run(submissions),
        Commands::GenerateSample {
            count,
            output,
            seed,
        } => sample_data::write_sample(&output, count, seed),
    }
}
