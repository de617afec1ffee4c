//! One-shot GeoJSON build.
//!
//! Runs with no arguments using the built-in west London configuration.

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use propmap::{Config, RunOutcome};

const DEFAULT_CONFIG: &str = "propmap.toml";

#[derive(Parser, Debug)]
#[command(name = "build-geojson")]
#[command(about = "Join IMD 2019 scores with LSOA boundaries into a GeoJSON file")]
struct Args {
    /// TOML config file (defaults to ./propmap.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output file, overrides output.path
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// Codes per boundary query, overrides fetch.batch_size
    #[arg(long)]
    batch_size: Option<usize>,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Disable the batch progress bar
    #[arg(long)]
    no_progress: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging; RUST_LOG takes precedence over --verbose
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if args.verbose { "debug" } else { "info" }));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = load_config(&args)?;

    info!("propmap GeoJSON build");
    info!("Output: {}", config.output.path.display());

    match propmap::run(&config, !args.no_progress).await? {
        // Already reported by the pipeline
        RunOutcome::NoIndexData => {}
        RunOutcome::Written(summary) => {
            info!(
                "Wrote {} features to {} ({} KB)",
                summary.features,
                summary.path.display(),
                summary.size_kb()
            );
        }
    }

    Ok(())
}

fn load_config(args: &Args) -> Result<Config> {
    let mut config = if let Some(path) = &args.config {
        Config::load_from_file(path)?
    } else if Path::new(DEFAULT_CONFIG).exists() {
        info!("Using {}", DEFAULT_CONFIG);
        Config::load_from_file(DEFAULT_CONFIG)?
    } else {
        Config::default()
    };

    if let Some(out) = &args.out {
        config.output.path = out.clone();
    }
    if let Some(batch_size) = args.batch_size {
        config.fetch.batch_size = batch_size;
    }

    config.validate()?;
    Ok(config)
}
