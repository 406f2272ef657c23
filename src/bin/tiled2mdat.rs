//! tiled2mdat - convert a Tiled JSON map into an `.mdat` file
//!
//! # Usage
//!
//! ```bash
//! tiled2mdat assets/level1.json
//! tiled2mdat assets/level1.json -o build/level1.mdat -v
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Convert a Tiled JSON map into the .mdat binary container
#[derive(Parser, Debug)]
#[command(name = "tiled2mdat")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Tiled JSON map to convert
    input: PathBuf,

    /// Output path (defaults to the input path with an .mdat extension)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Log encoder details
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(if cli.verbose { "debug" } else { "info" })?;

    let output = cli
        .output
        .unwrap_or_else(|| cli.input.with_extension("mdat"));

    let doc = tiled_mdat::load_document(&cli.input)
        .with_context(|| format!("Loading map {}", cli.input.display()))?;
    tiled_mdat::write_map(&doc, &output)
        .with_context(|| format!("Writing {}", output.display()))?;

    Ok(())
}

fn init_logging(default_level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .map_err(|e| anyhow::anyhow!("invalid log level: {}", e))?;

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .init();

    Ok(())
}
