//! Geoflow CLI — staged ingestion of GEO series supplementary archives.
//!
//! Fetches a series archive, unpacks its compression layers, splits the
//! sectioned text files into per-section CSV tables, and trims probe
//! tables down to their retained columns.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
