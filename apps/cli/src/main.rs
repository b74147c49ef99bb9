//! subjects-fast CLI: FAST subject vocabulary refresh tool.
//!
//! Downloads the FAST MARCXML archives and converts them into the YAML
//! subject vocabularies consumed by the subject-authority registry.

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
