//! LeadScout CLI — drive the three-stage lead-generation pipeline.
//!
//! Extracts leads from a conference sponsor page, enriches and scores them
//! via the remote agents, and optionally synthesizes outreach strategy.

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
