//! PitchCraft CLI: turn a startup idea into a complete pitch deck.
//!
//! Research, slide generation and review each degrade to templated content
//! when their provider is slow or unavailable, so a run always ends with a
//! full deck.

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
