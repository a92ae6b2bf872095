//! sampledocs CLI: turn annotated HTML samples into documentation pages.
//!
//! Each sample fans out into a JSON data source plus manual, preview and
//! source pages with front matter for the site generator.

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
