//! sitefan - fan a project's source tree out into Python distributions

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use sitefan_cli::Cli;
use sitefan_cli::cmd;
use sitefan_cli::ui::Output;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let output = Arc::new(Output::new(cli.quiet));

    let summary = cmd::provision::run(&cli, output).await?;
    tracing::info!(?summary, "Run complete");
    Ok(())
}
