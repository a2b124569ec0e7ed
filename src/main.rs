//! CLI entry point for the layered trait generator

use clap::Parser;
use layerforge::io::cli::{Cli, Runner};
use tracing_subscriber::EnvFilter;

fn main() -> layerforge::Result<()> {
    let cli = Cli::parse();
    let default_filter = if cli.quiet { "warn" } else { "info" };
    let runner = Runner::new(cli);

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(runner.log_writer())
        .init();

    runner.process().map(|_report| ())
}
