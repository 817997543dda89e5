mod cli;
mod commands;
mod config;
mod logging;

use anyhow::{Context, Result};
use clap::Parser;

use crate::cli::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::initialize(cli.log, cli.verbose);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    runtime.block_on(commands::execute(cli))
}
