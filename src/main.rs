//! kd100 - kuaidi100 APIを使った配送追跡CLI

mod cli;
mod client;
mod config;
mod error;
mod history;
mod logging;
mod record;
mod refresh;
mod report;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    logging::init(cli.quiet);
    cli::run(cli)
}
