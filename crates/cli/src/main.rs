//! CLI entry point for the dispatch simulator.

use clap::Parser;
use dispatch_cli::CliConfig;

fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();
    config.init_tracing();
    config.run()
}
