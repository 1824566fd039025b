use anyhow::Result;
use clap::Parser;

use demoscan::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();
    cli.run()
}
