//! Configuration command implementations

use std::path::Path;

use anyhow::{Context, Result};
use clap::Subcommand;

use crate::cli::Output;
use crate::config::{ConfigOverrides, ScanConfig};

/// Configuration subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print the merged configuration as TOML
    Show,
    /// Check that the merged configuration can start a run
    Validate,
}

/// Execute config commands
pub fn execute(cmd: ConfigCommands, output: &Output, config_path: Option<&Path>) -> Result<()> {
    let config = ScanConfig::load(config_path, ConfigOverrides::default())
        .context("failed to load configuration")?;

    match cmd {
        ConfigCommands::Show => {
            let rendered = config
                .to_toml()
                .context("failed to render configuration")?;
            print!("{rendered}");
        }
        ConfigCommands::Validate => {
            output.success("Configuration is valid");
            output.summary_stats("Recordings", config.root_directory.display());
            output.summary_stats("Suffix", &config.suffix);
            output.summary_stats("Subject", &config.subject);
            output.summary_stats("Concurrency", config.concurrency_limit);
            output.summary_stats("Report", config.report_path.display());
        }
    }

    Ok(())
}
