//! Command-line interface for demoscan
//!
//! A thin driver: it builds a [`crate::config::ScanConfig`] from flags and config
//! layers, installs logging, and hands off to [`crate::pipeline::Pipeline`].

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

pub mod commands;
mod output;

pub use output::{ConsoleStatus, Output};

/// demoscan - extract notable round events from a folder of game recordings
#[derive(Parser, Debug)]
#[command(
    name = "demoscan",
    author,
    version,
    about = "Extract notable round events from a folder of game recordings",
    long_about = "demoscan walks a recordings directory, processes every recording modified \
                  since a given date in parallel, and writes one report line per notable \
                  event of the chosen player."
)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity (can be repeated)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output (report lines are still printed)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Use custom configuration file (TOML, JSON or YAML)
    #[arg(long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Process recordings and write the report
    Run(commands::run::RunArgs),
    /// Configuration management
    #[command(subcommand)]
    Config(commands::config::ConfigCommands),
}

impl Cli {
    pub fn run(self) -> Result<()> {
        setup_logging(self.verbose, self.quiet);
        let output = Output::new(self.verbose > 0, self.quiet);

        match self.command {
            Some(Commands::Run(args)) => {
                commands::run::execute(args, &output, self.config.as_deref())
            }
            Some(Commands::Config(cmd)) => {
                commands::config::execute(cmd, &output, self.config.as_deref())
            }
            None => {
                println!("Run 'demoscan --help' for usage information");
                Ok(())
            }
        }
    }
}

fn setup_logging(verbose: u8, quiet: bool) {
    if quiet {
        return;
    }

    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        match verbose {
            0 => tracing_subscriber::EnvFilter::new("warn"),
            1 => tracing_subscriber::EnvFilter::new("info,ignore=warn"),
            2 => tracing_subscriber::EnvFilter::new("debug,ignore=warn"),
            _ => tracing_subscriber::EnvFilter::new("trace"),
        }
    });

    // Logs go to stderr so stdout carries only the report mirror and progress.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
