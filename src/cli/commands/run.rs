use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Args;

use crate::cli::{ConsoleStatus, Output};
use crate::config::{self, ConfigOverrides, ScanConfig};
use crate::extract::EventLogExtractor;
use crate::pipeline::Pipeline;
use crate::report::{Aggregator, StatusStream};

#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Directory scanned recursively for recordings
    #[arg(long, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Recording file suffix (case-sensitive), e.g. .dem
    #[arg(long)]
    pub suffix: Option<String>,

    /// Only recordings modified on or after this date (YYYY-MM-DD).
    ///
    /// Both this filter and the report's Date column use the UTC day of the
    /// modification time (UTC, not local time), so a recording saved late in the
    /// evening west of Greenwich carries the next day's date.
    #[arg(long, value_parser = config::parse_date)]
    pub since: Option<NaiveDate>,

    /// Player whose events are reported
    #[arg(long)]
    pub subject: Option<String>,

    /// Maximum number of recordings processed at once
    #[arg(short = 'j', long = "concurrency", value_parser = clap::value_parser!(u64).range(1..))]
    pub concurrency: Option<u64>,

    /// Report file to create
    #[arg(short = 'o', long = "report", value_name = "FILE")]
    pub report: Option<PathBuf>,
}

impl RunArgs {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            root_directory: self.root.clone(),
            suffix: self.suffix.clone(),
            since: self.since,
            subject: self.subject.clone(),
            concurrency_limit: self.concurrency.map(|jobs| jobs as usize),
            report_path: self.report.clone(),
        }
    }
}

pub fn execute(args: RunArgs, output: &Output, config_path: Option<&Path>) -> Result<()> {
    let config =
        ScanConfig::load(config_path, args.overrides()).context("failed to load configuration")?;
    output.verbose(&format!(
        "root={} suffix={} limit={} report={}",
        config.root_directory.display(),
        config.suffix,
        config.concurrency_limit,
        config.report_path.display()
    ));

    let status: Arc<dyn StatusStream> = Arc::new(ConsoleStatus::new(*output));
    let report_path = config.report_path.clone();
    let since_label = config
        .since
        .map(|date| format!(" since {date}"))
        .unwrap_or_default();
    let pipeline = Pipeline::new(config, EventLogExtractor::new(), status.clone());

    let tasks = pipeline.discover()?;
    if tasks.is_empty() {
        output.info("No recording files found.");
        return Ok(());
    }

    output.info(&format!(
        "Found {} recording files{}. Starting processing...",
        tasks.len(),
        since_label
    ));

    let aggregator = Aggregator::create(&report_path, status)?;
    let summary = pipeline.process(tasks, &aggregator)?;

    output.success("Processing complete.");
    output.summary_stats("Files processed", format!("{}/{}", summary.completed, summary.total));
    output.summary_stats("Records written", summary.records_written);
    if summary.failed_files > 0 {
        output.warning(&format!(
            "{} recording(s) could not be processed (see log)",
            summary.failed_files
        ));
    }
    if summary.write_failures > 0 {
        output.warning(&format!(
            "{} report line(s) could not be written to {}",
            summary.write_failures,
            report_path.display()
        ));
    }
    output.summary_stats("Elapsed", format!("{:.2}s", summary.elapsed.as_secs_f64()));
    output.summary_stats("Report", report_path.display());

    Ok(())
}
