//! Batch pipeline: discovery → bounded worker pool → extractor → report + progress
//!
//! ```text
//! discover() ──▶ Vec<FileTask> ──▶ WorkerPool (≤ concurrency_limit units)
//!                                     │ per file: open → extract → records
//!                                     ├──▶ Aggregator::record   (sink lock)
//!                                     └──▶ ProgressTracker::increment
//! ```
//!
//! Only [`SetupError`] escapes a run. Per-file problems are logged, counted in
//! [`RunSummary::failed_files`], and the file contributes no records.

use std::any::Any;
use std::fs::File;
use std::io::{BufReader, Write};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use tracing::{debug, error, info, warn};

use crate::config::ScanConfig;
use crate::discovery::{self, FileTask};
use crate::error::{SetupError, TaskError};
use crate::extract::Extractor;
use crate::parallel::{ProgressTracker, WorkerPool};
use crate::report::{Aggregator, ResultRecord, StatusStream};

/// What a finished run did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Recordings selected by discovery.
    pub total: usize,
    /// Recordings whose unit finished, successfully or not. Equals `total` at return.
    pub completed: usize,
    pub records_written: usize,
    pub write_failures: usize,
    /// Recordings that could not be opened or extracted.
    pub failed_files: usize,
    pub peak_concurrency: usize,
    pub elapsed: Duration,
}

/// One configured batch run.
pub struct Pipeline<E: Extractor> {
    config: ScanConfig,
    extractor: E,
    status: Arc<dyn StatusStream>,
}

impl<E: Extractor> Pipeline<E> {
    pub fn new(config: ScanConfig, extractor: E, status: Arc<dyn StatusStream>) -> Self {
        Self {
            config,
            extractor,
            status,
        }
    }

    /// Discover, create the report file and process everything.
    ///
    /// The configuration is validated before anything is touched. With no matching
    /// recordings the report file is not created.
    pub fn run(&self) -> Result<RunSummary, SetupError> {
        self.config.validate()?;
        let tasks = self.discover()?;
        if tasks.is_empty() {
            info!(root = %self.config.root_directory.display(), "no recordings matched");
            return Ok(RunSummary::default());
        }

        let aggregator = Aggregator::create(&self.config.report_path, self.status.clone())?;
        self.process(tasks, &aggregator)
    }

    /// Snapshot of the recordings this run will process, oldest first.
    pub fn discover(&self) -> Result<Vec<FileTask>, SetupError> {
        discovery::discover(
            &self.config.root_directory,
            &self.config.suffix,
            self.config.since_timestamp(),
        )
    }

    /// Process `tasks` with at most `concurrency_limit` in flight and wait for all of them.
    pub fn process<W: Write + Send>(
        &self,
        tasks: Vec<FileTask>,
        aggregator: &Aggregator<W>,
    ) -> Result<RunSummary, SetupError> {
        let started = Instant::now();
        let pool = WorkerPool::new(self.config.concurrency()?);
        let progress = ProgressTracker::new(tasks.len());
        let failed_files = AtomicUsize::new(0);

        info!(
            files = tasks.len(),
            limit = pool.limit(),
            subject = %self.config.subject,
            "starting batch"
        );

        let report = pool.run(tasks, |task: FileTask| {
            match self.extract_records(&task) {
                Ok(records) => {
                    let recorded =
                        panic::catch_unwind(AssertUnwindSafe(|| aggregator.record(&task, &records)));
                    match recorded {
                        Ok(written) => {
                            debug!(file = %task.path.display(), records = records.len(), written, "recording done");
                        }
                        Err(payload) => {
                            failed_files.fetch_add(1, Ordering::Relaxed);
                            error!(
                                file = %task.path.display(),
                                panic = %panic_message(payload.as_ref()),
                                "reporting panicked"
                            );
                        }
                    }
                }
                Err(e) => {
                    failed_files.fetch_add(1, Ordering::Relaxed);
                    warn!(file = %task.path.display(), error = %e, "recording skipped");
                }
            }

            // Counted on every path above; messages go out in counter order.
            progress.advance(|completed, total| self.status.progress(completed, total));
        });

        let summary = RunSummary {
            total: progress.total(),
            completed: progress.completed(),
            records_written: aggregator.records_written(),
            write_failures: aggregator.write_failures(),
            failed_files: failed_files.load(Ordering::Relaxed),
            peak_concurrency: pool.peak_concurrency(),
            elapsed: started.elapsed(),
        };

        if report.panicked > 0 || summary.completed != summary.total {
            warn!(
                panicked = report.panicked,
                completed = summary.completed,
                total = summary.total,
                "some units did not finish cleanly"
            );
        }
        info!(
            records = summary.records_written,
            failed = summary.failed_files,
            elapsed_ms = summary.elapsed.as_millis() as u64,
            "batch finished"
        );

        Ok(summary)
    }

    /// Open one recording, run the extractor on it and build its report records.
    ///
    /// The file handle is dropped before this returns, on success and on every error.
    fn extract_records(&self, task: &FileTask) -> Result<Vec<ResultRecord>, TaskError> {
        let file = File::open(&task.path).map_err(TaskError::Open)?;
        let mut reader = BufReader::new(file);

        let extraction = panic::catch_unwind(AssertUnwindSafe(|| {
            self.extractor
                .extract(task, &mut reader, &self.config.subject)
        }))
        .map_err(|payload| TaskError::Panicked(panic_message(payload.as_ref())))??;

        Ok(ResultRecord::for_file(
            task,
            &extraction.summary,
            extraction.events,
        ))
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
