use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tracing::error;

use super::ResultRecord;
use crate::discovery::FileTask;
use crate::error::SetupError;

/// Live view of a run: mirrored report lines and progress updates.
pub trait StatusStream: Send + Sync {
    fn report_line(&self, line: &str);
    fn progress(&self, completed: usize, total: usize);
}

/// Serializes report output from all workers.
///
/// One call to [`Aggregator::record`] writes one file's lines as a block while
/// holding the sink lock, so blocks from different workers never interleave.
/// Blocks appear in completion order.
pub struct Aggregator<W: Write + Send> {
    sink: Mutex<W>,
    status: Arc<dyn StatusStream>,
    records_written: AtomicUsize,
    write_failures: AtomicUsize,
}

impl Aggregator<File> {
    /// Create (truncate) the report file.
    ///
    /// The file is written unbuffered, one `write_all` per line, so a line that
    /// fails to write is never persisted later behind the counters' back.
    pub fn create(path: &Path, status: Arc<dyn StatusStream>) -> Result<Self, SetupError> {
        let file = File::create(path).map_err(|source| SetupError::SinkCreate {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::new(file, status))
    }
}

impl<W: Write + Send> Aggregator<W> {
    pub fn new(sink: W, status: Arc<dyn StatusStream>) -> Self {
        Self {
            sink: Mutex::new(sink),
            status,
            records_written: AtomicUsize::new(0),
            write_failures: AtomicUsize::new(0),
        }
    }

    /// Write one line per record for `task`, mirror each line to the status stream,
    /// and return how many lines the sink accepted.
    ///
    /// A line counts as written once the sink accepts it. Write failures are logged
    /// and counted, never returned.
    pub fn record(&self, task: &FileTask, records: &[ResultRecord]) -> usize {
        if records.is_empty() {
            return 0;
        }

        let lines: Vec<String> = records.iter().map(ResultRecord::render).collect();
        let mut sink = self.sink.lock().unwrap_or_else(PoisonError::into_inner);

        let mut written = 0;
        for line in &lines {
            self.status.report_line(line);
            match sink.write_all(format!("{line}\n").as_bytes()) {
                Ok(()) => written += 1,
                Err(e) => {
                    self.write_failures.fetch_add(1, Ordering::Relaxed);
                    error!(file = %task.path.display(), error = %e, "failed to write report line");
                }
            }
        }

        // Accepted lines stay accepted; a buffered sink retries them on its next flush.
        if let Err(e) = sink.flush() {
            error!(file = %task.path.display(), error = %e, "failed to flush report sink");
        }

        self.records_written.fetch_add(written, Ordering::Relaxed);
        written
    }

    pub fn records_written(&self) -> usize {
        self.records_written.load(Ordering::Relaxed)
    }

    pub fn write_failures(&self) -> usize {
        self.write_failures.load(Ordering::Relaxed)
    }

    /// Give back the sink, e.g. to inspect what was written.
    pub fn into_sink(self) -> W {
        self.sink.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}
