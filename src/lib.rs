//! # demoscan - batch event extraction from game recordings
//!
//! Walks a directory of recordings, keeps those modified since a given date,
//! processes them in parallel under a concurrency cap, and writes one report line
//! per notable event of a chosen player.
//!
//! ## Pieces
//!
//! - [`discovery`]: directory walk, suffix and date filter, time-ordered [`FileTask`]s
//! - [`parallel`]: counting admission, bounded worker pool, progress counter
//! - [`extract`]: the per-file [`Extractor`] contract and the bundled event-log extractor
//! - [`report`]: [`ResultRecord`] formatting and the lock-guarded report [`Aggregator`]
//! - [`pipeline`]: wires the above into one run
//!
//! ## Library use
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use demoscan::{ConfigOverrides, EventLogExtractor, Pipeline, ScanConfig};
//! use demoscan::cli::{ConsoleStatus, Output};
//!
//! # fn example() -> anyhow::Result<()> {
//! let config = ScanConfig::load(None, ConfigOverrides {
//!     subject: Some("76561199121731119".to_string()),
//!     ..ConfigOverrides::default()
//! })?;
//! let status = Arc::new(ConsoleStatus::new(Output::new(false, false)));
//! let summary = Pipeline::new(config, EventLogExtractor::new(), status).run()?;
//! assert_eq!(summary.completed, summary.total);
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod discovery;
pub mod error;
pub mod extract;
pub mod parallel;
pub mod pipeline;
pub mod report;

pub use cli::Cli;
pub use config::{ConfigOverrides, ScanConfig};
pub use discovery::FileTask;
pub use error::{ExtractionError, SetupError, TaskError};
pub use extract::{EventLogExtractor, Extraction, Extractor, SubjectEvent, SummaryFields};
pub use pipeline::{Pipeline, RunSummary};
pub use report::{Aggregator, ResultRecord, StatusStream};
