//! Error taxonomy for a batch run
//!
//! Only [`SetupError`] ever leaves [`crate::pipeline::Pipeline::run`]. Everything that
//! goes wrong while a single recording is being processed is a [`TaskError`], which is
//! logged and contained to that file.

use std::path::PathBuf;

use thiserror::Error;

/// Fatal problems detected before any recording is dispatched.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("cannot read recordings directory {path}: {source}")]
    RootUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot create report file {path}: {source}")]
    SinkCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Failure of an [`crate::extract::Extractor`] on an openable file.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("read error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed event on line {line}: {message}")]
    Malformed { line: usize, message: String },
}

/// Per-file failure. The file yields zero records and the batch keeps going.
#[derive(Debug, Error)]
pub enum TaskError {
    #[error("failed to open recording: {0}")]
    Open(#[source] std::io::Error),
    #[error("failed to extract events: {0}")]
    Extract(#[from] ExtractionError),
    #[error("extractor panicked: {0}")]
    Panicked(String),
}
