//! Extractor contract
//!
//! An [`Extractor`] turns one opened recording into the subject's notable events plus
//! whole-file summary fields. The pipeline owns opening and closing the file; the
//! extractor only reads from it and never sees other files or shared state.

pub mod event_log;

use std::io::BufRead;

use crate::discovery::FileTask;
use crate::error::ExtractionError;

pub use event_log::EventLogExtractor;

/// Ordered `name → value` pairs describing the whole recording (map, final score, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SummaryFields(Vec<(String, String)>);

impl SummaryFields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a field; insertion order is rendering order.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.push((name.into(), value.into()));
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.push(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(name, value)| (name.as_str(), value.as_str()))
    }
}

/// One notable event for the subject, e.g. a defuse with enemies still alive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectEvent {
    pub round: u32,
    pub fields: Vec<(String, i64)>,
}

impl SubjectEvent {
    pub fn new(round: u32) -> Self {
        Self {
            round,
            fields: Vec::new(),
        }
    }

    pub fn field(mut self, name: impl Into<String>, value: i64) -> Self {
        self.fields.push((name.into(), value));
        self
    }
}

/// Everything an extractor produced for one recording.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    /// In the order the extractor encountered them.
    pub events: Vec<SubjectEvent>,
    pub summary: SummaryFields,
}

/// Per-file event extraction.
///
/// Implementations must be safe to call from many workers at once; each call gets
/// its own reader and must not depend on earlier calls.
pub trait Extractor: Send + Sync {
    fn extract(
        &self,
        task: &FileTask,
        recording: &mut dyn BufRead,
        subject: &str,
    ) -> Result<Extraction, ExtractionError>;
}

impl<F> Extractor for F
where
    F: Fn(&FileTask, &mut dyn BufRead, &str) -> Result<Extraction, ExtractionError> + Send + Sync,
{
    fn extract(
        &self,
        task: &FileTask,
        recording: &mut dyn BufRead,
        subject: &str,
    ) -> Result<Extraction, ExtractionError> {
        self(task, recording, subject)
    }
}
