//! Report records and the shared report writer
//!
//! Every notable event becomes one [`ResultRecord`], rendered as one line:
//!
//! ```text
//! File: <basename>, Date: <YYYY-MM-DD>, <summary fields...>, Round: <n>, <subject fields...>
//! ```

pub mod aggregator;

use std::fmt;

use crate::discovery::FileTask;
use crate::extract::{SubjectEvent, SummaryFields};

pub use aggregator::{Aggregator, StatusStream};

/// One reportable event, annotated with the recording it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultRecord {
    pub source_file: String,
    pub date: String,
    pub summary: SummaryFields,
    pub round: u32,
    pub subject_fields: Vec<(String, i64)>,
}

impl ResultRecord {
    pub fn from_event(task: &FileTask, summary: &SummaryFields, event: SubjectEvent) -> Self {
        Self {
            source_file: task.file_name(),
            date: task.date_label(),
            summary: summary.clone(),
            round: event.round,
            subject_fields: event.fields,
        }
    }

    /// Build the records for one file, keeping the extractor's event order.
    pub fn for_file(
        task: &FileTask,
        summary: &SummaryFields,
        events: Vec<SubjectEvent>,
    ) -> Vec<Self> {
        events
            .into_iter()
            .map(|event| Self::from_event(task, summary, event))
            .collect()
    }

    /// The report line, without the trailing newline.
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ResultRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "File: {}, Date: {}", self.source_file, self.date)?;
        for (name, value) in self.summary.iter() {
            write!(f, ", {name}: {value}")?;
        }
        write!(f, ", Round: {}", self.round)?;
        for (name, value) in &self.subject_fields {
            write!(f, ", {name}: {value}")?;
        }
        Ok(())
    }
}
