use std::io::BufRead;

use serde::Deserialize;
use tracing::trace;

use super::{Extraction, Extractor, SubjectEvent, SummaryFields};
use crate::discovery::FileTask;
use crate::error::ExtractionError;

/// Recording events understood by [`EventLogExtractor`].
///
/// One JSON object per line, tagged by `"event"`. Kinds not listed here are ignored.
#[derive(Debug, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
enum RecordingEvent {
    Header {
        map: String,
    },
    RoundEnd,
    BombDefused {
        #[serde(deserialize_with = "id_from_string_or_number")]
        player: String,
        terrorists_alive: u32,
    },
    MatchEnd {
        ct_score: u32,
        t_score: u32,
    },
    #[serde(other)]
    Other,
}

fn id_from_string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Number(u64),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Text(text) => text,
        Id::Number(number) => number.to_string(),
    })
}

/// Finds defuses by the subject player that happened while terrorists were still alive.
///
/// Works on recordings that have already been decoded into newline-delimited JSON
/// events. Report fields: `Map`, `Final Score` (summary) and `Enemies Alive` (per event).
#[derive(Debug, Default, Clone, Copy)]
pub struct EventLogExtractor;

impl EventLogExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Extractor for EventLogExtractor {
    fn extract(
        &self,
        task: &FileTask,
        recording: &mut dyn BufRead,
        subject: &str,
    ) -> Result<Extraction, ExtractionError> {
        let mut map_name: Option<String> = None;
        let mut rounds_played: u32 = 0;
        let mut final_score = (0u32, 0u32);
        let mut events = Vec::new();

        for (index, line) in recording.lines().enumerate() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let event: RecordingEvent =
                serde_json::from_str(line).map_err(|e| ExtractionError::Malformed {
                    line: index + 1,
                    message: e.to_string(),
                })?;

            match event {
                RecordingEvent::Header { map } => map_name = Some(map),
                RecordingEvent::RoundEnd => rounds_played += 1,
                RecordingEvent::BombDefused {
                    player,
                    terrorists_alive,
                } => {
                    if player == subject && terrorists_alive > 0 {
                        trace!(file = %task.path.display(), round = rounds_played, terrorists_alive, "notable defuse");
                        events.push(
                            SubjectEvent::new(rounds_played)
                                .field("Enemies Alive", i64::from(terrorists_alive)),
                        );
                    }
                }
                RecordingEvent::MatchEnd { ct_score, t_score } => {
                    final_score = (ct_score, t_score);
                }
                RecordingEvent::Other => {}
            }
        }

        let summary = SummaryFields::new()
            .with("Map", map_name.unwrap_or_else(|| "unknown".to_string()))
            .with(
                "Final Score",
                format!("CT {} - T {}", final_score.0, final_score.1),
            );

        Ok(Extraction { events, summary })
    }
}
