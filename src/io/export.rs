use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::DateTime;
use serde::Serialize;

use crate::models::{ActionItem, MeetingGraph, SummaryItem, Utterance};
use crate::session::MeetingSession;

/// Machine-readable record of one meeting session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionExport {
    pub session_id: String,
    pub participants: Vec<String>,
    pub utterances: Vec<Utterance>,
    /// In completion order, as they were applied
    pub summaries: Vec<SummaryItem>,
    pub action_items: Vec<ActionItem>,
    pub graph: MeetingGraph,
}

impl SessionExport {
    pub fn from_session(session: &MeetingSession) -> Self {
        Self {
            session_id: session.id().to_string(),
            participants: session.participants(),
            utterances: session.utterances().to_vec(),
            summaries: session.summaries().to_vec(),
            action_items: session.action_items().to_vec(),
            graph: session.graph(),
        }
    }

    /// Write to a JSON file
    pub fn write_json(&self, path: &Path) -> Result<()> {
        let file = std::fs::File::create(path)
            .with_context(|| format!("Failed to create file: {:?}", path))?;
        serde_json::to_writer_pretty(file, self).context("Failed to write JSON")?;
        Ok(())
    }
}

/// Human-readable transcript rendering.
pub struct HumanTranscript<'a> {
    session: &'a MeetingSession,
}

impl<'a> HumanTranscript<'a> {
    pub fn new(session: &'a MeetingSession) -> Self {
        Self { session }
    }

    /// Format the session as readable text: the spoken transcript, then
    /// any extracted action items.
    pub fn format(&self) -> String {
        let mut output = String::new();

        for utterance in self.session.utterances() {
            output.push_str(&format!(
                "[{}] {}: {}\n",
                format_clock(utterance.timestamp_ms),
                utterance.speaker,
                utterance.text
            ));
        }

        let items = self.session.action_items();
        if !items.is_empty() {
            output.push_str("\nAction Items\n------------\n");
            for item in items {
                match &item.deadline {
                    Some(deadline) => output.push_str(&format!(
                        "- [{}] {} (due {})\n",
                        item.owner, item.task, deadline
                    )),
                    None => output.push_str(&format!("- [{}] {}\n", item.owner, item.task)),
                }
            }
        }

        output
    }

    /// Write to a text file
    pub fn write_file(&self, path: &Path) -> Result<()> {
        let mut file = std::fs::File::create(path)
            .with_context(|| format!("Failed to create file: {:?}", path))?;
        write!(file, "{}", self.format())?;
        Ok(())
    }
}

/// Format an epoch-milliseconds timestamp as a UTC wall clock, HH:MM:SS.
fn format_clock(timestamp_ms: i64) -> String {
    DateTime::from_timestamp_millis(timestamp_ms)
        .map(|dt| dt.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "--:--:--".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionConfig;

    fn sample_session() -> MeetingSession {
        let mut session = MeetingSession::new(SessionConfig::default());
        let _ = session.ingest_transcription("Shall we begin?", Some("Maya"));
        let _ = session.ingest_transcription("I will review the designs today.", Some("Priya"));
        session.derive_action_items(chrono::Utc::now());
        session
    }

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(0), "00:00:00");
        assert_eq!(format_clock(3_661_000), "01:01:01");
    }

    #[test]
    fn test_human_transcript_lists_speakers_and_items() {
        let session = sample_session();
        let text = HumanTranscript::new(&session).format();

        assert!(text.contains("Maya: Shall we begin?"));
        assert!(text.contains("Priya: I will review the designs today."));
        assert!(text.contains("Action Items"));
        assert!(text.contains("- [Priya]"));
    }

    #[test]
    fn test_export_round_trips_through_json() {
        let session = sample_session();
        let export = SessionExport::from_session(&session);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        export.write_json(&path).unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["utterances"].as_array().unwrap().len(), 2);
        assert_eq!(value["participants"][0], "Maya");
        assert_eq!(value["graph"]["nodes"].as_array().unwrap().len(), 2);
    }
}
