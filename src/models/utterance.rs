use chrono::Utc;
use serde::{Deserialize, Serialize};

/// One recognized unit of speech with speaker/time metadata.
///
/// Immutable once created. Utterances are only ever appended to an
/// [`UtteranceLog`]; nothing mutates or removes them mid-session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Utterance {
    /// Unique within a session, assigned monotonically (`msg-0`, `msg-1`, ...)
    pub id: String,
    /// Free-text label for the source participant
    pub speaker: String,
    /// Recognized natural-language content
    pub text: String,
    /// Capture-time instant, milliseconds since epoch
    pub timestamp_ms: i64,
    /// Back-reference to a strictly earlier utterance id
    #[serde(skip_serializing_if = "Option::is_none")]
    pub related_to: Option<String>,
}

/// Append-only sequence of utterances for one meeting session.
///
/// Owns id assignment so ids are unique and never reused. A `related_to`
/// reference that does not name an earlier utterance is dropped on append.
#[derive(Debug, Clone, Default)]
pub struct UtteranceLog {
    utterances: Vec<Utterance>,
    next_seq: u64,
}

impl UtteranceLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a new utterance captured now.
    pub fn append(
        &mut self,
        speaker: &str,
        text: &str,
        related_to: Option<String>,
    ) -> &Utterance {
        self.append_at(speaker, text, related_to, Utc::now().timestamp_millis())
    }

    /// Append a new utterance with an explicit capture timestamp.
    pub fn append_at(
        &mut self,
        speaker: &str,
        text: &str,
        related_to: Option<String>,
        timestamp_ms: i64,
    ) -> &Utterance {
        let related_to = related_to.filter(|id| self.contains(id));

        let utterance = Utterance {
            id: format!("msg-{}", self.next_seq),
            speaker: speaker.to_string(),
            text: text.to_string(),
            timestamp_ms,
            related_to,
        };
        self.next_seq += 1;
        self.utterances.push(utterance);
        self.utterances.last().expect("just pushed")
    }

    pub fn contains(&self, id: &str) -> bool {
        self.utterances.iter().any(|u| u.id == id)
    }

    pub fn get(&self, id: &str) -> Option<&Utterance> {
        self.utterances.iter().find(|u| u.id == id)
    }

    pub fn len(&self) -> usize {
        self.utterances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.utterances.is_empty()
    }

    pub fn as_slice(&self) -> &[Utterance] {
        &self.utterances
    }

    pub fn iter(&self) -> impl Iterator<Item = &Utterance> {
        self.utterances.iter()
    }

    pub fn last(&self) -> Option<&Utterance> {
        self.utterances.last()
    }

    /// Unique speaker labels in first-seen order.
    pub fn speakers(&self) -> Vec<String> {
        let mut seen = Vec::new();
        for u in &self.utterances {
            if !seen.contains(&u.speaker) {
                seen.push(u.speaker.clone());
            }
        }
        seen
    }
}
