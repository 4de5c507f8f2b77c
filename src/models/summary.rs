use serde::{Deserialize, Serialize};

/// Discourse function of an utterance or its summary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscourseKind {
    #[default]
    Statement,
    Question,
    Decision,
    Action,
}

/// A structured digest of one utterance.
///
/// Created asynchronously after its source utterance; summaries are ordered
/// by completion, which may differ from source order when calls race.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryItem {
    pub id: String,
    pub speaker: String,
    /// Condensed restatement of the source utterance
    pub text: String,
    /// Mirrors the source utterance's capture timestamp
    pub timestamp_ms: i64,
    #[serde(rename = "type")]
    pub kind: DiscourseKind,
}

/// An extracted obligation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionItem {
    pub task: String,
    pub owner: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline: Option<String>,
    pub completed: bool,
}

/// Action item as it appears in the summarizer's structured output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionItemDraft {
    pub task: String,
    pub owner: String,
    #[serde(default)]
    pub due: Option<String>,
}

impl ActionItemDraft {
    pub fn into_action_item(self) -> ActionItem {
        ActionItem {
            task: self.task,
            owner: self.owner,
            deadline: self.due,
            completed: false,
        }
    }
}

/// The summarizer's structured response for one utterance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuredSummary {
    #[serde(default)]
    pub topics: Vec<String>,
    pub summary: String,
    #[serde(default, rename = "actionItems")]
    pub action_items: Vec<ActionItemDraft>,
    #[serde(default, rename = "type")]
    pub kind: DiscourseKind,
}

impl StructuredSummary {
    /// Degraded summary used when the model's output cannot be parsed:
    /// the original input text stands in for the digest and classification
    /// falls back to `statement`.
    pub fn degraded(original_text: &str) -> Self {
        Self {
            topics: Vec::new(),
            summary: original_text.to_string(),
            action_items: Vec::new(),
            kind: DiscourseKind::Statement,
        }
    }
}
