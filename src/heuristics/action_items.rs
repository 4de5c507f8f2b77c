use chrono::{DateTime, Duration, Utc};

use crate::models::{ActionItem, Utterance};

/// Configuration for keyword-based action item extraction.
#[derive(Debug, Clone)]
pub struct ActionItemConfig {
    /// Words that mark an utterance as carrying an obligation
    pub task_keywords: Vec<String>,
    /// Days between the staggered deadlines assigned to extracted items
    pub deadline_stagger_days: i64,
}

impl Default for ActionItemConfig {
    fn default() -> Self {
        Self {
            task_keywords: vec![
                "finish".to_string(),
                "write".to_string(),
                "review".to_string(),
                "coordinate".to_string(),
                "prepare".to_string(),
                "draft".to_string(),
            ],
            deadline_stagger_days: 2,
        }
    }
}

/// Extract obligations from an utterance sequence by keyword match.
///
/// This is the local stand-in for model-based extraction: same output
/// shape, heuristic logic. The owner is the utterance's speaker, falling
/// back to the first participant, then "Unassigned". Deadlines are
/// staggered from `now` so earlier items come due sooner.
pub fn extract_action_items(
    utterances: &[Utterance],
    participants: &[String],
    now: DateTime<Utc>,
    config: &ActionItemConfig,
) -> Vec<ActionItem> {
    utterances
        .iter()
        .filter(|u| {
            let lower = u.text.to_lowercase();
            config.task_keywords.iter().any(|kw| lower.contains(kw))
        })
        .enumerate()
        .map(|(index, u)| {
            let owner = if !u.speaker.is_empty() {
                u.speaker.clone()
            } else {
                participants
                    .first()
                    .cloned()
                    .unwrap_or_else(|| "Unassigned".to_string())
            };

            let due =
                now + Duration::days(config.deadline_stagger_days * (index as i64 + 1));

            ActionItem {
                task: u.text.clone(),
                owner,
                deadline: Some(due.to_rfc3339()),
                completed: false,
            }
        })
        .collect()
}
