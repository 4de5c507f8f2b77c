pub mod action_items;

pub use action_items::*;

use crate::models::DiscourseKind;

/// Pure classification of an utterance's discourse function.
///
/// Isolated behind a trait so the keyword heuristic can be swapped for a
/// model-backed classifier without touching the projector or the session
/// plumbing.
pub trait DiscourseClassifier: Send + Sync {
    fn classify(&self, text: &str) -> DiscourseKind;
}

/// Keyword-based discourse classification.
///
/// A question mark wins over everything; completion keywords mark actions;
/// agreement keywords mark decisions; everything else is a statement.
#[derive(Debug, Clone)]
pub struct KeywordClassifier {
    /// Words signalling an action commitment
    pub completion_keywords: Vec<String>,
    /// Words signalling an agreement or decision
    pub agreement_keywords: Vec<String>,
}

impl Default for KeywordClassifier {
    fn default() -> Self {
        Self {
            completion_keywords: vec![
                "finish".to_string(),
                "finished".to_string(),
                "complete".to_string(),
                "completed".to_string(),
                "done".to_string(),
                "wrap up".to_string(),
            ],
            agreement_keywords: vec![
                "agree".to_string(),
                "agreed".to_string(),
                "decide".to_string(),
                "decided".to_string(),
                "decision".to_string(),
                "approved".to_string(),
            ],
        }
    }
}

impl DiscourseClassifier for KeywordClassifier {
    fn classify(&self, text: &str) -> DiscourseKind {
        if text.contains('?') {
            return DiscourseKind::Question;
        }

        let lower = text.to_lowercase();
        if self.completion_keywords.iter().any(|kw| lower.contains(kw)) {
            return DiscourseKind::Action;
        }
        if self.agreement_keywords.iter().any(|kw| lower.contains(kw)) {
            return DiscourseKind::Decision;
        }

        DiscourseKind::Statement
    }
}
