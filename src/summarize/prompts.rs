/// System instruction constraining the summarizer's structured output.
pub const SYSTEM_PROMPT: &str = r#"You are a live meeting assistant. Analyze one segment of meeting dialogue and submit a structured digest with the submit_summary tool.

Rules:
- topics: the 1-3 core subjects the remark touches. Keep each to a few words.
- summary: a condensed restatement of the remark, 1-2 sentences, clear and neutral.
- actionItems: only obligations stated explicitly in the remark ({task, owner, due}). Leave the array empty when none are stated.
- type: classify the discourse function of the remark.
  - statement: a plain report or observation
  - question: asks something of the group
  - decision: records something the group settled on
  - action: commits someone to a task

Base the digest on the current remark; use the prior context only to resolve references."#;

/// Build the user prompt for one utterance.
pub fn build_summary_prompt(text: &str, context: &str, speaker: &str) -> String {
    if context.is_empty() {
        format!("[Remark - {}]\n{}", speaker, text)
    } else {
        format!(
            "[Prior context]\n{}\n\n[Current remark - {}]\n{}",
            context, speaker, text
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_without_context() {
        let prompt = build_summary_prompt("shall we start?", "", "Maya");
        assert_eq!(prompt, "[Remark - Maya]\nshall we start?");
        assert!(!prompt.contains("[Prior context]"));
    }

    #[test]
    fn test_prompt_with_context() {
        let prompt = build_summary_prompt(
            "I agree, Monday works",
            "Maya: when should we schedule QA?",
            "Jonas",
        );
        assert!(prompt.starts_with("[Prior context]\nMaya: when should we schedule QA?"));
        assert!(prompt.ends_with("[Current remark - Jonas]\nI agree, Monday works"));
    }
}
