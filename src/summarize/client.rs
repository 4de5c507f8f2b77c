use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{PipelineError, Result};
use crate::models::StructuredSummary;

use super::context::RollingContext;
use super::prompts::{SYSTEM_PROMPT, build_summary_prompt};

const SERVICE: &str = "summarizer";
const DEFAULT_ENDPOINT: &str = "https://api.anthropic.com/v1/messages";
const TOOL_NAME: &str = "submit_summary";

/// Configuration for the summarization client.
#[derive(Debug, Clone)]
pub struct SummarizerConfig {
    /// API key (from ANTHROPIC_API_KEY env var)
    pub api_key: String,
    /// Model to use
    pub model: String,
    /// Temperature (0-1, lower = more deterministic)
    pub temperature: f64,
    /// Maximum tokens in response
    pub max_tokens: u32,
    /// Messages endpoint URL
    pub endpoint: String,
}

impl SummarizerConfig {
    /// Create config from environment variables.
    ///
    /// Fails with `Unconfigured` when the credential is absent. Checked
    /// eagerly, before any capture or call is attempted.
    pub fn from_env() -> Result<Self> {
        Self::with_key(std::env::var("ANTHROPIC_API_KEY").ok())
    }

    pub fn with_key(api_key: Option<String>) -> Result<Self> {
        let api_key = api_key
            .filter(|key| !key.is_empty())
            .ok_or_else(|| PipelineError::unconfigured(SERVICE, "ANTHROPIC_API_KEY"))?;

        Ok(Self {
            api_key,
            model: "claude-sonnet-4-20250514".to_string(),
            temperature: 0.2,
            max_tokens: 1024,
            endpoint: DEFAULT_ENDPOINT.to_string(),
        })
    }
}

/// Seam for the summarization stage so the remote client can be replaced
/// by a test double.
#[async_trait]
pub trait Summarize: Send + Sync {
    /// Produce a structured digest of one utterance.
    ///
    /// The rolling context is a snapshot taken by the caller at issue time;
    /// this call never mutates it.
    async fn summarize(
        &self,
        text: &str,
        context: &RollingContext,
        speaker: &str,
    ) -> Result<StructuredSummary>;
}

/// Remote summarization client.
///
/// One structured-output request per utterance, with the response
/// constrained to the digest schema via a forced tool. Transport failures
/// propagate; malformed model output degrades locally and never does.
pub struct SummarizerClient {
    client: reqwest::Client,
    config: SummarizerConfig,
}

impl SummarizerClient {
    pub fn new(config: SummarizerConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    fn summary_tool() -> Tool {
        Tool {
            name: TOOL_NAME.to_string(),
            description: "Submit the structured digest of the current remark".to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "topics": {
                        "type": "array",
                        "items": {"type": "string"},
                        "minItems": 1,
                        "maxItems": 3,
                        "description": "Core subjects of the remark"
                    },
                    "summary": {
                        "type": "string",
                        "description": "Condensed restatement, 1-2 sentences"
                    },
                    "actionItems": {
                        "type": "array",
                        "items": {
                            "type": "object",
                            "properties": {
                                "task": {"type": "string"},
                                "owner": {"type": "string"},
                                "due": {"type": "string"}
                            },
                            "required": ["task", "owner"]
                        }
                    },
                    "type": {
                        "type": "string",
                        "enum": ["statement", "question", "decision", "action"]
                    }
                },
                "required": ["topics", "summary", "actionItems", "type"]
            }),
        }
    }
}

#[async_trait]
impl Summarize for SummarizerClient {
    async fn summarize(
        &self,
        text: &str,
        context: &RollingContext,
        speaker: &str,
    ) -> Result<StructuredSummary> {
        if text.trim().is_empty() {
            return Err(PipelineError::EmptyInput);
        }

        let request = MessagesRequest {
            model: self.config.model.clone(),
            max_tokens: self.config.max_tokens,
            temperature: Some(self.config.temperature),
            system: Some(SYSTEM_PROMPT.to_string()),
            messages: vec![Message {
                role: "user".to_string(),
                content: build_summary_prompt(text.trim(), context.as_str(), speaker),
            }],
            tools: vec![Self::summary_tool()],
            tool_choice: Some(ToolChoice {
                choice_type: "tool".to_string(),
                name: TOOL_NAME.to_string(),
            }),
        };

        debug!(speaker, chars = text.len(), "requesting summary");

        let response = self
            .client
            .post(&self.config.endpoint)
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| PipelineError::unavailable(SERVICE, e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(PipelineError::unavailable(
                SERVICE,
                format!("{} - {}", status, body),
            ));
        }

        match response.json::<MessagesResponse>().await {
            Ok(body) => Ok(extract_structured(&body.content, text)),
            Err(e) => {
                // Lossy degradation rather than a hard failure: the caller
                // still gets a usable digest for the utterance.
                warn!("unparseable summarizer response, degrading: {}", e);
                Ok(StructuredSummary::degraded(text))
            }
        }
    }
}

/// Pull the structured digest out of the response content blocks.
///
/// Prefers the forced tool's input; falls back to parsing a text block as
/// JSON; degrades to an echo of the input when neither parses.
pub(crate) fn extract_structured(
    content: &[ContentBlock],
    original_text: &str,
) -> StructuredSummary {
    for block in content {
        if block.content_type == "tool_use" && block.name.as_deref() == Some(TOOL_NAME) {
            if let Some(input) = &block.input {
                match serde_json::from_value::<StructuredSummary>(input.clone()) {
                    Ok(summary) => return summary,
                    Err(e) => {
                        warn!("tool input did not match the digest schema: {}", e);
                    }
                }
            }
        }
    }

    for block in content {
        if block.content_type == "text" {
            if let Ok(summary) = serde_json::from_str::<StructuredSummary>(block.text.trim()) {
                return summary;
            }
        }
    }

    warn!("no parseable digest in response, degrading");
    StructuredSummary::degraded(original_text)
}

#[derive(Debug, Serialize)]
struct MessagesRequest {
    model: String,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<Message>,
    tools: Vec<Tool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<ToolChoice>,
}

#[derive(Debug, Serialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct Tool {
    name: String,
    description: String,
    input_schema: serde_json::Value,
}

#[derive(Debug, Serialize)]
struct ToolChoice {
    #[serde(rename = "type")]
    choice_type: String,
    name: String,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ContentBlock {
    #[serde(rename = "type")]
    pub content_type: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub input: Option<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DiscourseKind;

    fn tool_block(input: serde_json::Value) -> ContentBlock {
        ContentBlock {
            content_type: "tool_use".to_string(),
            text: String::new(),
            name: Some(TOOL_NAME.to_string()),
            input: Some(input),
        }
    }

    fn text_block(text: &str) -> ContentBlock {
        ContentBlock {
            content_type: "text".to_string(),
            text: text.to_string(),
            name: None,
            input: None,
        }
    }

    #[test]
    fn test_missing_credential_is_unconfigured() {
        match SummarizerConfig::with_key(None) {
            Err(PipelineError::Unconfigured { service, env_var }) => {
                assert_eq!(service, "summarizer");
                assert_eq!(env_var, "ANTHROPIC_API_KEY");
            }
            other => panic!("expected Unconfigured, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_empty_input_short_circuits_without_network() {
        let config = SummarizerConfig::with_key(Some("test-key".to_string())).unwrap();
        let client = SummarizerClient::new(config);

        let result = client
            .summarize("   \n\t ", &RollingContext::default(), "Maya")
            .await;
        assert!(matches!(result, Err(PipelineError::EmptyInput)));
    }

    #[test]
    fn test_extract_from_tool_block() {
        let blocks = vec![tool_block(serde_json::json!({
            "topics": ["QA schedule"],
            "summary": "QA starts Monday.",
            "actionItems": [],
            "type": "decision"
        }))];

        let summary = extract_structured(&blocks, "original remark");
        assert_eq!(summary.kind, DiscourseKind::Decision);
        assert_eq!(summary.summary, "QA starts Monday.");
        assert_eq!(summary.topics, vec!["QA schedule"]);
    }

    #[test]
    fn test_extract_falls_back_to_text_json() {
        let blocks = vec![text_block(
            r#"{"topics": ["release"], "summary": "Release is on track.", "actionItems": [], "type": "statement"}"#,
        )];

        let summary = extract_structured(&blocks, "original remark");
        assert_eq!(summary.summary, "Release is on track.");
    }

    #[test]
    fn test_malformed_output_degrades_to_statement_echo() {
        let blocks = vec![text_block("Sure! Here is the summary you asked for:")];

        let summary = extract_structured(&blocks, "we talked about the roadmap");
        assert_eq!(summary.kind, DiscourseKind::Statement);
        assert_eq!(summary.summary, "we talked about the roadmap");
        assert!(summary.topics.is_empty());
        assert!(summary.action_items.is_empty());
    }

    #[test]
    fn test_schema_mismatched_tool_input_degrades() {
        // Tool input present but missing the required summary field
        let blocks = vec![tool_block(serde_json::json!({"topics": "not-an-array"}))];

        let summary = extract_structured(&blocks, "the original");
        assert_eq!(summary.summary, "the original");
        assert_eq!(summary.kind, DiscourseKind::Statement);
    }

    #[test]
    fn test_empty_content_degrades() {
        let summary = extract_structured(&[], "the original");
        assert_eq!(summary.summary, "the original");
    }
}
