use std::time::Instant;

use async_trait::async_trait;
use reqwest::multipart;
use serde::Deserialize;
use tracing::debug;

use crate::error::{PipelineError, Result};

/// Upload size bound enforced before any network call.
pub const MAX_SEGMENT_BYTES: usize = 25 * 1024 * 1024;

const SERVICE: &str = "speech-to-text";
const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/audio/transcriptions";

/// Configuration for the speech-to-text client.
#[derive(Debug, Clone)]
pub struct SttConfig {
    /// API key (from OPENAI_API_KEY env var)
    pub api_key: String,
    /// Recognition model
    pub model: String,
    /// Transcription endpoint URL
    pub endpoint: String,
}

impl SttConfig {
    /// Create config from environment variables.
    ///
    /// Fails with `Unconfigured` when the credential is absent. Checked
    /// here, eagerly, so a missing key never surfaces deep inside a call.
    pub fn from_env() -> Result<Self> {
        Self::with_key(std::env::var("OPENAI_API_KEY").ok())
    }

    pub fn with_key(api_key: Option<String>) -> Result<Self> {
        let api_key = api_key
            .filter(|key| !key.is_empty())
            .ok_or_else(|| PipelineError::unconfigured(SERVICE, "OPENAI_API_KEY"))?;

        Ok(Self {
            api_key,
            model: "whisper-1".to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
        })
    }
}

/// Recognized text for one segment, with elapsed processing time.
#[derive(Debug, Clone, PartialEq)]
pub struct Transcription {
    /// Recognized text; empty when no speech was detected
    pub text: String,
    /// Wall-clock duration of the recognition call
    pub duration_ms: u64,
}

/// Seam for the transcription stage so the remote client can be replaced
/// by a test double.
#[async_trait]
pub trait Transcribe: Send + Sync {
    /// Convert one audio segment into recognized text.
    async fn transcribe(&self, segment: Vec<u8>, language: &str) -> Result<Transcription>;
}

/// Remote speech-to-text client.
///
/// Stateless across invocations; does not retry. Retry policy belongs to
/// the caller, and in this pipeline a failed segment's text is simply
/// never produced.
pub struct SttClient {
    client: reqwest::Client,
    config: SttConfig,
}

impl SttClient {
    pub fn new(config: SttConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }
}

#[async_trait]
impl Transcribe for SttClient {
    async fn transcribe(&self, segment: Vec<u8>, language: &str) -> Result<Transcription> {
        if segment.len() > MAX_SEGMENT_BYTES {
            return Err(PipelineError::PayloadTooLarge {
                size: segment.len(),
                limit: MAX_SEGMENT_BYTES,
            });
        }

        debug!(bytes = segment.len(), language, "uploading segment");
        let started = Instant::now();

        let part = multipart::Part::bytes(segment)
            .file_name("segment.wav")
            .mime_str("audio/wav")
            .map_err(|e| PipelineError::capture(format!("invalid segment part: {}", e)))?;

        let form = multipart::Form::new()
            .part("file", part)
            .text("model", self.config.model.clone())
            .text("language", language.to_string())
            .text("response_format", "json");

        let response = self
            .client
            .post(&self.config.endpoint)
            .bearer_auth(&self.config.api_key)
            .multipart(form)
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

        let body: WhisperResponse = response
            .json()
            .await
            .map_err(|e| PipelineError::malformed(SERVICE, e.to_string()))?;

        Ok(Transcription {
            text: body.text,
            duration_ms: started.elapsed().as_millis() as u64,
        })
    }
}

#[derive(Debug, Deserialize)]
struct WhisperResponse {
    text: String,
}
