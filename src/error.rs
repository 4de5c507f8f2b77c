use thiserror::Error;

pub type Result<T> = std::result::Result<T, PipelineError>;

/// Errors raised by the capture/transcribe/summarize pipeline.
///
/// None of these are fatal to a running session: the orchestrator logs and
/// continues, and the worst outcome is a gap in transcriptions or summaries.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The environment refused access to the audio input device.
    #[error("audio input access denied: {reason}")]
    PermissionDenied { reason: String },

    /// The requested audio input device does not exist.
    #[error("audio input device not found: {device}")]
    DeviceNotFound { device: String },

    /// A device error occurred during an active capture.
    #[error("audio capture failed: {message}")]
    Capture { message: String },

    /// A required service credential is missing. Checked eagerly, before any
    /// capture or network activity starts.
    #[error("{service} is not configured ({env_var} not set)")]
    Unconfigured { service: String, env_var: String },

    /// An audio segment exceeds the upload size bound.
    #[error("segment of {size} bytes exceeds the {limit} byte upload limit")]
    PayloadTooLarge { size: usize, limit: usize },

    /// There is nothing to summarize.
    #[error("nothing to summarize: input text is empty")]
    EmptyInput,

    /// A remote service could not be reached or answered with an error.
    #[error("{service} request failed: {message}")]
    ServiceUnavailable { service: String, message: String },

    /// A remote service answered with something we could not parse.
    #[error("unparseable response from {service}: {message}")]
    MalformedResponse { service: String, message: String },
}

impl PipelineError {
    pub fn unconfigured(service: &str, env_var: &str) -> Self {
        Self::Unconfigured {
            service: service.to_string(),
            env_var: env_var.to_string(),
        }
    }

    pub fn unavailable(service: &str, message: impl Into<String>) -> Self {
        Self::ServiceUnavailable {
            service: service.to_string(),
            message: message.into(),
        }
    }

    pub fn malformed(service: &str, message: impl Into<String>) -> Self {
        Self::MalformedResponse {
            service: service.to_string(),
            message: message.into(),
        }
    }

    pub fn capture(message: impl Into<String>) -> Self {
        Self::Capture {
            message: message.into(),
        }
    }
}
