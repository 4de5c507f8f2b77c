use std::collections::VecDeque;

use crate::error::{PipelineError, Result};

/// Trait for audio input sources.
///
/// Allows swapping the real device capture for a scripted mock in tests.
pub trait AudioSource: Send {
    /// Start capturing audio from the source.
    fn start(&mut self) -> Result<()>;

    /// Stop capturing and release the source.
    fn stop(&mut self) -> Result<()>;

    /// Drain and return all samples captured since the previous read.
    ///
    /// Returns 16-bit PCM mono samples. An empty vector means no audio
    /// arrived in the interval.
    fn read_samples(&mut self) -> Result<Vec<i16>>;
}

/// Scripted audio source for tests.
///
/// Each call to `read_samples` pops the next scripted read; once the script
/// is exhausted every further read returns an empty buffer.
#[derive(Debug, Clone, Default)]
pub struct MockAudioSource {
    reads: VecDeque<std::result::Result<Vec<i16>, String>>,
    started: bool,
    fail_start: Option<String>,
}

impl MockAudioSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script a sequence of successful reads.
    pub fn with_intervals(mut self, intervals: Vec<Vec<i16>>) -> Self {
        self.reads.extend(intervals.into_iter().map(Ok));
        self
    }

    /// Script a failing read at the current end of the sequence.
    pub fn with_read_error(mut self, message: &str) -> Self {
        self.reads.push_back(Err(message.to_string()));
        self
    }

    /// Make `start` fail with the given message.
    pub fn with_start_failure(mut self, message: &str) -> Self {
        self.fail_start = Some(message.to_string());
        self
    }

    pub fn is_started(&self) -> bool {
        self.started
    }
}

impl AudioSource for MockAudioSource {
    fn start(&mut self) -> Result<()> {
        if let Some(message) = &self.fail_start {
            return Err(PipelineError::PermissionDenied {
                reason: message.clone(),
            });
        }
        self.started = true;
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        self.started = false;
        Ok(())
    }

    fn read_samples(&mut self) -> Result<Vec<i16>> {
        match self.reads.pop_front() {
            Some(Ok(samples)) => Ok(samples),
            Some(Err(message)) => Err(PipelineError::capture(message)),
            None => Ok(Vec::new()),
        }
    }
}
