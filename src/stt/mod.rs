pub mod client;

pub use client::{MAX_SEGMENT_BYTES, SttClient, SttConfig, Transcribe, Transcription};
