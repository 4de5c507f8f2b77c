pub mod audio;
pub mod demo;
pub mod error;
pub mod heuristics;
pub mod io;
pub mod models;
pub mod session;
pub mod stt;
pub mod summarize;
pub mod viz;

pub use audio::{
    AudioSegment, AudioSource, CpalAudioSource, MockAudioSource, Segmenter, SegmenterConfig,
};
pub use demo::{DemoFeed, FeedState, demo_script};
pub use error::{PipelineError, Result};
pub use heuristics::{
    ActionItemConfig, DiscourseClassifier, KeywordClassifier, extract_action_items,
};
pub use io::{HumanTranscript, SessionExport};
pub use models::{
    ActionItem, DiscourseKind, MeetingGraph, StructuredSummary, SummaryItem, Utterance,
    UtteranceLog,
};
pub use session::{
    MeetingSession, SessionConfig, SessionEvent, SummaryOutcome, dispatch_summary, run_demo,
    run_live,
};
pub use stt::{SttClient, SttConfig, Transcribe, Transcription};
pub use summarize::{RollingContext, Summarize, SummarizerClient, SummarizerConfig};
pub use viz::{project, project_topics};
