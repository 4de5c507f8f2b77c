pub mod export;

pub use export::{HumanTranscript, SessionExport};
