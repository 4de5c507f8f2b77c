pub mod client;
pub mod context;
pub mod prompts;

pub use client::{Summarize, SummarizerClient, SummarizerConfig};
pub use context::{DEFAULT_CONTEXT_CHARS, RollingContext};
pub use prompts::{SYSTEM_PROMPT, build_summary_prompt};
