/// Default character bound for the rolling context window.
pub const DEFAULT_CONTEXT_CHARS: usize = 500;

/// Bounded trailing window of prior dialogue used to condition
/// summarization.
///
/// This is an explicit value the caller owns and threads through each
/// call: snapshot it when a call is issued, store the advanced value only
/// when the call succeeds. There is no hidden module-level state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RollingContext {
    text: String,
    limit: usize,
}

impl Default for RollingContext {
    fn default() -> Self {
        Self::new(DEFAULT_CONTEXT_CHARS)
    }
}

impl RollingContext {
    pub fn new(limit: usize) -> Self {
        Self {
            text: String::new(),
            limit,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    /// Return the context advanced by one `"{speaker}: {text}"` line.
    ///
    /// Truncation keeps the suffix: the oldest content is discarded first
    /// so the window always ends with the most recently appended dialogue.
    #[must_use]
    pub fn appended(&self, speaker: &str, text: &str) -> Self {
        let combined = if self.text.is_empty() {
            format!("{}: {}", speaker, text)
        } else {
            format!("{}\n{}: {}", self.text, speaker, text)
        };

        let char_count = combined.chars().count();
        let text = if char_count > self.limit {
            combined
                .chars()
                .skip(char_count - self.limit)
                .collect::<String>()
        } else {
            combined
        };

        Self {
            text,
            limit: self.limit,
        }
    }
}
