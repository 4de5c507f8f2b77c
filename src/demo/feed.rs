use chrono::Utc;

use crate::models::Utterance;

use super::script::{ScriptLine, demo_script};

/// States of the scripted demo feed.
///
/// ```text
/// idle ──start──▶ active ──pause──▶ paused ──start──▶ active
/// any state ──stop──▶ complete (terminal)
/// any state ──reset──▶ idle (history cleared)
/// active ──script exhausted──▶ complete
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedState {
    Idle,
    Active,
    Paused,
    Complete,
}

/// Deterministic scripted substitute for the live capture pipeline.
///
/// While active, each `tick` emits the next scripted utterance; the
/// emission timer lives with the driver, not here, so the state machine
/// stays synchronous and testable.
#[derive(Debug, Clone)]
pub struct DemoFeed {
    script: &'static [ScriptLine],
    position: usize,
    state: FeedState,
}

impl Default for DemoFeed {
    fn default() -> Self {
        Self::new()
    }
}

impl DemoFeed {
    pub fn new() -> Self {
        Self::with_script(demo_script())
    }

    pub fn with_script(script: &'static [ScriptLine]) -> Self {
        Self {
            script,
            position: 0,
            state: FeedState::Idle,
        }
    }

    pub fn state(&self) -> FeedState {
        self.state
    }

    /// Number of utterances emitted so far.
    pub fn emitted(&self) -> usize {
        self.position
    }

    /// Begin or resume emission. Only valid from idle or paused;
    /// a completed feed stays complete until reset.
    pub fn start(&mut self) {
        if matches!(self.state, FeedState::Idle | FeedState::Paused) {
            self.state = FeedState::Active;
        }
    }

    /// Suspend emission, retaining the current position.
    pub fn pause(&mut self) {
        if self.state == FeedState::Active {
            self.state = FeedState::Paused;
        }
    }

    /// End the feed. Terminal: no further emissions regardless of
    /// remaining scripted lines.
    pub fn stop(&mut self) {
        self.state = FeedState::Complete;
    }

    /// Return to idle, clearing emitted history and position.
    pub fn reset(&mut self) {
        self.position = 0;
        self.state = FeedState::Idle;
    }

    /// Emission progress as a percentage, clamped to [0, 100].
    pub fn progress(&self) -> f64 {
        if self.script.is_empty() {
            return 0.0;
        }
        let pct = self.position as f64 / self.script.len() as f64 * 100.0;
        pct.clamp(0.0, 100.0)
    }

    /// Emit the next scripted utterance, if active.
    ///
    /// Reaching the end of the script auto-transitions to complete.
    pub fn tick(&mut self) -> Option<Utterance> {
        if self.state != FeedState::Active {
            return None;
        }
        if self.position >= self.script.len() {
            self.state = FeedState::Complete;
            return None;
        }

        let line = &self.script[self.position];
        let utterance = Utterance {
            id: format!("msg-{}", self.position),
            speaker: line.speaker.to_string(),
            text: line.text.to_string(),
            timestamp_ms: Utc::now().timestamp_millis(),
            related_to: line.related_to.map(|index| format!("msg-{}", index)),
        };

        self.position += 1;
        if self.position >= self.script.len() {
            self.state = FeedState::Complete;
        }

        Some(utterance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TINY_SCRIPT: &[ScriptLine] = &[
        ScriptLine {
            speaker: "Maya",
            text: "first line",
            related_to: None,
        },
        ScriptLine {
            speaker: "Jonas",
            text: "second line",
            related_to: Some(0),
        },
    ];

    #[test]
    fn test_pause_from_idle_is_a_no_op() {
        let mut feed = DemoFeed::with_script(TINY_SCRIPT);
        feed.pause();
        assert_eq!(feed.state(), FeedState::Idle);
    }

    #[test]
    fn test_stop_from_active_goes_straight_to_complete() {
        let mut feed = DemoFeed::with_script(TINY_SCRIPT);
        feed.start();
        feed.tick();
        // One scripted line remains; stop is terminal anyway
        feed.stop();
        assert_eq!(feed.state(), FeedState::Complete);
        assert!(feed.tick().is_none());
    }

    #[test]
    fn test_reset_from_complete_returns_to_idle() {
        let mut feed = DemoFeed::with_script(TINY_SCRIPT);
        feed.start();
        while feed.tick().is_some() {}
        assert_eq!(feed.state(), FeedState::Complete);

        feed.reset();
        assert_eq!(feed.state(), FeedState::Idle);
        assert_eq!(feed.emitted(), 0);
        assert_eq!(feed.progress(), 0.0);
    }

    #[test]
    fn test_start_from_complete_is_a_no_op() {
        let mut feed = DemoFeed::with_script(TINY_SCRIPT);
        feed.stop();
        feed.start();
        assert_eq!(feed.state(), FeedState::Complete);
    }

    #[test]
    fn test_pause_retains_position() {
        let mut feed = DemoFeed::with_script(TINY_SCRIPT);
        feed.start();
        let first = feed.tick().unwrap();
        assert_eq!(first.id, "msg-0");

        feed.pause();
        assert!(feed.tick().is_none());
        assert_eq!(feed.emitted(), 1);

        feed.start();
        let second = feed.tick().unwrap();
        assert_eq!(second.id, "msg-1");
        assert_eq!(second.related_to.as_deref(), Some("msg-0"));
    }

    #[test]
    fn test_exhausting_script_auto_completes() {
        let mut feed = DemoFeed::with_script(TINY_SCRIPT);
        feed.start();
        assert!(feed.tick().is_some());
        assert_eq!(feed.state(), FeedState::Active);
        assert!(feed.tick().is_some());
        assert_eq!(feed.state(), FeedState::Complete);
        assert_eq!(feed.progress(), 100.0);
    }

    #[test]
    fn test_progress_tracks_emission() {
        let mut feed = DemoFeed::with_script(TINY_SCRIPT);
        assert_eq!(feed.progress(), 0.0);
        feed.start();
        feed.tick();
        assert_eq!(feed.progress(), 50.0);
        feed.tick();
        assert_eq!(feed.progress(), 100.0);
    }
}
