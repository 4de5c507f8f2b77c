use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{mpsc, watch};
use tokio::time;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::audio::{AudioSource, Segmenter, SegmenterConfig};
use crate::demo::{DemoFeed, FeedState};
use crate::error::Result;
use crate::heuristics::{ActionItemConfig, DiscourseClassifier, KeywordClassifier, extract_action_items};
use crate::models::{
    ActionItem, DiscourseKind, MeetingGraph, StructuredSummary, SummaryItem, Utterance,
    UtteranceLog,
};
use crate::stt::Transcribe;
use crate::summarize::{DEFAULT_CONTEXT_CHARS, RollingContext, Summarize};
use crate::viz::project;

/// Configuration for one meeting session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Length of each captured audio segment
    pub segment_duration: Duration,
    /// Language hint passed to speech recognition
    pub language: String,
    /// Speaker label for live recognized speech
    pub default_speaker: String,
    /// Character bound for the rolling summarization context
    pub context_chars: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            segment_duration: Duration::from_secs(5),
            language: "en".to_string(),
            default_speaker: "Speaker".to_string(),
            context_chars: DEFAULT_CONTEXT_CHARS,
        }
    }
}

/// Pipeline outputs surfaced to the display layer as they happen.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    UtteranceAdded(Utterance),
    SummaryReady(SummaryItem),
}

/// The result of one summarization call, tagged with the session it
/// belongs to so late arrivals for an ended session can be discarded.
#[derive(Debug)]
pub struct SummaryOutcome {
    pub session_id: Uuid,
    pub utterance_id: String,
    pub speaker: String,
    /// Original utterance text, used for the fallback digest and for
    /// advancing the rolling context
    pub text: String,
    pub timestamp_ms: i64,
    pub result: Result<StructuredSummary>,
}

/// State for one meeting: the append-only utterance log, summaries in
/// completion order, extracted action items, and the rolling context.
///
/// Utterances are appended in source-event order. Summaries are appended
/// in the order their calls complete, which may differ when latencies
/// differ; no sequencing barrier is imposed.
pub struct MeetingSession {
    id: Uuid,
    config: SessionConfig,
    log: UtteranceLog,
    summaries: Vec<SummaryItem>,
    action_items: Vec<ActionItem>,
    context: RollingContext,
    classifier: Box<dyn DiscourseClassifier>,
    ended: bool,
}

impl MeetingSession {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            id: Uuid::new_v4(),
            context: RollingContext::new(config.context_chars),
            config,
            log: UtteranceLog::new(),
            summaries: Vec::new(),
            action_items: Vec::new(),
            classifier: Box::new(KeywordClassifier::default()),
            ended: false,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn utterances(&self) -> &[Utterance] {
        self.log.as_slice()
    }

    pub fn summaries(&self) -> &[SummaryItem] {
        &self.summaries
    }

    pub fn action_items(&self) -> &[ActionItem] {
        &self.action_items
    }

    pub fn context(&self) -> &RollingContext {
        &self.context
    }

    pub fn has_ended(&self) -> bool {
        self.ended
    }

    /// Unique speaker labels in first-seen order.
    pub fn participants(&self) -> Vec<String> {
        self.log.speakers()
    }

    /// Mark the session over. In-flight call results arriving after this
    /// point are discarded rather than applied.
    pub fn end(&mut self) {
        self.ended = true;
    }

    /// Turn one recognized text into an utterance, in source-event order.
    ///
    /// Empty or whitespace-only recognition results produce nothing; a
    /// segment with no speech leaves no trace in the log.
    pub fn ingest_transcription(&mut self, text: &str, speaker: Option<&str>) -> Option<Utterance> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        let speaker = speaker.unwrap_or(&self.config.default_speaker).to_string();
        Some(self.log.append(&speaker, text, None).clone())
    }

    /// Append a scripted utterance from the demo feed.
    ///
    /// The log re-assigns ids monotonically; scripted back-references line
    /// up because the feed is the session's only producer.
    pub fn ingest_scripted(&mut self, scripted: Utterance) -> Utterance {
        self.log
            .append_at(
                &scripted.speaker,
                &scripted.text,
                scripted.related_to,
                scripted.timestamp_ms,
            )
            .clone()
    }

    /// Snapshot the rolling context for a call being issued now.
    ///
    /// The snapshot must be taken at issue time, not completion time, so a
    /// racing call never sees the not-yet-applied effect of another
    /// in-flight call.
    pub fn issue_context(&self) -> RollingContext {
        self.context.clone()
    }

    /// Apply a completed summarization call.
    ///
    /// Returns the summary appended to the session, or `None` when the
    /// outcome is stale (wrong session, or the session already ended).
    /// Success advances the rolling context and collects any extracted
    /// action items; a failed call synthesizes a minimal fallback digest
    /// and leaves the context unchanged.
    pub fn apply_summary_outcome(&mut self, outcome: SummaryOutcome) -> Option<SummaryItem> {
        if outcome.session_id != self.id || self.ended {
            debug!(
                utterance = %outcome.utterance_id,
                "discarding summary for inactive session"
            );
            return None;
        }

        let item = match outcome.result {
            Ok(summary) => {
                self.context = self.context.appended(&outcome.speaker, &outcome.text);
                self.action_items.extend(
                    summary
                        .action_items
                        .into_iter()
                        .map(|draft| draft.into_action_item()),
                );
                SummaryItem {
                    id: format!("sum-{}", outcome.utterance_id),
                    speaker: outcome.speaker,
                    text: summary.summary,
                    timestamp_ms: outcome.timestamp_ms,
                    kind: summary.kind,
                }
            }
            Err(e) => {
                // A spoken utterance is never left unsummarized: fall back
                // to echoing the utterance itself. Context stays untouched.
                warn!(utterance = %outcome.utterance_id, "summarization failed: {}", e);
                SummaryItem {
                    id: format!("sum-{}", outcome.utterance_id),
                    speaker: outcome.speaker,
                    text: outcome.text,
                    timestamp_ms: outcome.timestamp_ms,
                    kind: DiscourseKind::Statement,
                }
            }
        };

        self.summaries.push(item.clone());
        Some(item)
    }

    /// Derive a summary locally from one utterance, demo style: the text
    /// stands as its own digest and the keyword heuristic classifies it.
    pub fn summarize_locally(&mut self, utterance: &Utterance) -> SummaryItem {
        let item = SummaryItem {
            id: format!("sum-{}", utterance.id),
            speaker: utterance.speaker.clone(),
            text: utterance.text.clone(),
            timestamp_ms: utterance.timestamp_ms,
            kind: self.classifier.classify(&utterance.text),
        };
        self.summaries.push(item.clone());
        item
    }

    /// Replace the action item list with a keyword extraction over the
    /// current utterance log. Used by the demo path, where no structured
    /// summarizer output exists.
    pub fn derive_action_items(&mut self, now: DateTime<Utc>) -> &[ActionItem] {
        self.action_items = extract_action_items(
            self.log.as_slice(),
            &self.participants(),
            now,
            &ActionItemConfig::default(),
        );
        &self.action_items
    }

    /// Project the current utterance sequence into the display graph.
    pub fn graph(&self) -> MeetingGraph {
        project(self.log.as_slice(), self.classifier.as_ref())
    }
}

/// Issue one summarization call without blocking the orchestration loop.
///
/// The rolling context is snapshotted here, at issue time. The outcome is
/// delivered over `tx` whenever the call completes; completion order is
/// whatever the latencies make it.
pub fn dispatch_summary(
    session: &MeetingSession,
    utterance: Utterance,
    summarizer: Arc<dyn Summarize>,
    tx: mpsc::Sender<SummaryOutcome>,
) {
    let session_id = session.id();
    let context = session.issue_context();

    tokio::spawn(async move {
        let result = summarizer
            .summarize(&utterance.text, &context, &utterance.speaker)
            .await;
        let outcome = SummaryOutcome {
            session_id,
            utterance_id: utterance.id,
            speaker: utterance.speaker,
            text: utterance.text,
            timestamp_ms: utterance.timestamp_ms,
            result,
        };
        // The session may already be gone; a dead receiver just means the
        // result is discarded.
        tx.send(outcome).await.ok();
    });
}

/// Run the live pipeline until the shutdown signal flips.
///
/// Segments are transcribed sequentially so utterances append in
/// source-event order; summarization runs concurrently and lands in
/// completion order. A failed transcription skips its segment. When the
/// segmenter drains, the session is ended and still-in-flight summaries
/// are dropped by the staleness check.
pub async fn run_live(
    mut session: MeetingSession,
    source: Box<dyn AudioSource>,
    stt: Arc<dyn Transcribe>,
    summarizer: Arc<dyn Summarize>,
    events: mpsc::Sender<SessionEvent>,
    shutdown: watch::Receiver<bool>,
) -> Result<MeetingSession> {
    let segmenter = Segmenter::new(
        source,
        SegmenterConfig {
            segment_duration: session.config.segment_duration,
            ..SegmenterConfig::default()
        },
    );

    let (segment_tx, mut segment_rx) = mpsc::channel(8);
    let segmenter_handle = tokio::spawn(segmenter.run(segment_tx, shutdown));

    let (outcome_tx, mut outcome_rx) = mpsc::channel::<SummaryOutcome>(16);

    loop {
        tokio::select! {
            segment = segment_rx.recv() => match segment {
                Some(segment) => {
                    match stt.transcribe(segment.data, &session.config.language).await {
                        Ok(transcription) => {
                            debug!(
                                seq = segment.seq,
                                ms = transcription.duration_ms,
                                "segment transcribed"
                            );
                            if let Some(utterance) =
                                session.ingest_transcription(&transcription.text, None)
                            {
                                events
                                    .send(SessionEvent::UtteranceAdded(utterance.clone()))
                                    .await
                                    .ok();
                                dispatch_summary(
                                    &session,
                                    utterance,
                                    Arc::clone(&summarizer),
                                    outcome_tx.clone(),
                                );
                            }
                        }
                        Err(e) => {
                            warn!(seq = segment.seq, "transcription failed, segment skipped: {}", e);
                        }
                    }
                }
                None => {
                    session.end();
                    break;
                }
            },
            outcome = outcome_rx.recv() => {
                if let Some(outcome) = outcome {
                    if let Some(item) = session.apply_summary_outcome(outcome) {
                        events.send(SessionEvent::SummaryReady(item)).await.ok();
                    }
                }
            }
        }
    }

    match segmenter_handle.await {
        Ok(result) => result?,
        Err(e) => warn!("segmenter task failed: {}", e),
    }

    info!(
        utterances = session.utterances().len(),
        summaries = session.summaries().len(),
        "session ended"
    );
    Ok(session)
}

/// Run the scripted demo feed through the downstream pipeline.
///
/// Bypasses capture, transcription, and the remote summarizer: utterances
/// come from the script on a fixed interval and summaries are derived
/// locally. Feeds the same projector and action item extraction as the
/// live path.
pub async fn run_demo(
    mut session: MeetingSession,
    feed: &mut DemoFeed,
    interval: Duration,
    events: mpsc::Sender<SessionEvent>,
) -> MeetingSession {
    feed.start();
    let mut timer = time::interval_at(time::Instant::now() + interval, interval);

    while feed.state() == FeedState::Active {
        timer.tick().await;
        if let Some(scripted) = feed.tick() {
            let utterance = session.ingest_scripted(scripted);
            events
                .send(SessionEvent::UtteranceAdded(utterance.clone()))
                .await
                .ok();
            let item = session.summarize_locally(&utterance);
            events.send(SessionEvent::SummaryReady(item)).await.ok();
        }
    }

    session.derive_action_items(Utc::now());
    session.end();
    info!(
        utterances = session.utterances().len(),
        progress = feed.progress(),
        "demo feed complete"
    );
    session
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::MockAudioSource;
    use crate::error::PipelineError;
    use crate::stt::Transcription;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    struct ScriptedStt {
        texts: Mutex<VecDeque<String>>,
    }

    impl ScriptedStt {
        fn new(texts: &[&str]) -> Self {
            Self {
                texts: Mutex::new(texts.iter().map(|t| t.to_string()).collect()),
            }
        }
    }

    #[async_trait]
    impl Transcribe for ScriptedStt {
        async fn transcribe(&self, _segment: Vec<u8>, _language: &str) -> Result<Transcription> {
            let text = self.texts.lock().unwrap().pop_front().unwrap_or_default();
            Ok(Transcription {
                text,
                duration_ms: 1,
            })
        }
    }

    /// Echoes the input back as the digest; latency scales with a marker
    /// in the text so tests can stage races.
    struct EchoSummarizer;

    #[async_trait]
    impl Summarize for EchoSummarizer {
        async fn summarize(
            &self,
            text: &str,
            _context: &RollingContext,
            _speaker: &str,
        ) -> Result<StructuredSummary> {
            let delay_ms = if text.contains("slow") { 200 } else { 10 };
            time::sleep(Duration::from_millis(delay_ms)).await;
            Ok(StructuredSummary {
                topics: vec![],
                summary: format!("digest: {}", text),
                action_items: vec![],
                kind: DiscourseKind::Statement,
            })
        }
    }

    fn outcome_for(
        session: &MeetingSession,
        utterance: &Utterance,
        result: Result<StructuredSummary>,
    ) -> SummaryOutcome {
        SummaryOutcome {
            session_id: session.id(),
            utterance_id: utterance.id.clone(),
            speaker: utterance.speaker.clone(),
            text: utterance.text.clone(),
            timestamp_ms: utterance.timestamp_ms,
            result,
        }
    }

    #[test]
    fn test_empty_transcription_is_skipped() {
        let mut session = MeetingSession::new(SessionConfig::default());
        assert!(session.ingest_transcription("  \n ", None).is_none());
        assert!(session.utterances().is_empty());
    }

    #[test]
    fn test_successful_summary_advances_context_and_collects_items() {
        let mut session = MeetingSession::new(SessionConfig::default());
        let utterance = session
            .ingest_transcription("I will finish the report", Some("Jonas"))
            .unwrap();

        let summary = StructuredSummary {
            topics: vec!["report".to_string()],
            summary: "Jonas will finish the report.".to_string(),
            action_items: vec![crate::models::ActionItemDraft {
                task: "finish the report".to_string(),
                owner: "Jonas".to_string(),
                due: Some("Friday".to_string()),
            }],
            kind: DiscourseKind::Action,
        };

        let item = session
            .apply_summary_outcome(outcome_for(&session, &utterance, Ok(summary)))
            .unwrap();

        assert_eq!(item.kind, DiscourseKind::Action);
        assert_eq!(session.summaries().len(), 1);
        assert_eq!(session.action_items().len(), 1);
        assert_eq!(session.action_items()[0].deadline.as_deref(), Some("Friday"));
        assert_eq!(session.context().as_str(), "Jonas: I will finish the report");
    }

    #[test]
    fn test_failed_summary_synthesizes_fallback_and_keeps_context() {
        let mut session = MeetingSession::new(SessionConfig::default());
        let utterance = session
            .ingest_transcription("we discussed the roadmap", Some("Maya"))
            .unwrap();

        let context_before = session.context().clone();
        let item = session
            .apply_summary_outcome(outcome_for(
                &session,
                &utterance,
                Err(PipelineError::unavailable("summarizer", "connection refused")),
            ))
            .unwrap();

        // The spoken utterance is never left unsummarized
        assert_eq!(item.text, "we discussed the roadmap");
        assert_eq!(item.kind, DiscourseKind::Statement);
        // A failed call leaves the context unchanged
        assert_eq!(session.context(), &context_before);
    }

    #[test]
    fn test_stale_outcomes_are_discarded() {
        let mut session = MeetingSession::new(SessionConfig::default());
        let utterance = session
            .ingest_transcription("a remark", Some("Maya"))
            .unwrap();

        // Wrong session id
        let mut foreign = outcome_for(&session, &utterance, Ok(StructuredSummary::degraded("a remark")));
        foreign.session_id = Uuid::new_v4();
        assert!(session.apply_summary_outcome(foreign).is_none());

        // Right session, but it already ended
        let late = outcome_for(&session, &utterance, Ok(StructuredSummary::degraded("a remark")));
        session.end();
        assert!(session.apply_summary_outcome(late).is_none());
        assert!(session.summaries().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_summaries_may_interleave_out_of_source_order() {
        let mut session = MeetingSession::new(SessionConfig::default());
        let summarizer: Arc<dyn Summarize> = Arc::new(EchoSummarizer);
        let (tx, mut rx) = mpsc::channel(8);

        let first = session
            .ingest_transcription("the slow opening remark", Some("Maya"))
            .unwrap();
        dispatch_summary(&session, first.clone(), Arc::clone(&summarizer), tx.clone());

        let second = session
            .ingest_transcription("a quick reply", Some("Jonas"))
            .unwrap();
        dispatch_summary(&session, second.clone(), Arc::clone(&summarizer), tx.clone());

        // Utterances hold source order...
        assert_eq!(session.utterances()[0].id, first.id);
        assert_eq!(session.utterances()[1].id, second.id);

        // ...but the faster call completes first, and no barrier reorders it
        let completed_first = rx.recv().await.unwrap();
        assert_eq!(completed_first.utterance_id, second.id);
        session.apply_summary_outcome(completed_first);

        let completed_second = rx.recv().await.unwrap();
        assert_eq!(completed_second.utterance_id, first.id);
        session.apply_summary_outcome(completed_second);

        assert_eq!(session.summaries()[0].id, format!("sum-{}", second.id));
        assert_eq!(session.summaries()[1].id, format!("sum-{}", first.id));
    }

    #[test]
    fn test_issue_time_context_snapshot() {
        let session = {
            let mut s = MeetingSession::new(SessionConfig::default());
            let u = s.ingest_transcription("hello", Some("Maya")).unwrap();
            s.apply_summary_outcome(outcome_for(
                &s,
                &u,
                Ok(StructuredSummary::degraded("hello")),
            ));
            s
        };

        // The snapshot reflects only applied completions, and advancing the
        // session later must not affect an already-taken snapshot.
        let snapshot = session.issue_context();
        assert_eq!(snapshot.as_str(), "Maya: hello");
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_live_end_to_end_with_mocks() {
        let source = MockAudioSource::new().with_intervals(vec![
            vec![1; 160],
            vec![2; 160],
        ]);
        let stt: Arc<dyn Transcribe> =
            Arc::new(ScriptedStt::new(&["hello everyone", "let's begin"]));
        let summarizer: Arc<dyn Summarize> = Arc::new(EchoSummarizer);

        let config = SessionConfig {
            segment_duration: Duration::from_secs(1),
            ..SessionConfig::default()
        };
        let session = MeetingSession::new(config);

        let (events_tx, mut events_rx) = mpsc::channel(32);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let pipeline = tokio::spawn(run_live(
            session,
            Box::new(source),
            stt,
            summarizer,
            events_tx,
            shutdown_rx,
        ));

        // Wait for both summaries before stopping so nothing is in flight.
        let mut utterances = 0;
        let mut summaries = 0;
        while summaries < 2 {
            match events_rx.recv().await.unwrap() {
                SessionEvent::UtteranceAdded(_) => utterances += 1,
                SessionEvent::SummaryReady(_) => summaries += 1,
            }
        }
        assert_eq!(utterances, 2);

        shutdown_tx.send(true).unwrap();
        let session = pipeline.await.unwrap().unwrap();

        assert!(session.has_ended());
        assert_eq!(session.utterances().len(), 2);
        assert_eq!(session.utterances()[0].text, "hello everyone");
        assert_eq!(session.utterances()[1].text, "let's begin");
        assert_eq!(session.summaries().len(), 2);
        assert_eq!(session.graph().nodes.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_live_surfaces_device_denial() {
        let source = MockAudioSource::new().with_start_failure("denied by environment");
        let stt: Arc<dyn Transcribe> = Arc::new(ScriptedStt::new(&[]));
        let summarizer: Arc<dyn Summarize> = Arc::new(EchoSummarizer);

        let (events_tx, _events_rx) = mpsc::channel(8);
        let (_shutdown_tx, shutdown_rx) = watch::channel(false);

        let result = run_live(
            MeetingSession::new(SessionConfig::default()),
            Box::new(source),
            stt,
            summarizer,
            events_tx,
            shutdown_rx,
        )
        .await;

        assert!(matches!(
            result,
            Err(PipelineError::PermissionDenied { .. })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_demo_completes_fifteen_item_script() {
        let mut feed = DemoFeed::new();
        let session = MeetingSession::new(SessionConfig::default());
        let (events_tx, mut events_rx) = mpsc::channel(64);

        let collector = tokio::spawn(async move {
            let mut count = 0;
            while events_rx.recv().await.is_some() {
                count += 1;
            }
            count
        });

        let session = run_demo(
            session,
            &mut feed,
            Duration::from_millis(4000),
            events_tx,
        )
        .await;

        assert_eq!(feed.state(), FeedState::Complete);
        assert_eq!(feed.progress(), 100.0);
        assert_eq!(session.utterances().len(), 15);
        assert_eq!(session.summaries().len(), 15);
        assert!(session.has_ended());

        // One event per utterance plus one per summary
        assert_eq!(collector.await.unwrap(), 30);

        // The scripted back-references survive into the graph
        let graph = session.graph();
        assert_eq!(graph.nodes.len(), 15);
        assert_eq!(
            graph.edges.len(),
            crate::demo::demo_script()
                .iter()
                .filter(|line| line.related_to.is_some())
                .count()
        );

        // The commitment lines are picked up as obligations
        assert!(!session.action_items().is_empty());
        assert_eq!(session.participants().len(), 4);
    }
}
