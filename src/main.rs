use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::sync::{mpsc, watch};
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

use colloquy::{
    CpalAudioSource, DemoFeed, HumanTranscript, MeetingSession, SessionConfig, SessionEvent,
    SessionExport, SttClient, SttConfig, SummarizerClient, SummarizerConfig, run_demo, run_live,
};

#[derive(Parser)]
#[command(name = "colloquy")]
#[command(author, version, about = "Live meeting transcription and summarization pipeline", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Capture a live meeting from the microphone
    Live {
        /// Segment duration in seconds
        #[arg(long, default_value = "5")]
        segment_secs: u64,

        /// Language hint for speech recognition
        #[arg(long, default_value = "en")]
        language: String,

        /// Speaker label attached to recognized speech
        #[arg(long, default_value = "Speaker")]
        speaker: String,

        /// Audio input device name (system default when omitted)
        #[arg(long)]
        device: Option<String>,

        /// Output file for the session record (JSON)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output file for a human-readable transcript
        #[arg(long)]
        human_readable: Option<PathBuf>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Play the scripted demo meeting through the pipeline
    Demo {
        /// Milliseconds between scripted utterances
        #[arg(long, default_value = "4000")]
        interval_ms: u64,

        /// Output file for the session record (JSON)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output file for a human-readable transcript
        #[arg(long)]
        human_readable: Option<PathBuf>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Report whether the remote services are configured
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Live {
            segment_secs,
            language,
            speaker,
            device,
            output,
            human_readable,
            verbose,
        } => {
            setup_logging(verbose);
            live_command(
                segment_secs,
                language,
                speaker,
                device,
                output,
                human_readable,
            )
            .await
        }
        Commands::Demo {
            interval_ms,
            output,
            human_readable,
            verbose,
        } => {
            setup_logging(verbose);
            demo_command(interval_ms, output, human_readable).await
        }
        Commands::Check => check_command(),
    }
}

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber).ok();
}

async fn live_command(
    segment_secs: u64,
    language: String,
    speaker: String,
    device: Option<String>,
    output: Option<PathBuf>,
    human_readable: Option<PathBuf>,
) -> Result<()> {
    // Credentials are checked before touching the device, so a missing key
    // fails here rather than mid-capture.
    let stt = SttClient::new(SttConfig::from_env()?);
    let summarizer = SummarizerClient::new(SummarizerConfig::from_env()?);

    let source =
        CpalAudioSource::acquire(device.as_deref()).context("Failed to acquire audio input")?;

    let config = SessionConfig {
        segment_duration: Duration::from_secs(segment_secs),
        language,
        default_speaker: speaker,
        ..SessionConfig::default()
    };
    let session = MeetingSession::new(config);

    let (events_tx, mut events_rx) = mpsc::channel(32);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("stopping capture");
        shutdown_tx.send(true).ok();
    });

    info!("capturing; press Ctrl-C to end the meeting");

    let pipeline = tokio::spawn(run_live(
        session,
        Box::new(source),
        Arc::new(stt),
        Arc::new(summarizer),
        events_tx,
        shutdown_rx,
    ));

    while let Some(event) = events_rx.recv().await {
        print_event(&event);
    }

    let session = pipeline
        .await
        .context("Pipeline task failed")?
        .context("Pipeline error")?;

    print_session_stats(&session);
    write_outputs(&session, output.as_deref(), human_readable.as_deref())
}

async fn demo_command(
    interval_ms: u64,
    output: Option<PathBuf>,
    human_readable: Option<PathBuf>,
) -> Result<()> {
    let mut feed = DemoFeed::new();
    let session = MeetingSession::new(SessionConfig::default());

    let (events_tx, mut events_rx) = mpsc::channel(32);
    let printer = tokio::spawn(async move {
        while let Some(event) = events_rx.recv().await {
            print_event(&event);
        }
    });

    info!("running scripted demo at {}ms per line", interval_ms);
    let session = run_demo(
        session,
        &mut feed,
        Duration::from_millis(interval_ms),
        events_tx,
    )
    .await;
    printer.await.ok();

    info!("demo progress: {:.0}%", feed.progress());
    print_session_stats(&session);
    write_outputs(&session, output.as_deref(), human_readable.as_deref())
}

fn check_command() -> Result<()> {
    match SttConfig::from_env() {
        Ok(_) => println!("speech-to-text: configured"),
        Err(e) => println!("speech-to-text: {}", e),
    }
    match SummarizerConfig::from_env() {
        Ok(_) => println!("summarizer: configured"),
        Err(e) => println!("summarizer: {}", e),
    }
    Ok(())
}

fn print_event(event: &SessionEvent) {
    match event {
        SessionEvent::UtteranceAdded(u) => {
            println!("{}: {}", u.speaker, u.text);
        }
        SessionEvent::SummaryReady(s) => {
            println!("  [{:?}] {}", s.kind, s.text);
        }
    }
}

fn print_session_stats(session: &MeetingSession) {
    let graph = session.graph();
    info!(
        "session {}: {} utterances, {} summaries, {} action items, graph {}x{}",
        session.id(),
        session.utterances().len(),
        session.summaries().len(),
        session.action_items().len(),
        graph.nodes.len(),
        graph.edges.len(),
    );
}

fn write_outputs(
    session: &MeetingSession,
    output: Option<&std::path::Path>,
    human_readable: Option<&std::path::Path>,
) -> Result<()> {
    if let Some(path) = output {
        SessionExport::from_session(session)
            .write_json(path)
            .context("Failed to write session record")?;
        info!("session record written to {:?}", path);
    }
    if let Some(path) = human_readable {
        HumanTranscript::new(session)
            .write_file(path)
            .context("Failed to write transcript")?;
        info!("transcript written to {:?}", path);
    }
    Ok(())
}
