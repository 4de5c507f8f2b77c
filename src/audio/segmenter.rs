use std::time::Duration;

use chrono::Utc;
use tokio::sync::{mpsc, watch};
use tokio::time;
use tracing::{debug, warn};

use crate::audio::source::AudioSource;
use crate::audio::wav::encode_wav;
use crate::error::Result;

use super::capture::CAPTURE_SAMPLE_RATE;

/// Configuration for the audio segmenter.
#[derive(Debug, Clone)]
pub struct SegmenterConfig {
    /// Length of each emitted segment
    pub segment_duration: Duration,
    /// Sample rate of the captured PCM
    pub sample_rate: u32,
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            segment_duration: Duration::from_secs(5),
            sample_rate: CAPTURE_SAMPLE_RATE,
        }
    }
}

/// One bounded-duration slice of captured audio, WAV-framed for upload.
#[derive(Debug, Clone)]
pub struct AudioSegment {
    /// Emission sequence number, starting at 0
    pub seq: u64,
    /// WAV-framed PCM ready for one-shot upload
    pub data: Vec<u8>,
    /// Number of PCM samples in the segment
    pub sample_count: usize,
    /// Emission instant, milliseconds since epoch
    pub captured_at_ms: i64,
}

/// Slices a continuous audio source into fixed-duration segments.
///
/// The capture buffer accumulates continuously; finalizing a segment drains
/// the buffer while capture keeps running, so no audio is lost at the
/// boundary. Segments with zero captured samples are silently dropped.
/// Device errors during an active capture are logged and capture continues
/// with subsequent segments.
pub struct Segmenter {
    source: Box<dyn AudioSource>,
    config: SegmenterConfig,
}

impl Segmenter {
    pub fn new(source: Box<dyn AudioSource>, config: SegmenterConfig) -> Self {
        Self { source, config }
    }

    /// Run the capture loop until the shutdown signal flips.
    ///
    /// Starting the source may fail (`PermissionDenied` / `DeviceNotFound`);
    /// that error surfaces to the caller before any segment is emitted. On
    /// shutdown the in-flight segment is finalized and emitted, then the
    /// device is released.
    pub async fn run(
        mut self,
        tx: mpsc::Sender<AudioSegment>,
        mut shutdown: watch::Receiver<bool>,
    ) -> Result<()> {
        self.source.start()?;

        let mut seq = 0u64;
        let mut interval = time::interval_at(
            time::Instant::now() + self.config.segment_duration,
            self.config.segment_duration,
        );

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    if !self.emit_segment(&tx, &mut seq).await {
                        break;
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        // Finalize whatever is in flight before releasing
                        self.emit_segment(&tx, &mut seq).await;
                        break;
                    }
                }
            }
        }

        if let Err(e) = self.source.stop() {
            warn!("failed to release audio source: {}", e);
        }
        Ok(())
    }

    /// Drain the buffer and emit one segment.
    ///
    /// Returns false only when the receiver is gone; read or encoding
    /// failures are local to this segment.
    async fn emit_segment(&mut self, tx: &mpsc::Sender<AudioSegment>, seq: &mut u64) -> bool {
        let samples = match self.source.read_samples() {
            Ok(samples) => samples,
            Err(e) => {
                warn!("segment capture failed, continuing: {}", e);
                return true;
            }
        };

        if samples.is_empty() {
            debug!("dropping zero-byte segment");
            return true;
        }

        let data = match encode_wav(&samples, self.config.sample_rate) {
            Ok(data) => data,
            Err(e) => {
                warn!("segment encoding failed, continuing: {}", e);
                return true;
            }
        };

        let segment = AudioSegment {
            seq: *seq,
            sample_count: samples.len(),
            data,
            captured_at_ms: Utc::now().timestamp_millis(),
        };
        *seq += 1;

        tx.send(segment).await.is_ok()
    }
}
