use std::io::Cursor;

use crate::error::{PipelineError, Result};

/// Frame 16-bit PCM mono samples as an in-memory WAV blob.
///
/// The blob is what the segmenter hands to the transcription upload; the
/// remote service expects a self-describing container, not raw PCM.
pub fn encode_wav(samples: &[i16], sample_rate: u32) -> Result<Vec<u8>> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut buffer = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut buffer, spec)
            .map_err(|e| PipelineError::capture(format!("failed to start WAV writer: {}", e)))?;
        for &sample in samples {
            writer
                .write_sample(sample)
                .map_err(|e| PipelineError::capture(format!("failed to write WAV sample: {}", e)))?;
        }
        writer
            .finalize()
            .map_err(|e| PipelineError::capture(format!("failed to finalize WAV: {}", e)))?;
    }

    Ok(buffer.into_inner())
}

/// Mix interleaved multi-channel samples down to mono by averaging frames.
pub fn mix_to_mono(samples: &[i16], channels: usize) -> Vec<i16> {
    if channels <= 1 {
        return samples.to_vec();
    }
    samples
        .chunks_exact(channels)
        .map(|frame| {
            let sum: i32 = frame.iter().map(|&s| s as i32).sum();
            (sum / channels as i32) as i16
        })
        .collect()
}

/// Linear-interpolation resampling between arbitrary rates.
///
/// Quality is adequate for speech recognition input; not intended for
/// playback use.
pub fn resample(samples: &[i16], source_rate: u32, target_rate: u32) -> Vec<i16> {
    if source_rate == target_rate || samples.is_empty() {
        return samples.to_vec();
    }

    let ratio = source_rate as f64 / target_rate as f64;
    let output_len = (samples.len() as f64 / ratio).floor() as usize;
    let mut output = Vec::with_capacity(output_len);

    for i in 0..output_len {
        let position = i as f64 * ratio;
        let index = position.floor() as usize;
        let frac = position - index as f64;

        let current = samples[index] as f64;
        let next = if index + 1 < samples.len() {
            samples[index + 1] as f64
        } else {
            current
        };

        output.push((current + (next - current) * frac).round() as i16);
    }

    output
}
