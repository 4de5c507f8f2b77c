use std::sync::{Arc, Mutex};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use tracing::{debug, warn};

use crate::audio::source::AudioSource;
use crate::audio::wav::{mix_to_mono, resample};
use crate::error::{PipelineError, Result};

/// Capture sample rate expected by the transcription service input.
pub const CAPTURE_SAMPLE_RATE: u32 = 16_000;

/// Wrapper for `cpal::Stream` to make it `Send`.
///
/// SAFETY: the stream is only touched while holding the surrounding Mutex,
/// so it never crosses threads concurrently.
struct SendableStream(cpal::Stream);

unsafe impl Send for SendableStream {}

/// Live input-device capture.
///
/// Captures 16-bit PCM at 16 kHz mono into a shared buffer that the
/// segmenter drains at each segment boundary. Tries the preferred format
/// first (i16/16 kHz/mono), then f32 with conversion, then the device's
/// native config with software mixdown and resampling.
pub struct CpalAudioSource {
    device: cpal::Device,
    stream: Arc<Mutex<Option<SendableStream>>>,
    buffer: Arc<Mutex<Vec<i16>>>,
}

impl CpalAudioSource {
    /// Acquire an input device.
    ///
    /// Fails with `DeviceNotFound` when the named (or default) device does
    /// not exist, or `PermissionDenied` when the environment refuses access.
    /// Acquisition is recoverable: the caller may retry after the user
    /// grants access.
    pub fn acquire(device_name: Option<&str>) -> Result<Self> {
        let host = cpal::default_host();

        let device = match device_name {
            Some(name) => {
                let mut devices = host.input_devices().map_err(|e| {
                    PipelineError::PermissionDenied {
                        reason: format!("cannot enumerate input devices: {}", e),
                    }
                })?;
                devices
                    .find(|d| d.name().map(|n| n == name).unwrap_or(false))
                    .ok_or_else(|| PipelineError::DeviceNotFound {
                        device: name.to_string(),
                    })?
            }
            None => host
                .default_input_device()
                .ok_or_else(|| PipelineError::DeviceNotFound {
                    device: "default".to_string(),
                })?,
        };

        debug!(device = ?device.name().ok(), "acquired audio input device");

        Ok(Self {
            device,
            stream: Arc::new(Mutex::new(None)),
            buffer: Arc::new(Mutex::new(Vec::new())),
        })
    }

    fn build_stream(&self) -> Result<cpal::Stream> {
        let preferred = cpal::StreamConfig {
            channels: 1,
            sample_rate: cpal::SampleRate(CAPTURE_SAMPLE_RATE),
            buffer_size: cpal::BufferSize::Default,
        };

        let err_callback = |err| {
            warn!("audio stream error: {}", err);
        };

        // i16/16kHz/mono: PipeWire/PulseAudio convert transparently
        let buffer = Arc::clone(&self.buffer);
        if let Ok(stream) = self.device.build_input_stream(
            &preferred,
            move |data: &[i16], _: &cpal::InputCallbackInfo| {
                if let Ok(mut buf) = buffer.lock() {
                    buf.extend_from_slice(data);
                }
            },
            err_callback,
            None,
        ) {
            return Ok(stream);
        }

        // f32/16kHz/mono: devices that only expose float formats
        let buffer = Arc::clone(&self.buffer);
        if let Ok(stream) = self.device.build_input_stream(
            &preferred,
            move |data: &[f32], _: &cpal::InputCallbackInfo| {
                if let Ok(mut buf) = buffer.lock() {
                    buf.extend(
                        data.iter()
                            .map(|&s| (s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16),
                    );
                }
            },
            err_callback,
            None,
        ) {
            return Ok(stream);
        }

        self.build_stream_native()
    }

    /// Capture at the device's native config, converting in software.
    fn build_stream_native(&self) -> Result<cpal::Stream> {
        use cpal::SampleFormat;

        let default_config =
            self.device
                .default_input_config()
                .map_err(|e| PipelineError::PermissionDenied {
                    reason: format!("cannot query default input config: {}", e),
                })?;

        let native_rate = default_config.sample_rate().0;
        let native_channels = default_config.channels() as usize;
        let stream_config: cpal::StreamConfig = default_config.clone().into();

        debug!(
            channels = native_channels,
            rate = native_rate,
            format = ?default_config.sample_format(),
            "using native audio format with software conversion"
        );

        let err_callback = |err| {
            warn!("audio stream error: {}", err);
        };

        let buffer = Arc::clone(&self.buffer);

        match default_config.sample_format() {
            SampleFormat::I16 => self
                .device
                .build_input_stream(
                    &stream_config,
                    move |data: &[i16], _: &cpal::InputCallbackInfo| {
                        let mono = mix_to_mono(data, native_channels);
                        let converted = resample(&mono, native_rate, CAPTURE_SAMPLE_RATE);
                        if let Ok(mut buf) = buffer.lock() {
                            buf.extend_from_slice(&converted);
                        }
                    },
                    err_callback,
                    None,
                )
                .map_err(|e| PipelineError::capture(format!("failed to open i16 stream: {}", e))),
            SampleFormat::F32 => self
                .device
                .build_input_stream(
                    &stream_config,
                    move |data: &[f32], _: &cpal::InputCallbackInfo| {
                        let i16_data: Vec<i16> = data
                            .iter()
                            .map(|&s| (s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16)
                            .collect();
                        let mono = mix_to_mono(&i16_data, native_channels);
                        let converted = resample(&mono, native_rate, CAPTURE_SAMPLE_RATE);
                        if let Ok(mut buf) = buffer.lock() {
                            buf.extend_from_slice(&converted);
                        }
                    },
                    err_callback,
                    None,
                )
                .map_err(|e| PipelineError::capture(format!("failed to open f32 stream: {}", e))),
            fmt => Err(PipelineError::capture(format!(
                "unsupported native sample format: {:?}",
                fmt
            ))),
        }
    }
}

impl AudioSource for CpalAudioSource {
    fn start(&mut self) -> Result<()> {
        {
            let guard = self
                .stream
                .lock()
                .map_err(|e| PipelineError::capture(format!("stream lock poisoned: {}", e)))?;
            if guard.is_some() {
                return Ok(()); // already capturing
            }
        }

        let stream = self.build_stream()?;
        stream
            .play()
            .map_err(|e| PipelineError::capture(format!("failed to start stream: {}", e)))?;

        let mut guard = self
            .stream
            .lock()
            .map_err(|e| PipelineError::capture(format!("stream lock poisoned: {}", e)))?;
        *guard = Some(SendableStream(stream));
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        let mut guard = self
            .stream
            .lock()
            .map_err(|e| PipelineError::capture(format!("stream lock poisoned: {}", e)))?;

        if let Some(stream) = guard.take() {
            stream
                .0
                .pause()
                .map_err(|e| PipelineError::capture(format!("failed to stop stream: {}", e)))?;
        }
        Ok(())
    }

    fn read_samples(&mut self) -> Result<Vec<i16>> {
        let mut buffer = self
            .buffer
            .lock()
            .map_err(|e| PipelineError::capture(format!("buffer lock poisoned: {}", e)))?;
        Ok(std::mem::take(&mut *buffer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acquire_unknown_device_fails() {
        // Either the named device is missing or enumeration itself is
        // unavailable on the host; both are acquisition failures.
        let result = CpalAudioSource::acquire(Some("no-such-device-9f2c"));
        assert!(result.is_err());
    }

    #[test]
    #[ignore] // Requires audio hardware
    fn test_acquire_default_device() {
        let source = CpalAudioSource::acquire(None);
        assert!(source.is_ok());
    }

    #[test]
    #[ignore] // Requires audio hardware
    fn test_start_read_stop_cycle() {
        let mut source = CpalAudioSource::acquire(None).expect("no default device");
        source.start().expect("failed to start");
        std::thread::sleep(std::time::Duration::from_millis(100));
        let samples = source.read_samples().expect("failed to read");
        let _ = samples;
        source.stop().expect("failed to stop");
    }
}
