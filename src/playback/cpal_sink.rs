//! Sound-card output using cpal.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Stream, StreamConfig};

use super::sink::{AudioSink, Clip, PlaybackOutcome};
use crate::error::{MorseError, Result};

/// Time left for the device to drain its last buffer after the clip ends.
const DRAIN_TIME: Duration = Duration::from_millis(100);

/// Plays clips on the default output device.
#[derive(Debug, Default, Clone, Copy)]
pub struct CpalSink;

impl AudioSink for CpalSink {
    fn name(&self) -> &str {
        "cpal"
    }

    fn is_available(&self) -> bool {
        cpal::default_host().default_output_device().is_some()
    }

    fn play(&self, clip: &Clip, _temp_path: &Path) -> Result<PlaybackOutcome> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| MorseError::Playback("no output device available".to_string()))?;
        let config = device
            .default_output_config()
            .map_err(|e| MorseError::Playback(format!("failed to get default output config: {e}")))?;

        let samples = resample(clip, config.sample_rate().0);
        let channels = config.channels() as usize;
        let cursor = Arc::new(AtomicUsize::new(0));
        let finished = Arc::new(AtomicBool::new(samples.is_empty()));

        let stream_config: StreamConfig = config.clone().into();
        let stream = match config.sample_format() {
            cpal::SampleFormat::F32 => build_stream::<f32>(
                &device, &stream_config, channels, samples, cursor, finished.clone(),
            )?,
            cpal::SampleFormat::I16 => build_stream::<i16>(
                &device, &stream_config, channels, samples, cursor, finished.clone(),
            )?,
            cpal::SampleFormat::U16 => build_stream::<u16>(
                &device, &stream_config, channels, samples, cursor, finished.clone(),
            )?,
            format => {
                return Err(MorseError::Playback(format!(
                    "unsupported sample format: {format:?}"
                )));
            }
        };

        stream
            .play()
            .map_err(|e| MorseError::Playback(format!("failed to start stream: {e}")))?;

        while !finished.load(Ordering::Acquire) {
            std::thread::sleep(Duration::from_millis(10));
        }
        std::thread::sleep(DRAIN_TIME);
        Ok(PlaybackOutcome::Played)
    }
}

fn build_stream<T: cpal::SizedSample + cpal::FromSample<f32>>(
    device: &cpal::Device,
    config: &StreamConfig,
    channels: usize,
    samples: Arc<[f32]>,
    cursor: Arc<AtomicUsize>,
    finished: Arc<AtomicBool>,
) -> Result<Stream> {
    device
        .build_output_stream(
            config,
            move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                for frame in data.chunks_mut(channels.max(1)) {
                    let i = cursor.fetch_add(1, Ordering::Relaxed);
                    let value = match samples.get(i) {
                        Some(&v) => v,
                        None => {
                            finished.store(true, Ordering::Release);
                            0.0
                        }
                    };
                    for sample in frame.iter_mut() {
                        *sample = T::from_sample(value);
                    }
                }
            },
            |err| log::error!("audio output error: {err}"),
            None,
        )
        .map_err(|e| MorseError::Playback(format!("failed to build output stream: {e}")))
}

/// Convert the clip to f32 at the device rate (nearest neighbour).
fn resample(clip: &Clip, device_rate: u32) -> Arc<[f32]> {
    let to_f32 = |s: i16| s as f32 / 32768.0;
    if device_rate == clip.sample_rate || clip.pcm.is_empty() {
        return clip.pcm.iter().map(|&s| to_f32(s)).collect();
    }
    let ratio = clip.sample_rate as f64 / device_rate as f64;
    let len = (clip.pcm.len() as f64 / ratio).round() as usize;
    (0..len)
        .map(|i| {
            let src = ((i as f64 * ratio) as usize).min(clip.pcm.len() - 1);
            to_f32(clip.pcm[src])
        })
        .collect()
}
