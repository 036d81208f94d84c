//! WAV renderer — turns Morse code into a RIFF/WAVE byte buffer.

use std::path::Path;

use super::pcm::to_pcm_i16;
use super::synth::Synthesizer;
use crate::config::{AudioConfig, write_atomic};
use crate::error::Result;

pub const HEADER_LEN: usize = 44;
const BITS_PER_SAMPLE: u16 = 16;
const CHANNELS: u16 = 1;

/// Render Morse code to a complete WAV file (16-bit mono PCM) in memory.
pub fn render_wav(morse: &str, config: &AudioConfig) -> Result<Vec<u8>> {
    let pcm = render_pcm(morse, config)?;
    Ok(encode_wav(&pcm, config.sample_rate_hz))
}

/// Render Morse code to normalized 16-bit mono samples.
pub fn render_pcm(morse: &str, config: &AudioConfig) -> Result<Vec<i16>> {
    let synth = Synthesizer::new(*config)?;
    let samples = synth.render(morse)?;
    Ok(to_pcm_i16(&samples))
}

/// Render Morse code and write the WAV file to `path`.
///
/// The file is written next to its destination and renamed into place, so
/// a failed write never leaves a truncated file at `path`.
pub fn write_wav(morse: &str, config: &AudioConfig, path: &Path) -> Result<()> {
    let wav = render_wav(morse, config)?;
    write_atomic(path, &wav)
}

/// Encode mono i16 PCM samples to a WAV byte buffer.
pub fn encode_wav(samples: &[i16], sample_rate: u32) -> Vec<u8> {
    let byte_rate = sample_rate * CHANNELS as u32 * (BITS_PER_SAMPLE as u32 / 8);
    let block_align = CHANNELS * (BITS_PER_SAMPLE / 8);
    let data_size = (samples.len() * 2) as u32;
    let file_size = 36 + data_size;

    let mut buf = Vec::with_capacity(HEADER_LEN + data_size as usize);

    // RIFF header
    buf.extend_from_slice(b"RIFF");
    buf.extend_from_slice(&file_size.to_le_bytes());
    buf.extend_from_slice(b"WAVE");

    // fmt chunk
    buf.extend_from_slice(b"fmt ");
    buf.extend_from_slice(&16u32.to_le_bytes()); // chunk size
    buf.extend_from_slice(&1u16.to_le_bytes()); // PCM format
    buf.extend_from_slice(&CHANNELS.to_le_bytes());
    buf.extend_from_slice(&sample_rate.to_le_bytes());
    buf.extend_from_slice(&byte_rate.to_le_bytes());
    buf.extend_from_slice(&block_align.to_le_bytes());
    buf.extend_from_slice(&BITS_PER_SAMPLE.to_le_bytes());

    // data chunk
    buf.extend_from_slice(b"data");
    buf.extend_from_slice(&data_size.to_le_bytes());
    for &sample in samples {
        buf.extend_from_slice(&sample.to_le_bytes());
    }

    buf
}

/// The fields of a canonical 44-byte PCM WAV header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavHeader {
    pub channels: u16,
    pub sample_rate: u32,
    pub bits_per_sample: u16,
    pub data_len: u32,
}

impl WavHeader {
    /// Read the header at the start of `bytes`. Returns `None` if it is not
    /// a canonical PCM RIFF/WAVE header.
    pub fn parse(bytes: &[u8]) -> Option<Self> {
        let h = bytes.get(..HEADER_LEN)?;
        let u16_at = |i: usize| u16::from_le_bytes([h[i], h[i + 1]]);
        let u32_at = |i: usize| u32::from_le_bytes([h[i], h[i + 1], h[i + 2], h[i + 3]]);

        if &h[0..4] != b"RIFF" || &h[8..12] != b"WAVE" || &h[12..16] != b"fmt " {
            return None;
        }
        if u32_at(16) != 16 || u16_at(20) != 1 || &h[36..40] != b"data" {
            return None;
        }
        Some(WavHeader {
            channels: u16_at(22),
            sample_rate: u32_at(24),
            bits_per_sample: u16_at(34),
            data_len: u32_at(40),
        })
    }

    pub fn frame_count(&self) -> u32 {
        let frame = self.channels as u32 * (self.bits_per_sample as u32 / 8);
        if frame == 0 { 0 } else { self.data_len / frame }
    }
}
