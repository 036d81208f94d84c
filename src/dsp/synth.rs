//! Morse → waveform synthesis.
//!
//! The Morse string is scanned left to right and turned into a list of
//! tone and silence segments, which are then rendered back to back.

use std::f64::consts::PI;

use super::envelope::FadeEnvelope;
use super::timing::{TimingProfile, samples_for};
use crate::config::AudioConfig;
use crate::error::{MorseError, Result};

/// One keyed-on or keyed-off stretch of the signal, in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Segment {
    Tone(f64),
    Silence(f64),
}

impl Segment {
    pub fn duration(&self) -> f64 {
        match *self {
            Segment::Tone(d) | Segment::Silence(d) => d,
        }
    }
}

/// Renders Morse strings as a mono sine-tone signal.
#[derive(Debug, Clone)]
pub struct Synthesizer {
    config: AudioConfig,
    timing: TimingProfile,
}

impl Synthesizer {
    pub fn new(config: AudioConfig) -> Result<Self> {
        config.validate()?;
        let timing = TimingProfile::from_wpm(config.wpm)?;
        Ok(Synthesizer { config, timing })
    }

    pub fn config(&self) -> &AudioConfig {
        &self.config
    }

    pub fn timing(&self) -> &TimingProfile {
        &self.timing
    }

    /// Break a Morse string into segments.
    ///
    /// An element gap follows a dot or dash only when the very next
    /// character is another dot or dash. A space starting ` / ` is a word
    /// gap and consumes the whole separator; any other space is a letter
    /// gap. A stray `/` produces nothing.
    pub fn segments(&self, morse: &str) -> Result<Vec<Segment>> {
        let chars: Vec<char> = morse.chars().collect();
        let t = &self.timing;
        let mut segments = Vec::new();

        let mut i = 0;
        while i < chars.len() {
            match chars[i] {
                sym @ ('.' | '-') => {
                    let len = if sym == '.' { t.dit_s } else { t.dah_s };
                    segments.push(Segment::Tone(len));
                    if matches!(chars.get(i + 1), Some('.' | '-')) {
                        segments.push(Segment::Silence(t.element_gap_s));
                    }
                }
                ' ' => {
                    if chars[i..].starts_with(&[' ', '/', ' ']) {
                        segments.push(Segment::Silence(t.word_gap_s));
                        i += 2;
                    } else {
                        segments.push(Segment::Silence(t.letter_gap_s));
                    }
                }
                '/' => {}
                ch => return Err(MorseError::MalformedMorse { ch, pos: i }),
            }
            i += 1;
        }

        Ok(segments)
    }

    /// Render `morse` to samples in [-1, 1].
    pub fn render(&self, morse: &str) -> Result<Vec<f64>> {
        let segments = self.segments(morse)?;
        let total = segments.iter().map(|s| self.segment_len(s)).sum();
        let mut out = Vec::with_capacity(total);
        for segment in &segments {
            match *segment {
                Segment::Tone(d) => self.push_tone(&mut out, d),
                Segment::Silence(_) => {
                    let n = self.segment_len(segment);
                    out.resize(out.len() + n, 0.0);
                }
            }
        }
        Ok(out)
    }

    /// Number of samples `render` would produce, without rendering.
    pub fn sample_count(&self, morse: &str) -> Result<usize> {
        let segments = self.segments(morse)?;
        Ok(segments.iter().map(|s| self.segment_len(s)).sum())
    }

    /// Playing time of `morse` in seconds.
    pub fn duration_secs(&self, morse: &str) -> Result<f64> {
        Ok(self.sample_count(morse)? as f64 / self.config.sample_rate_hz as f64)
    }

    fn segment_len(&self, segment: &Segment) -> usize {
        samples_for(segment.duration(), self.config.sample_rate_hz)
    }

    fn push_tone(&self, out: &mut Vec<f64>, duration: f64) {
        let sr = self.config.sample_rate_hz as f64;
        let n = samples_for(duration, self.config.sample_rate_hz);
        let env = FadeEnvelope::new(duration);
        let w = 2.0 * PI * self.config.frequency_hz;
        out.extend((0..n).map(|i| {
            let t = i as f64 / sr;
            env.level(t) * (w * t).sin()
        }));
    }
}
