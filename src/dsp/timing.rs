//! Element timing derived from a words-per-minute rate.

use serde::Serialize;

use crate::error::{MorseError, Result};

/// Length of one dit at 1 WPM, in seconds. "PARIS" is 50 dits long, so
/// one word per minute is 50 dits in 60 s.
pub const DIT_SECONDS_AT_1_WPM: f64 = 1.2;

/// Durations (seconds) of every Morse element and gap at one speed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimingProfile {
    pub dit_s: f64,
    pub dah_s: f64,
    /// Silence between the elements of one letter.
    pub element_gap_s: f64,
    pub letter_gap_s: f64,
    pub word_gap_s: f64,
}

impl TimingProfile {
    /// Fails only for `wpm == 0`. Range clamping is the caller's job.
    pub fn from_wpm(wpm: u32) -> Result<Self> {
        if wpm == 0 {
            return Err(MorseError::InvalidWpm(wpm));
        }
        let dit = DIT_SECONDS_AT_1_WPM / wpm as f64;
        Ok(TimingProfile {
            dit_s: dit,
            dah_s: 3.0 * dit,
            element_gap_s: dit,
            letter_gap_s: 3.0 * dit,
            word_gap_s: 7.0 * dit,
        })
    }
}

/// Number of samples covering `duration_s` at `sample_rate`, rounded to nearest.
pub fn samples_for(duration_s: f64, sample_rate: u32) -> usize {
    (sample_rate as f64 * duration_s).round() as usize
}
