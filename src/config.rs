//! Audio parameters and the persisted user settings they are built from.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{MorseError, Result};

pub const DEFAULT_FREQUENCY_HZ: f64 = 700.0;
pub const DEFAULT_WPM: u32 = 20;
pub const DEFAULT_SAMPLE_RATE_HZ: u32 = 44_100;

/// Tone range offered to users (Hz).
pub const MIN_FREQUENCY_HZ: f64 = 300.0;
pub const MAX_FREQUENCY_HZ: f64 = 1200.0;
/// Speed range offered to users (words per minute).
pub const MIN_WPM: u32 = 5;
pub const MAX_WPM: u32 = 40;

/// Parameters for turning Morse code into sound.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioConfig {
    /// Tone pitch in Hz.
    pub frequency_hz: f64,
    /// Sending speed, calibrated against "PARIS".
    pub wpm: u32,
    /// Output sample rate in Hz.
    pub sample_rate_hz: u32,
}

impl Default for AudioConfig {
    fn default() -> Self {
        AudioConfig {
            frequency_hz: DEFAULT_FREQUENCY_HZ,
            wpm: DEFAULT_WPM,
            sample_rate_hz: DEFAULT_SAMPLE_RATE_HZ,
        }
    }
}

impl AudioConfig {
    pub fn new(frequency_hz: f64, wpm: u32, sample_rate_hz: u32) -> Self {
        AudioConfig {
            frequency_hz,
            wpm,
            sample_rate_hz,
        }
    }

    /// Check that every parameter is usable for synthesis.
    pub fn validate(&self) -> Result<()> {
        if !self.frequency_hz.is_finite() || self.frequency_hz <= 0.0 {
            return Err(MorseError::InvalidConfig(format!(
                "frequency must be a positive number of Hz, got {}",
                self.frequency_hz
            )));
        }
        if self.wpm == 0 {
            return Err(MorseError::InvalidWpm(self.wpm));
        }
        if self.sample_rate_hz == 0 {
            return Err(MorseError::InvalidConfig(
                "sample rate must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Pull frequency and speed into the ranges a user can select.
    /// The sample rate is left alone.
    pub fn clamped(&self) -> Self {
        let frequency_hz = if self.frequency_hz.is_nan() {
            DEFAULT_FREQUENCY_HZ
        } else {
            self.frequency_hz.clamp(MIN_FREQUENCY_HZ, MAX_FREQUENCY_HZ)
        };
        AudioConfig {
            frequency_hz,
            wpm: self.wpm.clamp(MIN_WPM, MAX_WPM),
            sample_rate_hz: self.sample_rate_hz,
        }
    }
}

// ── Persisted settings ──────────────────────────────────────

/// User settings as stored on disk.
///
/// Only the Morse keys are interpreted here. Every other key in the file
/// (window layout, fonts, colours…) belongs to the front end and is carried
/// through `extra` untouched, so saving never drops it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_frequency")]
    pub morse_frequency: f64,
    #[serde(default = "default_wpm")]
    pub morse_wpm: u32,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

fn default_frequency() -> f64 {
    DEFAULT_FREQUENCY_HZ
}

fn default_wpm() -> u32 {
    DEFAULT_WPM
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            morse_frequency: DEFAULT_FREQUENCY_HZ,
            morse_wpm: DEFAULT_WPM,
            extra: serde_json::Map::new(),
        }
    }
}

impl Settings {
    /// Load settings from `path`. A missing file yields defaults; a file
    /// that exists but cannot be read or parsed is an error.
    pub fn load(path: &Path) -> Result<Self> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Settings::default()),
            Err(e) => return Err(MorseError::io(path, e)),
        };
        Ok(serde_json::from_str(&text)?)
    }

    /// Write settings to `path` atomically.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_vec_pretty(self)?;
        write_atomic(path, &json)
    }

    /// The audio parameters these settings select, clamped to the user ranges.
    pub fn audio_config(&self, sample_rate_hz: u32) -> AudioConfig {
        AudioConfig::new(self.morse_frequency, self.morse_wpm, sample_rate_hz).clamped()
    }

    /// Store (clamped) tone and speed back into the settings.
    pub fn set_audio(&mut self, config: &AudioConfig) {
        let clamped = config.clamped();
        self.morse_frequency = clamped.frequency_hz;
        self.morse_wpm = clamped.wpm;
    }

    /// Per-user settings file location.
    pub fn default_path() -> Option<std::path::PathBuf> {
        directories::ProjectDirs::from("net", "MorseWave", "morsewave")
            .map(|dirs| dirs.config_dir().join("settings.json"))
    }
}

/// Write `bytes` to a sibling temp file, then rename it over `path`.
/// On failure the destination is left as it was.
pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| MorseError::io(dir, e))?;
    tmp.write_all(bytes).map_err(|e| MorseError::io(tmp.path(), e))?;
    tmp.as_file().sync_all().map_err(|e| MorseError::io(tmp.path(), e))?;
    tmp.persist(path).map_err(|e| MorseError::io(path, e.error))?;
    Ok(())
}
