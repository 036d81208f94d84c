//! Audio sinks: where a rendered clip goes to be heard.
//!
//! Sinks are tried in a fixed order (sound card, command-line player,
//! file) and the first one that is usable is handed to the dispatcher.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use log::{debug, warn};

use crate::config::write_atomic;
use crate::dsp::renderer::encode_wav;
use crate::error::{MorseError, Result};

/// A rendered, normalized mono clip ready for output.
#[derive(Debug, Clone)]
pub struct Clip {
    pub pcm: Vec<i16>,
    pub sample_rate: u32,
}

impl Clip {
    /// The clip as a complete WAV file.
    pub fn wav(&self) -> Vec<u8> {
        encode_wav(&self.pcm, self.sample_rate)
    }

    pub fn duration_secs(&self) -> f64 {
        self.pcm.len() as f64 / self.sample_rate as f64
    }
}

/// How a playback session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackOutcome {
    /// The clip was played to the end.
    Played,
    /// Nothing could play it; the WAV file was left at this path instead.
    SavedTo(PathBuf),
}

/// Something that can make a clip audible. `play` blocks until output
/// has finished.
pub trait AudioSink: Send + Sync {
    fn name(&self) -> &str;

    /// Whether the sink can be used on this machine right now.
    fn is_available(&self) -> bool {
        true
    }

    /// Play `clip`. Sinks that need a file on disk use `temp_path`.
    fn play(&self, clip: &Clip, temp_path: &Path) -> Result<PlaybackOutcome>;
}

/// Write `clip` to `path`, creating the parent directory if needed.
fn write_clip(clip: &Clip, path: &Path) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).map_err(|e| MorseError::io(dir, e))?;
    }
    write_atomic(path, &clip.wav())
}

// ── File fallback ───────────────────────────────────────────

/// Last resort: save the clip and report where it went.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileSink;

impl AudioSink for FileSink {
    fn name(&self) -> &str {
        "file"
    }

    fn play(&self, clip: &Clip, temp_path: &Path) -> Result<PlaybackOutcome> {
        write_clip(clip, temp_path)?;
        Ok(PlaybackOutcome::SavedTo(temp_path.to_path_buf()))
    }
}

// ── External player ─────────────────────────────────────────

/// Players tried in order, with the arguments placed before the file name.
const PLAYERS: &[(&str, &[&str])] = &[("aplay", &["-q"]), ("paplay", &[]), ("afplay", &[])];

/// Plays the clip through a command-line player found on `PATH`.
#[derive(Debug, Clone)]
pub struct CommandSink {
    program: PathBuf,
    args: Vec<String>,
}

impl CommandSink {
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>) -> Self {
        CommandSink {
            program: program.into(),
            args,
        }
    }

    /// The first known player installed on this machine.
    pub fn find() -> Option<Self> {
        PLAYERS.iter().find_map(|(name, args)| {
            let program = which::which(name).ok()?;
            Some(CommandSink::new(
                program,
                args.iter().map(|a| a.to_string()).collect(),
            ))
        })
    }
}

impl AudioSink for CommandSink {
    fn name(&self) -> &str {
        self.program
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("command")
    }

    fn play(&self, clip: &Clip, temp_path: &Path) -> Result<PlaybackOutcome> {
        write_clip(clip, temp_path)?;
        let status = Command::new(&self.program)
            .args(&self.args)
            .arg(temp_path)
            .status();

        if let Err(e) = fs::remove_file(temp_path) {
            debug!("could not remove {}: {e}", temp_path.display());
        }

        match status {
            Ok(s) if s.success() => Ok(PlaybackOutcome::Played),
            Ok(s) => Err(MorseError::Playback(format!("{} exited with {s}", self.name()))),
            Err(e) => Err(MorseError::Playback(format!(
                "could not run {}: {e}",
                self.program.display()
            ))),
        }
    }
}

// ── Selection ───────────────────────────────────────────────

/// All sinks this build knows about, most preferred first.
pub fn default_chain() -> Vec<Box<dyn AudioSink>> {
    let mut chain: Vec<Box<dyn AudioSink>> = Vec::new();
    #[cfg(feature = "cpal")]
    chain.push(Box::new(super::cpal_sink::CpalSink));
    if let Some(player) = CommandSink::find() {
        chain.push(Box::new(player));
    }
    chain.push(Box::new(FileSink));
    chain
}

/// Pick the first available sink, falling back to [`FileSink`].
pub fn select_sink(chain: Vec<Box<dyn AudioSink>>) -> Box<dyn AudioSink> {
    for sink in chain {
        if sink.is_available() {
            debug!("using audio sink '{}'", sink.name());
            return sink;
        }
        warn!("audio sink '{}' is unavailable, trying the next one", sink.name());
    }
    Box::new(FileSink)
}
