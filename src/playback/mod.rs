//! Background playback of rendered Morse audio.

#[cfg(feature = "cpal")]
pub mod cpal_sink;
pub mod dispatcher;
pub mod sink;

pub use dispatcher::{PlaybackDispatcher, PlaybackHandle, SessionState};
pub use sink::{AudioSink, Clip, CommandSink, FileSink, PlaybackOutcome};
