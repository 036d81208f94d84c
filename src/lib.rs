pub mod config;
pub mod dsp;
pub mod error;
pub mod morse;
#[cfg(all(feature = "playback", not(target_arch = "wasm32")))]
pub mod playback;

use std::path::Path;

use crate::config::AudioConfig;
use crate::dsp::timing::TimingProfile;
use crate::error::Result;
use wasm_bindgen::prelude::*;

pub use crate::error::MorseError;

/// The crate version, read from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// WASM-exposed: return the morsewave-core version string.
#[wasm_bindgen]
pub fn core_version() -> String {
    VERSION.to_string()
}

/// WASM-exposed: convert text to Morse code. Unknown characters are dropped.
#[wasm_bindgen]
pub fn encode_text(text: &str) -> String {
    morse::encode(text)
}

/// WASM-exposed: convert Morse code to text. Unknown patterns become `?`.
#[wasm_bindgen]
pub fn decode_morse(morse: &str) -> String {
    morse::decode(morse)
}

/// Render Morse code to a complete WAV file in memory.
pub fn render_container(morse: &str, config: &AudioConfig) -> Result<Vec<u8>> {
    dsp::renderer::render_wav(morse, config)
}

/// Render Morse code and write it as a WAV file at `path`.
pub fn write_container(morse: &str, config: &AudioConfig, path: &Path) -> Result<()> {
    dsp::renderer::write_wav(morse, config, path)
}

/// WASM-exposed: render Morse code to a WAV byte array.
#[wasm_bindgen]
pub fn render_wav(
    morse: &str,
    frequency_hz: f64,
    wpm: u32,
    sample_rate: u32,
) -> std::result::Result<Vec<u8>, JsValue> {
    let config = AudioConfig::new(frequency_hz, wpm, sample_rate);
    render_container(morse, &config).map_err(|e| JsValue::from_str(&e.report(morse)))
}

/// WASM-exposed: element and gap durations for a speed, as a JS object.
#[wasm_bindgen]
pub fn timing_profile(wpm: u32) -> std::result::Result<JsValue, JsValue> {
    let profile = TimingProfile::from_wpm(wpm).map_err(|e| JsValue::from_str(&format!("{e}")))?;
    serde_wasm_bindgen::to_value(&profile).map_err(|e| JsValue::from_str(&format!("{e}")))
}

#[cfg(all(feature = "playback", not(target_arch = "wasm32")))]
static DISPATCHER: std::sync::OnceLock<Option<playback::PlaybackDispatcher>> =
    std::sync::OnceLock::new();

/// The process-wide dispatcher, built on first use.
///
/// If the detected sink cannot be set up, clips are saved to the cache
/// file instead. Only a failure to start the executor itself is an error.
#[cfg(all(feature = "playback", not(target_arch = "wasm32")))]
pub fn playback_dispatcher() -> Result<&'static playback::PlaybackDispatcher> {
    DISPATCHER
        .get_or_init(|| {
            playback::PlaybackDispatcher::detect()
                .or_else(|e| {
                    log::warn!("falling back to file output: {e}");
                    playback::PlaybackDispatcher::new(
                        Box::new(playback::FileSink),
                        playback::dispatcher::default_temp_path(),
                    )
                })
                .map_err(|e| log::error!("playback unavailable: {e}"))
                .ok()
        })
        .as_ref()
        .ok_or_else(|| MorseError::Playback("playback dispatcher unavailable".to_string()))
}

/// Play Morse code in the background through the process-wide dispatcher.
///
/// Returns at once. Fails without calling `on_done` if the input is blank
/// or another playback is still running; otherwise `on_done` is called
/// exactly once when playback ends.
#[cfg(all(feature = "playback", not(target_arch = "wasm32")))]
pub fn start_playback<F>(
    morse: &str,
    config: AudioConfig,
    on_done: F,
) -> Result<playback::PlaybackHandle>
where
    F: FnOnce(Result<playback::PlaybackOutcome>) + Send + 'static,
{
    playback_dispatcher()?.start(morse, config, on_done)
}
