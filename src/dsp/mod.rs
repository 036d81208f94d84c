//! DSP — CW tone synthesis and offline WAV rendering.
//!
//! Everything here is pure and synchronous: the same inputs always render
//! the same samples, on any platform, WASM included.

pub mod envelope;
pub mod pcm;
pub mod renderer;
pub mod synth;
pub mod timing;
