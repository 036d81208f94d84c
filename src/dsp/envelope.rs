//! Linear fade envelope for keyed tones.

/// Fade-in and fade-out length (seconds).
pub const FADE_SECONDS: f64 = 0.005;

/// Trapezoid envelope over one tone: a linear ramp 0 → 1 over the first
/// `fade` seconds, a hold at 1, and a linear ramp 1 → 0 ending at
/// `duration`. Tones shorter than two fades get a triangle (the lower of
/// the two ramps).
#[derive(Debug, Clone, Copy)]
pub struct FadeEnvelope {
    pub duration: f64,
    pub fade: f64,
}

impl FadeEnvelope {
    pub fn new(duration: f64) -> Self {
        FadeEnvelope {
            duration,
            fade: FADE_SECONDS,
        }
    }

    /// Envelope level at time `t` seconds into the tone, always in [0, 1].
    pub fn level(&self, t: f64) -> f64 {
        if self.fade <= 0.0 {
            return 1.0;
        }
        let rise = t / self.fade;
        let fall = (self.duration - t) / self.fade;
        rise.min(fall).clamp(0.0, 1.0)
    }
}
