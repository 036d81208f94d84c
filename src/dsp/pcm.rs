//! Float → 16-bit PCM conversion with peak normalization.

/// Output level after normalization, as a fraction of full scale.
pub const HEADROOM: f64 = 0.8;

/// Normalize `samples` so the loudest one sits at `HEADROOM` of full scale,
/// then quantize to i16. An all-zero signal stays all zero.
pub fn to_pcm_i16(samples: &[f64]) -> Vec<i16> {
    if samples.is_empty() {
        return Vec::new();
    }
    let peak = samples.iter().fold(0.0_f64, |m, s| m.max(s.abs()));
    let peak = if peak == 0.0 { 1.0 } else { peak };
    samples
        .iter()
        .map(|&s| (s / peak * i16::MAX as f64 * HEADROOM).round() as i16)
        .collect()
}

/// Serialize PCM samples as little-endian bytes.
pub fn pcm_bytes(pcm: &[i16]) -> Vec<u8> {
    pcm.iter().flat_map(|s| s.to_le_bytes()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn max_out() -> i16 {
        (i16::MAX as f64 * HEADROOM).round() as i16
    }

    #[test]
    fn empty_input_gives_no_samples() {
        assert!(to_pcm_i16(&[]).is_empty());
        assert!(pcm_bytes(&[]).is_empty());
    }

    #[test]
    fn all_zero_stays_zero() {
        let pcm = to_pcm_i16(&[0.0; 100]);
        let bytes = pcm_bytes(&pcm);
        assert_eq!(bytes.len(), 200);
        assert!(bytes.iter().all(|&b| b == 0));
    }

    #[test]
    fn peak_is_normalized_to_headroom() {
        let pcm = to_pcm_i16(&[0.1, -0.25, 0.05]);
        assert_eq!(max_out(), 26214);
        assert_eq!(pcm[1], -26214);
        assert_eq!(pcm[0], 10485); // 0.4 * 26213.6
        assert!(pcm.iter().all(|s| s.unsigned_abs() <= max_out() as u16));
    }

    #[test]
    fn quiet_signal_is_boosted() {
        let pcm = to_pcm_i16(&[0.001, -0.0005]);
        assert_eq!(pcm[0], 26214);
        assert_eq!(pcm[1], -13107);
    }

    #[test]
    fn divides_by_peak_before_scaling() {
        let samples = [0.3, -0.7, 0.123456789, 0.5, -0.05, 0.699999];
        let pcm = to_pcm_i16(&samples);
        for (&s, &out) in samples.iter().zip(&pcm) {
            let expected = ((s / 0.7) * 32767.0 * 0.8).round() as i16;
            assert_eq!(out, expected, "sample {s}");
        }
    }

    #[test]
    fn bytes_are_little_endian() {
        assert_eq!(pcm_bytes(&[0x0102, -2]), vec![0x02, 0x01, 0xFE, 0xFF]);
    }
}
