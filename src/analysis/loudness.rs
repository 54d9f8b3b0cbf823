// LoudnessEstimator - display-scaled RMS loudness with sensitivity gain
//
// Computes normalized RMS over the byte-domain waveform (128 = silence),
// scales to display units, applies the sensitivity gain, and optionally
// hard-gates low-level ambient noise to zero.

use crate::config::ListenerSettings;

/// RMS-to-display scale factor (full-scale square wave ~= 200)
pub const RMS_DISPLAY_SCALE: f32 = 200.0;
/// Loudness below this is clamped to zero when ignoring ambient noise.
/// A hard gate: no hysteresis.
pub const AMBIENT_NOISE_FLOOR: f32 = 5.0;
/// Loudness above this marks the block as "sound detected"
pub const PRESENCE_THRESHOLD: f32 = 5.0;

pub struct LoudnessEstimator;

impl LoudnessEstimator {
    pub fn new() -> Self {
        Self
    }

    /// Measure display-scaled loudness for one block's waveform
    ///
    /// Each byte sample is normalized from 0..=255 (midpoint 128) into
    /// [-1, 1] before the RMS is taken. Returns 0.0 for an empty waveform.
    pub fn measure(&self, waveform: &[u8], settings: &ListenerSettings) -> f32 {
        if waveform.is_empty() {
            return 0.0;
        }

        let sum_of_squares: f32 = waveform
            .iter()
            .map(|&amplitude| {
                let normalized = (amplitude as f32 / 128.0) - 1.0;
                normalized * normalized
            })
            .sum();
        let rms = (sum_of_squares / waveform.len() as f32).sqrt();

        let mut loudness = rms * RMS_DISPLAY_SCALE;
        loudness *= settings.sensitivity * 2.0;

        if settings.ignore_ambient_noise && loudness < AMBIENT_NOISE_FLOOR {
            loudness = 0.0;
        }

        loudness
    }

    /// Whether a loudness value counts as sound presence
    pub fn is_sound_detected(&self, loudness: f32) -> bool {
        loudness > PRESENCE_THRESHOLD
    }
}

impl Default for LoudnessEstimator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_settings() -> ListenerSettings {
        ListenerSettings::default()
    }

    #[test]
    fn test_silence_is_zero() {
        let estimator = LoudnessEstimator::new();
        let silence = vec![128u8; 2048];
        let loudness = estimator.measure(&silence, &default_settings());
        assert_eq!(loudness, 0.0);
        assert!(!estimator.is_sound_detected(loudness));
    }

    #[test]
    fn test_empty_waveform_is_zero() {
        let estimator = LoudnessEstimator::new();
        assert_eq!(estimator.measure(&[], &default_settings()), 0.0);
    }

    #[test]
    fn test_full_scale_square_wave() {
        let estimator = LoudnessEstimator::new();
        // Alternating 0/255: |normalized| ~= 1.0 on every sample
        let wave: Vec<u8> = (0..2048).map(|i| if i % 2 == 0 { 0 } else { 255 }).collect();
        let loudness = estimator.measure(&wave, &default_settings());
        // RMS ~= 1.0, x200 display scale, x(2 * 0.5) sensitivity gain
        assert!(
            (loudness - RMS_DISPLAY_SCALE).abs() < 2.0,
            "expected ~{}, got {}",
            RMS_DISPLAY_SCALE,
            loudness
        );
        assert!(estimator.is_sound_detected(loudness));
    }

    #[test]
    fn test_sensitivity_scales_linearly() {
        let estimator = LoudnessEstimator::new();
        let wave: Vec<u8> = (0..2048).map(|i| if i % 2 == 0 { 96 } else { 160 }).collect();

        let mut half = default_settings();
        half.sensitivity = 0.5;
        let mut full = default_settings();
        full.sensitivity = 1.0;

        let at_half = estimator.measure(&wave, &half);
        let at_full = estimator.measure(&wave, &full);
        assert!((at_full - 2.0 * at_half).abs() < 1e-3);
    }

    #[test]
    fn test_ambient_gate_clamps_quiet_blocks() {
        let estimator = LoudnessEstimator::new();
        // Small wobble around the midpoint: audible but below the floor
        let wave: Vec<u8> = (0..2048).map(|i| if i % 2 == 0 { 126 } else { 130 }).collect();

        let mut gated = default_settings();
        gated.ignore_ambient_noise = true;
        let ungated = default_settings();

        assert!(estimator.measure(&wave, &ungated) > 0.0);
        assert_eq!(estimator.measure(&wave, &gated), 0.0);
    }

    #[test]
    fn test_ambient_gate_passes_loud_blocks() {
        let estimator = LoudnessEstimator::new();
        let wave: Vec<u8> = (0..2048).map(|i| if i % 2 == 0 { 64 } else { 192 }).collect();

        let mut gated = default_settings();
        gated.ignore_ambient_noise = true;

        let loudness = estimator.measure(&wave, &gated);
        assert!(loudness > AMBIENT_NOISE_FLOOR);
    }
}
