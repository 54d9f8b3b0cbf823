// PitchEstimator - autocorrelation fundamental-frequency estimation
//
// Classic normalized autocorrelation restricted to the vocal range, with
// parabolic interpolation around the winning lag for sub-sample accuracy.
// The direct double sum is quadratic in buffer length, but the vocal-range
// window bounds the number of lags examined, which keeps one 2048-sample
// block comfortably inside the real-time budget.
//
// Best-effort estimation: sensitive to harmonics, rejects noise-dominated
// blocks via the lag-0 self-similarity floor.

use super::types::VoiceRegister;

/// Minimum detectable fundamental (Hz) for human voice
pub const MIN_VOICE_HZ: f32 = 70.0;
/// Maximum detectable fundamental (Hz) for human voice
pub const MAX_VOICE_HZ: f32 = 600.0;
/// The winning lag's correlation must be at least this fraction of the
/// lag-0 autocorrelation, rejecting noise-dominated blocks.
pub const CORRELATION_FLOOR: f32 = 0.7;

/// Register bound: above this is high-pitched
const HIGH_REGISTER_HZ: f32 = 250.0;
/// Register bound: above this is mid-pitched
const MID_REGISTER_HZ: f32 = 120.0;

pub struct PitchEstimator;

impl PitchEstimator {
    pub fn new() -> Self {
        Self
    }

    /// Estimate the fundamental frequency of one channel's raw samples
    ///
    /// Returns `None` when the buffer is too short for the vocal-range lag
    /// window or when no lag clears the self-similarity floor.
    pub fn estimate(&self, samples: &[f32], sample_rate: u32) -> Option<f32> {
        let min_period = (sample_rate as f32 / MAX_VOICE_HZ) as usize;
        let max_period = (sample_rate as f32 / MIN_VOICE_HZ) as usize;
        if min_period == 0 || samples.len() <= min_period + 1 {
            return None;
        }

        let zero_lag = autocorrelation(samples, 0);
        if zero_lag <= 0.0 {
            return None;
        }

        // Correlations for the search window plus one lag of margin on each
        // side for the parabolic refinement
        let lag_lo = min_period.saturating_sub(1).max(1);
        let lag_hi = (max_period + 1).min(samples.len() - 1);
        let correlations: Vec<f32> = (lag_lo..=lag_hi)
            .map(|lag| autocorrelation(samples, lag))
            .collect();
        let at = |lag: usize| -> f32 {
            if (lag_lo..=lag_hi).contains(&lag) {
                correlations[lag - lag_lo]
            } else {
                0.0
            }
        };

        let mut best_period = 0usize;
        let mut max_correlation = f32::MIN;
        for lag in min_period..=max_period.min(samples.len() - 1) {
            let corr = at(lag);
            if corr > max_correlation {
                max_correlation = corr;
                best_period = lag;
            }
        }

        if best_period == 0 || max_correlation <= zero_lag * CORRELATION_FLOOR {
            return None;
        }

        // Parabolic interpolation around the peak; falls back to the
        // unrefined estimate when the denominator vanishes
        let s0 = at(best_period - 1);
        let s1 = max_correlation;
        let s2 = at(best_period + 1);
        let denom = s0 - 2.0 * s1 + s2;
        if denom != 0.0 {
            let delta = (s0 - s2) / (2.0 * denom);
            Some(sample_rate as f32 / (best_period as f32 + delta))
        } else {
            Some(sample_rate as f32 / best_period as f32)
        }
    }
}

impl Default for PitchEstimator {
    fn default() -> Self {
        Self::new()
    }
}

/// Direct-sum autocorrelation at one lag
fn autocorrelation(samples: &[f32], lag: usize) -> f32 {
    samples[..samples.len() - lag]
        .iter()
        .zip(&samples[lag..])
        .map(|(&a, &b)| a * b)
        .sum()
}

/// Map an accepted pitch onto a coarse vocal register.
///
/// Bounds are fixed and approximate; they say nothing definitive about the
/// speaker.
pub fn voice_register(pitch_hz: f32) -> VoiceRegister {
    if pitch_hz > HIGH_REGISTER_HZ {
        VoiceRegister::HighPitched
    } else if pitch_hz > MID_REGISTER_HZ {
        VoiceRegister::MidPitched
    } else if pitch_hz > MIN_VOICE_HZ {
        VoiceRegister::LowPitched
    } else {
        VoiceRegister::Undetermined
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: u32 = 44100;
    const BLOCK: usize = 2048;

    fn sine_wave(frequency: f32, amplitude: f32, len: usize) -> Vec<f32> {
        (0..len)
            .map(|i| {
                let t = i as f32 / SAMPLE_RATE as f32;
                amplitude * (2.0 * std::f32::consts::PI * frequency * t).sin()
            })
            .collect()
    }

    #[test]
    fn test_sine_150hz_within_2hz() {
        let estimator = PitchEstimator::new();
        let signal = sine_wave(150.0, 0.8, BLOCK);
        let pitch = estimator
            .estimate(&signal, SAMPLE_RATE)
            .expect("150 Hz sine should yield a pitch");
        assert!(
            (pitch - 150.0).abs() < 2.0,
            "expected ~150 Hz, got {} Hz",
            pitch
        );
    }

    #[test]
    fn test_sine_300hz_tracked() {
        let estimator = PitchEstimator::new();
        let signal = sine_wave(300.0, 0.5, BLOCK);
        let pitch = estimator.estimate(&signal, SAMPLE_RATE).unwrap();
        assert!((pitch - 300.0).abs() < 4.0, "got {} Hz", pitch);
    }

    #[test]
    fn test_silence_yields_none() {
        let estimator = PitchEstimator::new();
        assert_eq!(estimator.estimate(&vec![0.0; BLOCK], SAMPLE_RATE), None);
    }

    #[test]
    fn test_noise_rejected_by_floor() {
        use rand::{Rng, SeedableRng};
        let mut rng = rand::rngs::StdRng::seed_from_u64(0xec40);
        let estimator = PitchEstimator::new();

        for _ in 0..5 {
            let noise: Vec<f32> = (0..BLOCK).map(|_| rng.gen_range(-1.0..1.0)).collect();
            assert_eq!(
                estimator.estimate(&noise, SAMPLE_RATE),
                None,
                "uniform noise should not clear the correlation floor"
            );
        }
    }

    #[test]
    fn test_buffer_shorter_than_lag_window() {
        let estimator = PitchEstimator::new();
        let tiny = sine_wave(150.0, 0.8, 32);
        assert_eq!(estimator.estimate(&tiny, SAMPLE_RATE), None);
    }

    #[test]
    fn test_register_bounds() {
        assert_eq!(voice_register(300.0), VoiceRegister::HighPitched);
        assert_eq!(voice_register(180.0), VoiceRegister::MidPitched);
        assert_eq!(voice_register(90.0), VoiceRegister::LowPitched);
        assert_eq!(voice_register(50.0), VoiceRegister::Undetermined);
    }
}
