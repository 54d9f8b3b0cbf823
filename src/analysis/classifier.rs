// SoundTypeClassifier - heuristic rule-based sound categorization
//
// A fixed, ordered decision procedure over loudness, dominant frequency,
// waveform transient-ness, and peak spectral magnitude. The first matching
// rule wins. Alongside the category it produces a confidence score, a
// display accent tag, a loudness-only distance estimate, and the alert and
// haptic cues the presentation layer should fire.

use super::types::{AccentTag, AlertKind, Distance, Effect, SoundType};

/// Transient rule: mean amplitude change must exceed this fraction of
/// (loudness / 100)
pub const TRANSIENT_THRESHOLD: f32 = 0.1;
/// Transient rule: dominant frequency floor (Hz)
pub const TRANSIENT_MIN_FREQUENCY_HZ: f32 = 1500.0;
/// Transient rule: loudness floor
pub const TRANSIENT_MIN_LOUDNESS: f32 = 30.0;

/// Voice rule: dominant frequency window (Hz, exclusive bounds)
pub const VOICE_MIN_FREQUENCY_HZ: f32 = 80.0;
pub const VOICE_MAX_FREQUENCY_HZ: f32 = 2800.0;
/// Voice rule: loudness floor
pub const VOICE_MIN_LOUDNESS: f32 = 15.0;
/// Voice loud enough to warrant an alert/haptic cue
pub const LOUD_VOICE_LOUDNESS: f32 = 50.0;

/// Tone rule: peak spectral magnitude floor (byte units)
pub const TONE_MIN_PEAK_MAGNITUDE: u8 = 120;
/// Tone rule: loudness floor
pub const TONE_MIN_LOUDNESS: f32 = 10.0;

/// Distance ladder thresholds (loudness units)
pub const VERY_CLOSE_LOUDNESS: f32 = 70.0;
pub const NEAR_LOUDNESS: f32 = 30.0;
pub const FAR_LOUDNESS: f32 = 5.0;

/// Classification of one block
#[derive(Debug, Clone)]
pub struct Classification {
    pub sound_type: SoundType,
    /// 0-100
    pub confidence: u8,
    pub accent: AccentTag,
    pub estimated_distance: Distance,
    /// Cues for the presentation layer; never executed here
    pub effects: Vec<Effect>,
}

/// Signal measurements consumed by the decision procedure
#[derive(Debug, Clone, Copy)]
pub struct ClassifierInputs {
    pub loudness: f32,
    pub dominant_frequency_hz: f32,
    /// Mean absolute sample-to-sample difference across the byte waveform
    pub transient_measure: f32,
    /// Strongest spectral bin magnitude (byte units)
    pub peak_magnitude: u8,
    pub sound_detected: bool,
}

pub struct SoundTypeClassifier;

impl SoundTypeClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Apply the ordered decision rules; the first match wins.
    ///
    /// The voice, tone, and ambient-fallback rules are siblings: a quiet
    /// tonal block is Tone even though it is not voice-like.
    pub fn classify(&self, inputs: &ClassifierInputs) -> Classification {
        let estimated_distance = Self::distance_for(inputs.loudness);

        if !inputs.sound_detected {
            return Classification {
                sound_type: SoundType::Ambient,
                confidence: 40,
                accent: AccentTag::Blue,
                estimated_distance,
                effects: Vec::new(),
            };
        }

        if inputs.transient_measure > TRANSIENT_THRESHOLD * (inputs.loudness / 100.0)
            && inputs.dominant_frequency_hz > TRANSIENT_MIN_FREQUENCY_HZ
            && inputs.loudness > TRANSIENT_MIN_LOUDNESS
        {
            return Classification {
                sound_type: SoundType::Transient,
                confidence: 85,
                accent: AccentTag::Red,
                estimated_distance,
                effects: vec![
                    Effect::Haptic {
                        pattern: vec![100, 50, 100],
                    },
                    Effect::Alert {
                        kind: AlertKind::SharpSound,
                    },
                ],
            };
        }

        if inputs.dominant_frequency_hz > VOICE_MIN_FREQUENCY_HZ
            && inputs.dominant_frequency_hz < VOICE_MAX_FREQUENCY_HZ
            && inputs.loudness > VOICE_MIN_LOUDNESS
        {
            let effects = if inputs.loudness > LOUD_VOICE_LOUDNESS {
                vec![
                    Effect::Haptic { pattern: vec![200] },
                    Effect::Alert {
                        kind: AlertKind::LoudVoice,
                    },
                ]
            } else {
                Vec::new()
            };
            return Classification {
                sound_type: SoundType::Voice,
                confidence: 75,
                accent: AccentTag::Yellow,
                estimated_distance,
                effects,
            };
        }

        if inputs.peak_magnitude > TONE_MIN_PEAK_MAGNITUDE && inputs.loudness > TONE_MIN_LOUDNESS {
            return Classification {
                sound_type: SoundType::Tone,
                confidence: 65,
                accent: AccentTag::Yellow,
                estimated_distance,
                effects: Vec::new(),
            };
        }

        Classification {
            sound_type: SoundType::Ambient,
            confidence: 50,
            accent: AccentTag::Blue,
            estimated_distance,
            effects: Vec::new(),
        }
    }

    /// Loudness-only distance ladder, independent of category
    fn distance_for(loudness: f32) -> Distance {
        if loudness > VERY_CLOSE_LOUDNESS {
            Distance::VeryClose
        } else if loudness > NEAR_LOUDNESS {
            Distance::Near
        } else if loudness > FAR_LOUDNESS {
            Distance::Far
        } else {
            Distance::NoSound
        }
    }
}

impl Default for SoundTypeClassifier {
    fn default() -> Self {
        Self::new()
    }
}

/// Mean absolute sample-to-sample difference across the byte waveform,
/// a cheap proxy for how percussive the block is.
pub fn transient_measure(waveform: &[u8]) -> f32 {
    if waveform.len() < 2 {
        return 0.0;
    }
    let total_change: f32 = waveform
        .windows(2)
        .map(|pair| (pair[1] as f32 - pair[0] as f32).abs())
        .sum();
    total_change / (waveform.len() - 1) as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs(
        loudness: f32,
        dominant_frequency_hz: f32,
        transient_measure: f32,
        peak_magnitude: u8,
    ) -> ClassifierInputs {
        ClassifierInputs {
            loudness,
            dominant_frequency_hz,
            transient_measure,
            peak_magnitude,
            sound_detected: loudness > 5.0,
        }
    }

    #[test]
    fn test_no_sound_is_ambient_40() {
        let classifier = SoundTypeClassifier::new();
        let result = classifier.classify(&inputs(0.0, 0.0, 0.0, 0));
        assert_eq!(result.sound_type, SoundType::Ambient);
        assert_eq!(result.confidence, 40);
        assert_eq!(result.accent, AccentTag::Blue);
        assert_eq!(result.estimated_distance, Distance::NoSound);
        assert!(result.effects.is_empty());
    }

    #[test]
    fn test_transient_scenario() {
        let classifier = SoundTypeClassifier::new();
        // loudness 35: transient ratio threshold is 0.1 * 0.35 = 0.035
        let result = classifier.classify(&inputs(35.0, 1800.0, 0.05, 200));
        assert_eq!(result.sound_type, SoundType::Transient);
        assert_eq!(result.confidence, 85);
        assert_eq!(result.accent, AccentTag::Red);
        assert!(result.effects.contains(&Effect::Haptic {
            pattern: vec![100, 50, 100]
        }));
        assert!(result.effects.contains(&Effect::Alert {
            kind: AlertKind::SharpSound
        }));
    }

    #[test]
    fn test_voice_rule() {
        let classifier = SoundTypeClassifier::new();
        let result = classifier.classify(&inputs(20.0, 400.0, 0.001, 200));
        assert_eq!(result.sound_type, SoundType::Voice);
        assert_eq!(result.confidence, 75);
        assert_eq!(result.accent, AccentTag::Yellow);
        assert!(result.effects.is_empty(), "quiet voice requests no cues");
    }

    #[test]
    fn test_loud_voice_requests_cues() {
        let classifier = SoundTypeClassifier::new();
        let result = classifier.classify(&inputs(60.0, 400.0, 0.001, 200));
        assert_eq!(result.sound_type, SoundType::Voice);
        assert!(result.effects.contains(&Effect::Haptic { pattern: vec![200] }));
        assert!(result.effects.contains(&Effect::Alert {
            kind: AlertKind::LoudVoice
        }));
    }

    #[test]
    fn test_tone_reachable_outside_voice_window() {
        // Dominant frequency outside 80..2800 but a strong spectral peak:
        // the tone rule fires as a sibling, not nested inside voice
        let classifier = SoundTypeClassifier::new();
        let result = classifier.classify(&inputs(12.0, 3500.0, 0.001, 180));
        assert_eq!(result.sound_type, SoundType::Tone);
        assert_eq!(result.confidence, 65);
        assert_eq!(result.accent, AccentTag::Yellow);
    }

    #[test]
    fn test_ambient_fallback_50() {
        let classifier = SoundTypeClassifier::new();
        let result = classifier.classify(&inputs(8.0, 3500.0, 0.001, 50));
        assert_eq!(result.sound_type, SoundType::Ambient);
        assert_eq!(result.confidence, 50);
    }

    #[test]
    fn test_distance_ladder() {
        let classifier = SoundTypeClassifier::new();
        let at = |loudness: f32| {
            classifier
                .classify(&inputs(loudness, 0.0, 0.0, 0))
                .estimated_distance
        };
        assert_eq!(at(80.0), Distance::VeryClose);
        assert_eq!(at(40.0), Distance::Near);
        assert_eq!(at(10.0), Distance::Far);
        assert_eq!(at(2.0), Distance::NoSound);
    }

    #[test]
    fn test_transient_precedes_voice() {
        // 1800 Hz is inside the voice window too; the transient rule is
        // checked first and wins
        let classifier = SoundTypeClassifier::new();
        let result = classifier.classify(&inputs(35.0, 1800.0, 0.05, 200));
        assert_eq!(result.sound_type, SoundType::Transient);
    }

    #[test]
    fn test_transient_measure_flat_vs_jumpy() {
        assert_eq!(transient_measure(&[128; 64]), 0.0);
        assert_eq!(transient_measure(&[]), 0.0);
        let jumpy: Vec<u8> = (0..64).map(|i| if i % 2 == 0 { 0 } else { 255 }).collect();
        assert!((transient_measure(&jumpy) - 255.0).abs() < f32::EPSILON);
    }
}
