// Types module - Data structures produced by the per-block analysis pipeline

use serde::{Deserialize, Serialize};
use std::time::SystemTime;

/// Dominant-band classification of a block's spectrum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FrequencyRange {
    /// Most energy below 500 Hz
    Low,
    /// Most energy in 500-2000 Hz
    Mid,
    /// Most energy in 2000-6000 Hz
    High,
    /// No measurable band energy
    Unknown,
}

/// Heuristic sound-category label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SoundType {
    /// Background / noise-like
    Ambient,
    /// Clap / bang-like percussive sound
    Transient,
    /// Voice-like sound
    Voice,
    /// Instrument / tone-like sound
    Tone,
}

impl SoundType {
    /// Human-readable label matching the timeline display
    pub fn label(&self) -> &'static str {
        match self {
            SoundType::Ambient => "Ambient / Noise-like",
            SoundType::Transient => "Clap / Bang-like",
            SoundType::Voice => "Voice-like",
            SoundType::Tone => "Instrument / Tone-like",
        }
    }
}

/// Coarse distance estimate derived purely from loudness
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Distance {
    VeryClose,
    Near,
    Far,
    NoSound,
}

/// Stereo direction label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Left,
    Right,
    Center,
    /// Fewer than two channels, or no channel energy
    Unavailable,
}

/// Approximate vocal register for an accepted pitch estimate
///
/// The 250/120/70 Hz bounds are coarse and deliberately not
/// gender- or age-deterministic; callers must not over-interpret them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VoiceRegister {
    /// Above 250 Hz
    HighPitched,
    /// Above 120 Hz
    MidPitched,
    /// Above 70 Hz
    LowPitched,
    /// Voice-like block but no reliable pitch
    Undetermined,
    /// Block was not voice-like
    NotApplicable,
}

/// Display accent tag for the current classification
///
/// Voice and Tone share the warm accent; Transient gets its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccentTag {
    /// Ambient blue
    Blue,
    /// Transient red
    Red,
    /// Voice/tone yellow
    Yellow,
}

/// Alert cue kinds requested by the classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlertKind {
    /// Short flash for clap/bang-like sounds
    SharpSound,
    /// Flash for loud voice-like sounds
    LoudVoice,
}

/// Side effect requested by classification, executed by the presentation
/// layer. The pipeline itself never performs these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Effect {
    Alert { kind: AlertKind },
    /// Vibration pattern in milliseconds (pulse, pause, pulse, ...)
    Haptic { pattern: Vec<u64> },
}

/// Peak-hold state carried across blocks
///
/// Values snap up to new maxima instantly and decay multiplicatively
/// otherwise. Owned by the pipeline instance; reset only on restart.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunningPeaks {
    pub loudness: f32,
    pub dominant_hz: f32,
}

/// Loudness peak decay factor per block
pub const PEAK_LOUDNESS_DECAY: f32 = 0.98;
/// Dominant-frequency peak decay factor per block (slower than loudness)
pub const PEAK_FREQUENCY_DECAY: f32 = 0.99;

impl RunningPeaks {
    /// Fold a block's loudness into the peak and return the held value
    pub fn observe_loudness(&mut self, loudness: f32) -> f32 {
        if loudness > self.loudness {
            self.loudness = loudness;
        } else {
            self.loudness *= PEAK_LOUDNESS_DECAY;
        }
        self.loudness
    }

    /// Fold a block's dominant frequency into the peak and return the held value
    pub fn observe_dominant_hz(&mut self, dominant_hz: f32) -> f32 {
        if dominant_hz > self.dominant_hz {
            self.dominant_hz = dominant_hz;
        } else {
            self.dominant_hz *= PEAK_FREQUENCY_DECAY;
        }
        self.dominant_hz
    }
}

/// Per-block analysis output
///
/// Immutable once produced; consumed by display surfaces and the event gate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Display-scaled RMS loudness (>= 0)
    pub loudness: f32,
    /// Peak-held loudness
    pub peak_loudness: f32,
    /// Dominant frequency in Hz (0 if nothing in the 20 Hz..Nyquist window)
    pub dominant_frequency_hz: f32,
    /// Peak-held dominant frequency in Hz
    pub peak_dominant_frequency_hz: f32,
    pub frequency_range: FrequencyRange,
    pub sound_type: SoundType,
    /// Classification confidence, 0-100
    pub confidence: u8,
    pub accent: AccentTag,
    pub estimated_distance: Distance,
    pub direction: Direction,
    /// Estimated fundamental frequency in Hz; 0 when undetermined
    pub estimated_pitch_hz: f32,
    pub voice_register: VoiceRegister,
    /// Loudness above the presence threshold
    pub sound_detected: bool,
}

/// Durable record of a reportable sound event
///
/// Two events from the same pipeline instance are never closer together
/// than the event gate's cooldown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoundEvent {
    pub timestamp: SystemTime,
    pub sound_type: SoundType,
    pub frequency_hz: f32,
}

/// Broadcast payload for one processed block: the analysis result plus the
/// side effects the presentation layer should execute for it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisUpdate {
    pub result: AnalysisResult,
    pub effects: Vec<Effect>,
}
