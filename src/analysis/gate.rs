// EventGate - debounce for reportable sound events
//
// A pure debounce: a detection either passes the gate and becomes a
// SoundEvent, or it is dropped. Suppressed detections are never queued or
// replayed later.

use std::time::{Duration, Instant, SystemTime};

use super::types::{AnalysisResult, SoundEvent};

/// Minimum interval between two emitted events
pub const EVENT_COOLDOWN: Duration = Duration::from_millis(2000);
/// Loudness floor for an event to be worth recording
pub const EVENT_MIN_LOUDNESS: f32 = 10.0;

pub struct EventGate {
    cooldown: Duration,
    last_emission: Option<Instant>,
}

impl EventGate {
    pub fn new() -> Self {
        Self::with_cooldown(EVENT_COOLDOWN)
    }

    pub fn with_cooldown(cooldown: Duration) -> Self {
        Self {
            cooldown,
            last_emission: None,
        }
    }

    /// Offer one block's analysis; returns an event iff sound is detected,
    /// loud enough, and the cooldown since the last emission has elapsed.
    pub fn offer(&mut self, result: &AnalysisResult, now: Instant) -> Option<SoundEvent> {
        if !result.sound_detected || result.loudness <= EVENT_MIN_LOUDNESS {
            return None;
        }

        if let Some(last) = self.last_emission {
            if now.saturating_duration_since(last) <= self.cooldown {
                return None;
            }
        }

        self.last_emission = Some(now);
        Some(SoundEvent {
            timestamp: SystemTime::now(),
            sound_type: result.sound_type,
            frequency_hz: result.dominant_frequency_hz,
        })
    }
}

impl Default for EventGate {
    fn default() -> Self {
        Self::new()
    }
}
