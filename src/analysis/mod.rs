// Analysis module - per-block sound analysis and classification pipeline
//
// This module orchestrates the complete analysis pipeline, processing audio
// blocks from the capture thread and generating semantic descriptors for
// display surfaces and the event timeline.
//
// Architecture:
// - AnalysisPipeline: one synchronous pass per block,
//   {Loudness, Spectrum, Direction} -> SoundTypeClassifier -> Pitch -> EventGate
// - AnalysisWorker: thread loop that consumes capture buffers, assembles
//   blocks, runs the pipeline, and publishes results via tokio channels

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use std::thread::{self, JoinHandle};
use std::time::Instant;

use rtrb::PopError;
use tokio::sync::{broadcast, mpsc};

use crate::audio::buffer_pool::AnalysisThreadChannels;
use crate::audio::frame::{AudioBlock, FrameSource};
use crate::config::ListenerSettings;

pub mod classifier;
pub mod direction;
pub mod gate;
pub mod loudness;
pub mod pitch;
pub mod spectrum;
pub mod types;

pub use types::{
    AccentTag, AlertKind, AnalysisResult, AnalysisUpdate, Direction, Distance, Effect,
    FrequencyRange, RunningPeaks, SoundEvent, SoundType, VoiceRegister,
};

use classifier::{transient_measure, ClassifierInputs, SoundTypeClassifier};
use direction::DirectionEstimator;
use gate::EventGate;
use loudness::LoudnessEstimator;
use pitch::{voice_register, PitchEstimator};
use spectrum::SpectrumClassifier;

/// Everything one block produced: the broadcastable update and, when the
/// gate opened, a durable sound event for the timeline.
#[derive(Debug, Clone)]
pub struct BlockOutcome {
    pub update: AnalysisUpdate,
    pub event: Option<SoundEvent>,
}

/// Per-block analysis pipeline
///
/// Owns all cross-block mutable state (running peaks, event-gate clock).
/// Listener settings are shared read-only from the pipeline's perspective;
/// changes made elsewhere take effect on the next block.
pub struct AnalysisPipeline {
    settings: Arc<RwLock<ListenerSettings>>,
    loudness: LoudnessEstimator,
    spectrum: SpectrumClassifier,
    direction: DirectionEstimator,
    pitch: PitchEstimator,
    classifier: SoundTypeClassifier,
    gate: EventGate,
    peaks: RunningPeaks,
}

impl AnalysisPipeline {
    pub fn new(settings: Arc<RwLock<ListenerSettings>>) -> Self {
        Self {
            settings,
            loudness: LoudnessEstimator::new(),
            spectrum: SpectrumClassifier::new(),
            direction: DirectionEstimator::new(),
            pitch: PitchEstimator::new(),
            classifier: SoundTypeClassifier::new(),
            gate: EventGate::new(),
            peaks: RunningPeaks::default(),
        }
    }

    /// Process one block atomically
    ///
    /// A malformed block (empty spectrum or waveform) is skipped entirely:
    /// no result, no peak update, no event. Every well-formed block yields
    /// a defined outcome.
    pub fn process_block(&mut self, block: &AudioBlock) -> Option<BlockOutcome> {
        if block.spectrum.is_empty() || block.waveform.is_empty() {
            tracing::debug!("[Analysis] Skipping malformed block (empty spectrum/waveform)");
            return None;
        }

        let settings = match self.settings.read() {
            Ok(guard) => *guard,
            Err(_) => {
                tracing::error!("[Analysis] Listener settings lock poisoned, skipping block");
                return None;
            }
        };

        let loudness = self.loudness.measure(&block.waveform, &settings);
        let sound_detected = self.loudness.is_sound_detected(loudness);
        let reading = self.spectrum.analyze(&block.spectrum, block.sample_rate);
        let direction = self.direction.estimate(&block.channels);

        let peak_loudness = self.peaks.observe_loudness(loudness);
        let peak_dominant = self.peaks.observe_dominant_hz(reading.dominant_hz);

        let classification = self.classifier.classify(&ClassifierInputs {
            loudness,
            dominant_frequency_hz: reading.dominant_hz,
            transient_measure: transient_measure(&block.waveform),
            peak_magnitude: reading.peak_magnitude,
            sound_detected,
        });

        // Pitch is only worth estimating for voice-like blocks with enough
        // signal; everything else is marked not applicable
        let (estimated_pitch_hz, register) = if classification.sound_type == SoundType::Voice
            && loudness > classifier::VOICE_MIN_LOUDNESS
        {
            match block
                .channels
                .first()
                .and_then(|channel| self.pitch.estimate(channel, block.sample_rate))
            {
                Some(pitch) => (pitch, voice_register(pitch)),
                None => (0.0, VoiceRegister::Undetermined),
            }
        } else {
            (0.0, VoiceRegister::NotApplicable)
        };

        let result = AnalysisResult {
            loudness,
            peak_loudness,
            dominant_frequency_hz: reading.dominant_hz,
            peak_dominant_frequency_hz: peak_dominant,
            frequency_range: reading.range,
            sound_type: classification.sound_type,
            confidence: classification.confidence,
            accent: classification.accent,
            estimated_distance: classification.estimated_distance,
            direction,
            estimated_pitch_hz,
            voice_register: register,
            sound_detected,
        };

        let event = self.gate.offer(&result, Instant::now());

        Some(BlockOutcome {
            update: AnalysisUpdate {
                result,
                effects: classification.effects,
            },
            event,
        })
    }

    /// Clear all cross-block state (peaks, gate clock). Called on restart.
    pub fn reset(&mut self) {
        self.peaks = RunningPeaks::default();
        self.gate = EventGate::new();
    }
}

struct AnalysisWorker {
    channels: AnalysisThreadChannels,
    frames: FrameSource,
    pipeline: AnalysisPipeline,
    update_tx: broadcast::Sender<AnalysisUpdate>,
    event_tx: mpsc::Sender<SoundEvent>,
    active: Arc<AtomicBool>,
}

impl AnalysisWorker {
    fn run(mut self) {
        tracing::info!("[AnalysisThread] Starting analysis loop");

        loop {
            let buffer = match self.channels.data_consumer.pop() {
                Ok(buf) => buf,
                Err(PopError::Empty) => {
                    if !self.active.load(Ordering::SeqCst) {
                        tracing::info!("[AnalysisThread] Stop requested and queue empty, exiting");
                        break;
                    }
                    // Small sleep to avoid busy loop when empty
                    thread::sleep(std::time::Duration::from_millis(1));
                    continue;
                }
            };

            let blocks = self.frames.push_interleaved(&buffer);

            // Return buffer to pool immediately
            if self.channels.pool_producer.push(buffer).is_err() {
                tracing::warn!("[AnalysisThread] Pool queue full, dropping buffer");
            }

            for block in blocks {
                let Some(outcome) = self.pipeline.process_block(&block) else {
                    continue;
                };

                if let Some(event) = outcome.event {
                    tracing::info!(
                        "[AnalysisThread] Sound event: {} at {:.0} Hz",
                        event.sound_type.label(),
                        event.frequency_hz
                    );
                    match self.event_tx.try_send(event) {
                        Ok(()) => {}
                        Err(mpsc::error::TrySendError::Full(_)) => {
                            tracing::warn!(
                                "[AnalysisThread] Event channel full, dropping sound event"
                            );
                        }
                        Err(mpsc::error::TrySendError::Closed(_)) => {
                            tracing::warn!(
                                "[AnalysisThread] Event channel closed, dropping sound event"
                            );
                        }
                    }
                }

                // No subscribers is fine; results are fire-and-forget
                let _ = self.update_tx.send(outcome.update);
            }
        }

        self.pipeline.reset();
        tracing::info!("[AnalysisThread] Analysis loop stopped");
    }
}

/// Spawn the analysis worker thread
///
/// The worker drains capture buffers from the lock-free data queue,
/// assembles fixed-size blocks, runs the pipeline, broadcasts
/// `AnalysisUpdate`s, and forwards gated `SoundEvent`s to the persistence
/// worker without ever blocking on it.
#[allow(clippy::too_many_arguments)]
pub fn spawn_analysis_thread(
    channels: AnalysisThreadChannels,
    settings: Arc<RwLock<ListenerSettings>>,
    sample_rate: u32,
    channel_count: usize,
    update_tx: broadcast::Sender<AnalysisUpdate>,
    event_tx: mpsc::Sender<SoundEvent>,
    active: Arc<AtomicBool>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let worker = AnalysisWorker {
            channels,
            frames: FrameSource::new(sample_rate, channel_count),
            pipeline: AnalysisPipeline::new(settings),
            update_tx,
            event_tx,
            active,
        };
        worker.run();
    })
}
