// FrameSource - assembles analysis blocks from raw capture buffers
//
// Accumulates interleaved capture samples and, once a transform's worth of
// frames is available, produces one AudioBlock: the byte-domain magnitude
// spectrum and waveform the pipeline consumes, plus the deinterleaved raw
// channel samples for direction and pitch estimation.
//
// Byte conversions match the analyser conventions the rest of the pipeline
// is tuned against:
// - waveform: [-1, 1] mapped linearly onto 0..=255, midpoint 128
// - spectrum: windowed magnitude / N, exponentially smoothed across blocks,
//   then dB in [-100, -30] mapped linearly onto 0..=255

use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::sync::Arc;

/// Transform size in frames; one block is produced per FFT_SIZE frames
pub const FFT_SIZE: usize = 2048;
/// Exponential smoothing factor applied to linear magnitudes across blocks
pub const SMOOTHING_TIME_CONSTANT: f32 = 0.8;
/// Byte value representing zero amplitude in the waveform
pub const WAVEFORM_MIDPOINT: u8 = 128;

/// dB range mapped onto the 0..=255 spectrum bytes
const MIN_DECIBELS: f32 = -100.0;
const MAX_DECIBELS: f32 = -30.0;

/// One analysis unit: a transform's worth of audio and its derived views.
/// Created fresh per block and discarded after the pipeline pass.
#[derive(Debug, Clone)]
pub struct AudioBlock {
    pub sample_rate: u32,
    /// Byte magnitude spectrum, FFT_SIZE / 2 bins
    pub spectrum: Vec<u8>,
    /// Byte waveform, FFT_SIZE samples, midpoint 128
    pub waveform: Vec<u8>,
    /// Deinterleaved raw samples in [-1, 1], one sequence per channel (0-2)
    pub channels: Vec<Vec<f32>>,
}

pub struct FrameSource {
    sample_rate: u32,
    channel_count: usize,
    fft: Arc<dyn Fft<f32>>,
    fft_scratch: Vec<Complex<f32>>,
    /// Pre-computed Hann window to reduce spectral leakage
    window: Vec<f32>,
    /// Interleaved samples awaiting a full block
    pending: Vec<f32>,
    /// Smoothed linear magnitudes carried across blocks
    smoothed: Vec<f32>,
}

impl FrameSource {
    pub fn new(sample_rate: u32, channel_count: usize) -> Self {
        let fft = FftPlanner::new().plan_fft_forward(FFT_SIZE);
        let fft_scratch = vec![Complex::new(0.0, 0.0); fft.get_inplace_scratch_len()];
        let window = (0..FFT_SIZE)
            .map(|i| {
                0.5 * (1.0
                    - ((2.0 * std::f32::consts::PI * i as f32) / (FFT_SIZE as f32 - 1.0)).cos())
            })
            .collect();

        Self {
            sample_rate,
            channel_count: channel_count.max(1),
            fft,
            fft_scratch,
            window,
            pending: Vec::with_capacity(FFT_SIZE * 2 * channel_count.max(1)),
            smoothed: vec![0.0; FFT_SIZE / 2],
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Feed interleaved capture samples; returns every block completed by
    /// this push (usually zero or one).
    pub fn push_interleaved(&mut self, samples: &[f32]) -> Vec<AudioBlock> {
        self.pending.extend_from_slice(samples);

        let block_len = FFT_SIZE * self.channel_count;
        let mut blocks = Vec::new();
        while self.pending.len() >= block_len {
            let interleaved: Vec<f32> = self.pending.drain(..block_len).collect();
            blocks.push(self.assemble_block(&interleaved));
        }
        blocks
    }

    fn assemble_block(&mut self, interleaved: &[f32]) -> AudioBlock {
        // Deinterleave up to two channels, clamped to [-1, 1]
        let kept_channels = self.channel_count.min(2);
        let mut channels = vec![Vec::with_capacity(FFT_SIZE); kept_channels];
        for frame in interleaved.chunks_exact(self.channel_count) {
            for (channel, &sample) in channels.iter_mut().zip(frame.iter()) {
                channel.push(sample.clamp(-1.0, 1.0));
            }
        }

        // Mono mixdown feeds both byte-domain views
        let mono: Vec<f32> = (0..FFT_SIZE)
            .map(|i| {
                let sum: f32 = channels.iter().map(|ch| ch[i]).sum();
                sum / kept_channels as f32
            })
            .collect();

        let waveform = mono
            .iter()
            .map(|&x| ((x + 1.0) * WAVEFORM_MIDPOINT as f32).round().clamp(0.0, 255.0) as u8)
            .collect();

        let spectrum = self.byte_spectrum(&mono);

        AudioBlock {
            sample_rate: self.sample_rate,
            spectrum,
            waveform,
            channels,
        }
    }

    fn byte_spectrum(&mut self, mono: &[f32]) -> Vec<u8> {
        let mut buffer: Vec<Complex<f32>> = mono
            .iter()
            .zip(self.window.iter())
            .map(|(&sample, &w)| Complex::new(sample * w, 0.0))
            .collect();
        self.fft.process_with_scratch(&mut buffer, &mut self.fft_scratch);

        let db_span = MAX_DECIBELS - MIN_DECIBELS;
        buffer[..FFT_SIZE / 2]
            .iter()
            .enumerate()
            .map(|(i, c)| {
                let magnitude = c.norm() / FFT_SIZE as f32;
                let smoothed = SMOOTHING_TIME_CONSTANT * self.smoothed[i]
                    + (1.0 - SMOOTHING_TIME_CONSTANT) * magnitude;
                self.smoothed[i] = smoothed;

                if smoothed <= 0.0 {
                    0
                } else {
                    let db = 20.0 * smoothed.log10();
                    (255.0 * (db - MIN_DECIBELS) / db_span).clamp(0.0, 255.0) as u8
                }
            })
            .collect()
    }
}
