// SpectrumClassifier - dominant-frequency scan and band-energy profiling
//
// Scans the byte magnitude spectrum for the strongest bin inside the
// audible search window and aggregates bin magnitudes into low/mid/high
// energy buckets to label the block's frequency range.

use super::types::FrequencyRange;

/// Lower bound of the dominant-frequency search window (exclusive)
pub const SEARCH_FLOOR_HZ: f32 = 20.0;
/// Upper edge of the low band (exclusive)
pub const LOW_BAND_EDGE_HZ: f32 = 500.0;
/// Upper edge of the mid band (exclusive)
pub const MID_BAND_EDGE_HZ: f32 = 2000.0;
/// Upper edge of the high band (exclusive); bins above this are not
/// counted toward range classification (typical laptop mic rolloff)
pub const HIGH_BAND_EDGE_HZ: f32 = 6000.0;

/// Result of scanning one block's spectrum
#[derive(Debug, Clone, Copy)]
pub struct SpectrumReading {
    /// Frequency of the strongest bin in (20 Hz, Nyquist); 0 if none
    pub dominant_hz: f32,
    /// Magnitude of that bin (byte units, 0-255)
    pub peak_magnitude: u8,
    pub range: FrequencyRange,
}

pub struct SpectrumClassifier;

impl SpectrumClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Analyze one block's magnitude spectrum
    ///
    /// Bin `i` maps to `i * sample_rate / transform_size`, where the
    /// transform size is twice the spectrum length.
    pub fn analyze(&self, spectrum: &[u8], sample_rate: u32) -> SpectrumReading {
        let transform_size = spectrum.len() * 2;
        let bin_width = sample_rate as f32 / transform_size as f32;
        let nyquist = sample_rate as f32 / 2.0;

        let mut peak_magnitude = 0u8;
        let mut dominant_hz = 0.0f32;
        let mut low_energy = 0u32;
        let mut mid_energy = 0u32;
        let mut high_energy = 0u32;

        for (i, &value) in spectrum.iter().enumerate() {
            let frequency = i as f32 * bin_width;

            if frequency > SEARCH_FLOOR_HZ && frequency < nyquist && value > peak_magnitude {
                peak_magnitude = value;
                dominant_hz = frequency;
            }

            if frequency < LOW_BAND_EDGE_HZ {
                low_energy += value as u32;
            } else if frequency < MID_BAND_EDGE_HZ {
                mid_energy += value as u32;
            } else if frequency < HIGH_BAND_EDGE_HZ {
                high_energy += value as u32;
            }
        }

        let range = Self::dominant_band(low_energy, mid_energy, high_energy);

        SpectrumReading {
            dominant_hz,
            peak_magnitude,
            range,
        }
    }

    /// Pick the bucket with the largest energy share.
    ///
    /// Ties resolve toward the lower band (low > mid > high priority).
    fn dominant_band(low: u32, mid: u32, high: u32) -> FrequencyRange {
        let total = low + mid + high;
        if total == 0 {
            return FrequencyRange::Unknown;
        }

        if low >= mid && low >= high {
            FrequencyRange::Low
        } else if mid >= high {
            FrequencyRange::Mid
        } else {
            FrequencyRange::High
        }
    }
}

impl Default for SpectrumClassifier {
    fn default() -> Self {
        Self::new()
    }
}
