// DirectionEstimator - left/right/center labeling from per-channel energy
//
// Compares the summed squared samples of the two capture channels. No
// smoothing across blocks: each block's direction stands on its own.

use super::types::Direction;

/// Minimum normalized energy-difference ratio before a side is called
pub const DIRECTION_THRESHOLD: f32 = 0.15;

pub struct DirectionEstimator;

impl DirectionEstimator {
    pub fn new() -> Self {
        Self
    }

    /// Estimate the direction for one block's channel samples
    ///
    /// Requires two channels; with fewer the direction is Unavailable,
    /// which is a valid classification state, not an error. Channels
    /// beyond the first two are ignored.
    pub fn estimate(&self, channels: &[Vec<f32>]) -> Direction {
        if channels.len() < 2 {
            return Direction::Unavailable;
        }

        let left_energy = Self::energy(&channels[0]);
        let right_energy = Self::energy(&channels[1]);
        let total = left_energy + right_energy;
        if total <= 0.0 {
            return Direction::Unavailable;
        }

        let ratio = (left_energy - right_energy).abs() / total;
        if ratio > DIRECTION_THRESHOLD {
            if left_energy > right_energy {
                Direction::Left
            } else {
                Direction::Right
            }
        } else {
            Direction::Center
        }
    }

    fn energy(samples: &[f32]) -> f32 {
        samples.iter().map(|&s| s * s).sum()
    }
}

impl Default for DirectionEstimator {
    fn default() -> Self {
        Self::new()
    }
}
