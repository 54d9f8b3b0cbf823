//! Configuration for the echo mirror engine
//!
//! Two layers of configuration:
//! - `AppConfig`: process-wide wiring (buffer sizes, event store location),
//!   loadable from a JSON file with sensible defaults as fallback.
//! - `ListenerSettings`: the two user-facing knobs (sensitivity, ambient
//!   noise gate) that may change between any two blocks and take effect on
//!   the next one.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub audio: AudioConfig,
    pub events: EventStoreConfig,
}

/// Audio capture configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioConfig {
    /// Size of buffer pool for real-time audio transfer
    pub buffer_pool_size: usize,
    /// Size of each capture buffer in interleaved samples
    pub buffer_size: usize,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            buffer_pool_size: 16,
            buffer_size: 2048,
        }
    }
}

/// Event timeline persistence configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventStoreConfig {
    /// Path to the JSON timeline file
    pub path: String,
    /// Capacity of the outbound event channel between the analysis thread
    /// and the sink worker
    pub channel_capacity: usize,
    /// Default number of events returned by timeline listings
    pub recent_limit: usize,
}

impl Default for EventStoreConfig {
    fn default() -> Self {
        Self {
            path: "echo_mirror_events.json".to_string(),
            channel_capacity: 32,
            recent_limit: 10,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            audio: AudioConfig::default(),
            events: EventStoreConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a JSON file, falling back to defaults if the
    /// file is missing or invalid.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Self {
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => {
                    log::info!("[Config] Loaded configuration from {:?}", path.as_ref());
                    config
                }
                Err(err) => {
                    log::warn!(
                        "[Config] Failed to parse JSON from {:?}: {}. Using defaults.",
                        path.as_ref(),
                        err
                    );
                    Self::default()
                }
            },
            Err(err) => {
                log::warn!(
                    "[Config] Failed to read config file {:?}: {}. Using defaults.",
                    path.as_ref(),
                    err
                );
                Self::default()
            }
        }
    }
}

/// Runtime listener settings, read by the pipeline on every block
///
/// Shared as `Arc<RwLock<ListenerSettings>>` between the analysis thread
/// (reader) and whatever surface exposes the controls (writer).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ListenerSettings {
    /// Input sensitivity in [0.0, 1.0]; loudness is scaled by 2x this value
    pub sensitivity: f32,
    /// Hard noise gate: clamp loudness below the ambient floor to zero
    pub ignore_ambient_noise: bool,
}

impl Default for ListenerSettings {
    fn default() -> Self {
        Self {
            sensitivity: 0.5,
            ignore_ambient_noise: false,
        }
    }
}

impl ListenerSettings {
    /// Set sensitivity from the external 0-100 scale (slider units)
    pub fn set_sensitivity_percent(&mut self, percent: f32) {
        self.sensitivity = (percent / 100.0).clamp(0.0, 1.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.audio.buffer_pool_size, 16);
        assert_eq!(config.audio.buffer_size, 2048);
        assert_eq!(config.events.recent_limit, 10);
    }

    #[test]
    fn test_json_roundtrip() {
        let config = AppConfig::default();
        let json = serde_json::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.audio.buffer_size, config.audio.buffer_size);
        assert_eq!(parsed.events.path, config.events.path);
    }

    #[test]
    fn test_load_missing_file_falls_back_to_defaults() {
        let config = AppConfig::load_from_file("definitely/not/a/real/path.json");
        assert_eq!(config.audio.buffer_pool_size, 16);
    }

    #[test]
    fn test_sensitivity_percent_mapping() {
        let mut settings = ListenerSettings::default();
        settings.set_sensitivity_percent(75.0);
        assert!((settings.sensitivity - 0.75).abs() < f32::EPSILON);

        settings.set_sensitivity_percent(150.0);
        assert_eq!(settings.sensitivity, 1.0);

        settings.set_sensitivity_percent(-10.0);
        assert_eq!(settings.sensitivity, 0.0);
    }
}
