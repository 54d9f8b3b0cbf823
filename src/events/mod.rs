// Event persistence - durable timeline of gated sound events
//
// The analysis thread emits at most one SoundEvent per cooldown window;
// a dedicated sink worker receives them over a bounded channel and appends
// them to the configured store. Persistence never runs on the analysis
// thread, so a slow disk cannot stall audio processing.

pub mod json_file;

use serde::{Deserialize, Serialize};
use std::thread::{self, JoinHandle};
use std::time::UNIX_EPOCH;
use tokio::sync::mpsc;

use crate::analysis::SoundEvent;
use crate::error::SinkError;

pub use json_file::JsonFileSink;

/// One persisted timeline row. Frequency is kept as display text
/// ("432 Hz") so the stored record matches what listeners were shown.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoredEvent {
    /// Monotonically increasing id, assigned by the sink on append
    pub id: u64,
    /// Milliseconds since the Unix epoch
    pub timestamp_ms: u64,
    /// Display label of the classified sound type
    pub sound_type: String,
    /// Rounded dominant frequency with unit suffix
    pub frequency: String,
}

/// Storage backend for the event timeline.
pub trait EventSink: Send {
    /// Persist one event and return the stored row with its assigned id.
    fn append(&mut self, event: &SoundEvent) -> Result<StoredEvent, SinkError>;

    /// Most recent events first, at most `limit` rows.
    fn list_recent(&self, limit: usize) -> Result<Vec<StoredEvent>, SinkError>;

    /// Remove every stored event; returns how many were removed.
    fn clear_all(&mut self) -> Result<usize, SinkError>;
}

/// Convert a gated event into the row shape the sink persists (id 0;
/// the sink assigns the real one).
pub fn stored_row(event: &SoundEvent) -> StoredEvent {
    let timestamp_ms = event
        .timestamp
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0);

    StoredEvent {
        id: 0,
        timestamp_ms,
        sound_type: event.sound_type.label().to_string(),
        frequency: format!("{} Hz", event.frequency_hz.round() as u32),
    }
}

/// Spawn the persistence worker. Runs until the sending side is dropped;
/// append failures are logged and the event is discarded.
pub fn spawn_sink_worker(
    mut sink: Box<dyn EventSink>,
    mut event_rx: mpsc::Receiver<SoundEvent>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        tracing::info!("[SinkWorker] Event persistence worker started");
        while let Some(event) = event_rx.blocking_recv() {
            match sink.append(&event) {
                Ok(stored) => {
                    tracing::debug!(
                        "[SinkWorker] Stored event {} ({}, {})",
                        stored.id,
                        stored.sound_type,
                        stored.frequency
                    );
                }
                Err(e) => {
                    tracing::warn!("[SinkWorker] Failed to persist event: {}", e);
                }
            }
        }
        tracing::info!("[SinkWorker] Event channel closed, worker exiting");
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::SoundType;
    use std::time::{Duration, SystemTime};

    #[test]
    fn test_stored_row_formats_frequency_with_unit() {
        let event = SoundEvent {
            timestamp: UNIX_EPOCH + Duration::from_millis(1_700_000_000_123),
            sound_type: SoundType::Voice,
            frequency_hz: 431.7,
        };
        let row = stored_row(&event);
        assert_eq!(row.frequency, "432 Hz");
        assert_eq!(row.sound_type, SoundType::Voice.label());
        assert_eq!(row.timestamp_ms, 1_700_000_000_123);
    }

    #[test]
    fn test_stored_row_pre_epoch_timestamp_clamps_to_zero() {
        let event = SoundEvent {
            timestamp: SystemTime::UNIX_EPOCH - Duration::from_secs(1),
            sound_type: SoundType::Ambient,
            frequency_hz: 0.0,
        };
        assert_eq!(stored_row(&event).timestamp_ms, 0);
    }
}
