// JsonFileSink - event timeline persisted as a JSON array on disk
//
// The whole store is read and rewritten per operation. Event volume is
// bounded by the 2-second gate cooldown, so the store stays small and the
// simple whole-file strategy keeps every write durable and inspectable.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::{stored_row, EventSink, StoredEvent};
use crate::analysis::SoundEvent;
use crate::error::SinkError;

pub struct JsonFileSink {
    path: PathBuf,
}

impl JsonFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Missing file reads as an empty store; malformed content is an error.
    fn load(&self) -> Result<Vec<StoredEvent>, SinkError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(SinkError::Io(e)),
        };
        let events = serde_json::from_str(&contents)?;
        Ok(events)
    }

    fn store(&self, events: &[StoredEvent]) -> Result<(), SinkError> {
        let contents = serde_json::to_string_pretty(events)?;
        fs::write(&self.path, contents)?;
        Ok(())
    }
}

impl EventSink for JsonFileSink {
    fn append(&mut self, event: &SoundEvent) -> Result<StoredEvent, SinkError> {
        let mut events = self.load()?;
        let next_id = events.iter().map(|e| e.id).max().unwrap_or(0) + 1;

        let mut row = stored_row(event);
        row.id = next_id;
        events.push(row.clone());

        self.store(&events)?;
        Ok(row)
    }

    fn list_recent(&self, limit: usize) -> Result<Vec<StoredEvent>, SinkError> {
        let events = self.load()?;
        Ok(events.into_iter().rev().take(limit).collect())
    }

    fn clear_all(&mut self) -> Result<usize, SinkError> {
        let removed = self.load()?.len();
        self.store(&[])?;
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::SoundType;
    use std::time::SystemTime;
    use tempfile::tempdir;

    fn voice_event(frequency_hz: f32) -> SoundEvent {
        SoundEvent {
            timestamp: SystemTime::now(),
            sound_type: SoundType::Voice,
            frequency_hz,
        }
    }

    fn sink_in(dir: &tempfile::TempDir) -> JsonFileSink {
        JsonFileSink::new(dir.path().join("events.json"))
    }

    #[test]
    fn test_append_assigns_sequential_ids() {
        let dir = tempdir().unwrap();
        let mut sink = sink_in(&dir);

        let first = sink.append(&voice_event(200.0)).unwrap();
        let second = sink.append(&voice_event(300.0)).unwrap();
        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
    }

    #[test]
    fn test_list_recent_is_newest_first_and_limited() {
        let dir = tempdir().unwrap();
        let mut sink = sink_in(&dir);
        for hz in [100.0, 200.0, 300.0] {
            sink.append(&voice_event(hz)).unwrap();
        }

        let recent = sink.list_recent(2).unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].frequency, "300 Hz");
        assert_eq!(recent[1].frequency, "200 Hz");
    }

    #[test]
    fn test_store_survives_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("events.json");

        JsonFileSink::new(&path).append(&voice_event(150.0)).unwrap();
        let reopened = JsonFileSink::new(&path);
        assert_eq!(reopened.list_recent(10).unwrap().len(), 1);
    }

    #[test]
    fn test_clear_all_reports_removed_count() {
        let dir = tempdir().unwrap();
        let mut sink = sink_in(&dir);
        sink.append(&voice_event(100.0)).unwrap();
        sink.append(&voice_event(200.0)).unwrap();

        assert_eq!(sink.clear_all().unwrap(), 2);
        assert!(sink.list_recent(10).unwrap().is_empty());
        assert_eq!(sink.clear_all().unwrap(), 0);
    }

    #[test]
    fn test_missing_file_reads_as_empty() {
        let dir = tempdir().unwrap();
        let sink = sink_in(&dir);
        assert!(sink.list_recent(10).unwrap().is_empty());
    }

    #[test]
    fn test_corrupt_store_is_a_serialization_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("events.json");
        fs::write(&path, "not json").unwrap();

        let mut sink = JsonFileSink::new(&path);
        assert!(matches!(
            sink.append(&voice_event(100.0)),
            Err(SinkError::Serialization(_))
        ));
    }
}
