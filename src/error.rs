// Error types for the echo mirror engine
//
// Two error families: capture lifecycle errors (AudioError) and event
// persistence errors (SinkError). Everything inside the per-block analysis
// pipeline is total - malformed inputs yield defined classification states,
// not errors.

use std::fmt;

/// Audio capture errors
///
/// These errors cover capture engine operations: stream setup, lifecycle,
/// and hardware access.
#[derive(Debug, Clone, PartialEq)]
pub enum AudioError {
    /// Capture engine is already running
    AlreadyRunning,

    /// Capture engine is not running
    NotRunning,

    /// Failed to open the input stream
    StreamOpenFailed { reason: String },

    /// Hardware error occurred
    HardwareError { details: String },

    /// Mutex/RwLock was poisoned
    LockPoisoned { component: String },

    /// Stream disconnected unexpectedly
    StreamFailure { reason: String },
}

impl fmt::Display for AudioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AudioError::AlreadyRunning => {
                write!(f, "Capture engine already running. Call stop() first.")
            }
            AudioError::NotRunning => {
                write!(f, "Capture engine not running. Call start() first.")
            }
            AudioError::StreamOpenFailed { reason } => {
                write!(f, "Failed to open input stream: {}", reason)
            }
            AudioError::HardwareError { details } => write!(f, "Hardware error: {}", details),
            AudioError::LockPoisoned { component } => write!(f, "Lock poisoned on {}", component),
            AudioError::StreamFailure { reason } => write!(f, "Audio stream failed: {}", reason),
        }
    }
}

impl std::error::Error for AudioError {}

impl From<std::io::Error> for AudioError {
    fn from(err: std::io::Error) -> Self {
        AudioError::HardwareError {
            details: err.to_string(),
        }
    }
}

/// Event persistence errors
///
/// Raised by EventSink implementations. Never propagated into the analysis
/// path; the sink worker logs failures and moves on.
#[derive(Debug)]
pub enum SinkError {
    /// Underlying storage I/O failed
    Io(std::io::Error),

    /// Stored timeline could not be encoded or decoded
    Serialization(serde_json::Error),
}

impl fmt::Display for SinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SinkError::Io(err) => write!(f, "Event store I/O failed: {}", err),
            SinkError::Serialization(err) => write!(f, "Event store encoding failed: {}", err),
        }
    }
}

impl std::error::Error for SinkError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SinkError::Io(err) => Some(err),
            SinkError::Serialization(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for SinkError {
    fn from(err: std::io::Error) -> Self {
        SinkError::Io(err)
    }
}

impl From<serde_json::Error> for SinkError {
    fn from(err: serde_json::Error) -> Self {
        SinkError::Serialization(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audio_error_display() {
        let err = AudioError::StreamOpenFailed {
            reason: "no default input device".to_string(),
        };
        let display = format!("{}", err);
        assert!(display.contains("no default input device"));

        let err = AudioError::AlreadyRunning;
        assert!(format!("{}", err).contains("already running"));
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::other("test io error");
        let audio_err: AudioError = io_err.into();
        match audio_err {
            AudioError::HardwareError { details } => assert!(details.contains("test io error")),
            _ => panic!("Expected HardwareError"),
        }
    }

    #[test]
    fn test_sink_error_source() {
        use std::error::Error;
        let err: SinkError = std::io::Error::other("disk full").into();
        assert!(err.source().is_some());
        assert!(format!("{}", err).contains("disk full"));
    }
}
