// Echo Mirror Core - Rust Audio Engine
// Real-time sound awareness: per-block analysis, classification, and event timeline

// Module declarations
pub mod analysis;
pub mod audio;
pub mod config;
pub mod error;
pub mod events;

// Re-exports for convenience
pub use analysis::{AnalysisResult, AnalysisUpdate, SoundEvent};
pub use config::{AppConfig, ListenerSettings};
