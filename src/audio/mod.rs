// Audio module - capture, buffering, and block assembly
//
// The capture engine fills pre-allocated buffers with interleaved samples
// from the input device and hands them to the analysis thread through a
// lock-free queue pair. The frame source turns those raw buffers into the
// fixed-size blocks the analysis pipeline consumes.

pub mod buffer_pool;
pub mod engine;
pub mod frame;

pub use engine::CaptureEngine;
pub use frame::{AudioBlock, FrameSource, FFT_SIZE};
