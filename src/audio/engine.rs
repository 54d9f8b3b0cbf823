// CaptureEngine - cpal input stream wired to the analysis thread
//
// Owns the input stream and the analysis thread handle. The capture
// callback is allocation-free: it pops a pre-allocated buffer from the
// pool queue, fills it with interleaved samples, and pushes it onto the
// data queue for the analysis thread.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use std::thread::JoinHandle;
use tokio::sync::{broadcast, mpsc};

use super::buffer_pool::{BufferPool, CaptureThreadChannels};
use crate::analysis::{spawn_analysis_thread, AnalysisUpdate, SoundEvent};
use crate::config::{AudioConfig, ListenerSettings};
use crate::error::AudioError;

/// Directions need two channels; anything beyond a stereo pair is dropped
const MAX_CAPTURE_CHANNELS: usize = 2;

pub struct CaptureEngine {
    config: AudioConfig,
    settings: Arc<RwLock<ListenerSettings>>,
    input_stream: Option<cpal::Stream>,
    analysis_handle: Option<JoinHandle<()>>,
    /// Cleared on stop so the analysis thread drains and exits
    active: Arc<AtomicBool>,
    sample_rate: u32,
}

impl CaptureEngine {
    pub fn new(config: AudioConfig, settings: Arc<RwLock<ListenerSettings>>) -> Self {
        Self {
            config,
            settings,
            input_stream: None,
            analysis_handle: None,
            active: Arc::new(AtomicBool::new(false)),
            sample_rate: 0,
        }
    }

    pub fn is_running(&self) -> bool {
        self.input_stream.is_some()
    }

    /// Sample rate of the open stream, 0 before the first start
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Open the default input device and start streaming blocks into the
    /// analysis thread. Updates fan out on `update_tx`; gated events go to
    /// `event_tx` for persistence.
    pub fn start(
        &mut self,
        update_tx: broadcast::Sender<AnalysisUpdate>,
        event_tx: mpsc::Sender<SoundEvent>,
    ) -> Result<(), AudioError> {
        if self.input_stream.is_some() {
            return Err(AudioError::AlreadyRunning);
        }

        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .ok_or_else(|| AudioError::StreamOpenFailed {
                reason: "No default input device found".to_string(),
            })?;

        let device_config =
            device
                .default_input_config()
                .map_err(|e| AudioError::StreamOpenFailed {
                    reason: format!("Failed to get default input config: {:?}", e),
                })?;

        let stream_config: cpal::StreamConfig = device_config.clone().into();
        let device_channels = stream_config.channels as usize;
        let kept_channels = device_channels.min(MAX_CAPTURE_CHANNELS);
        let sample_rate = stream_config.sample_rate.0;

        tracing::info!(
            "[CaptureEngine] Opening input stream: {} Hz, {} channel(s), keeping {}",
            sample_rate,
            device_channels,
            kept_channels
        );

        // Pool buffers sized for one capture callback's worth of kept samples
        let (capture_channels, analysis_channels) = BufferPool::new(
            self.config.buffer_pool_size,
            self.config.buffer_size * kept_channels,
        );

        let stream = match device_config.sample_format() {
            cpal::SampleFormat::F32 => build_input_stream(
                &device,
                &stream_config,
                device_channels,
                kept_channels,
                capture_channels,
            )?,
            other => {
                return Err(AudioError::StreamOpenFailed {
                    reason: format!("Unsupported input sample format: {:?}", other),
                })
            }
        };

        stream.play().map_err(|e| AudioError::HardwareError {
            details: format!("Input start failed: {}", e),
        })?;

        self.active.store(true, Ordering::SeqCst);
        self.analysis_handle = Some(spawn_analysis_thread(
            analysis_channels,
            Arc::clone(&self.settings),
            sample_rate,
            kept_channels,
            update_tx,
            event_tx,
            Arc::clone(&self.active),
        ));

        self.sample_rate = sample_rate;
        self.input_stream = Some(stream);
        Ok(())
    }

    /// Close the stream and wait for the analysis thread to drain its queue.
    pub fn stop(&mut self) -> Result<(), AudioError> {
        let stream = self.input_stream.take().ok_or(AudioError::NotRunning)?;
        drop(stream);

        self.active.store(false, Ordering::SeqCst);
        if let Some(handle) = self.analysis_handle.take() {
            if handle.join().is_err() {
                tracing::error!("[CaptureEngine] Analysis thread panicked");
            }
        }

        tracing::info!("[CaptureEngine] Capture stopped");
        Ok(())
    }
}

impl Drop for CaptureEngine {
    fn drop(&mut self) {
        if self.input_stream.is_some() {
            let _ = self.stop();
        }
    }
}

fn build_input_stream(
    device: &cpal::Device,
    stream_config: &cpal::StreamConfig,
    device_channels: usize,
    kept_channels: usize,
    mut channels: CaptureThreadChannels,
) -> Result<cpal::Stream, AudioError> {
    let err_fn = |err| tracing::error!("[CaptureEngine] Input stream error: {}", err);

    let stream = device
        .build_input_stream(
            stream_config,
            move |data: &[f32], _: &cpal::InputCallbackInfo| {
                // If the pool is exhausted the analysis side is behind;
                // drop this callback's audio rather than block
                if let Ok(mut buffer) = channels.pool_consumer.pop() {
                    buffer.clear();
                    if device_channels == kept_channels {
                        buffer.extend_from_slice(data);
                    } else {
                        for frame in data.chunks(device_channels) {
                            buffer.extend_from_slice(&frame[..kept_channels.min(frame.len())]);
                        }
                    }
                    let _ = channels.data_producer.push(buffer);
                }
            },
            err_fn,
            None,
        )
        .map_err(|e| AudioError::StreamOpenFailed {
            reason: format!("{:?}", e),
        })?;

    Ok(stream)
}
