use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::{Arc, RwLock};

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use tokio::sync::{broadcast, mpsc};

use echo_mirror::analysis::{AnalysisPipeline, AnalysisUpdate, SoundEvent};
use echo_mirror::audio::{CaptureEngine, FrameSource};
use echo_mirror::config::{AppConfig, ListenerSettings};
use echo_mirror::events::{spawn_sink_worker, EventSink, JsonFileSink};

#[derive(Parser, Debug)]
#[command(
    name = "echo_mirror_cli",
    about = "Real-time sound awareness: loudness, classification, and event timeline"
)]
struct Cli {
    /// Path to a JSON config file (defaults built in when absent)
    #[arg(long)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Listen on the default input device and stream analysis updates to stdout
    Live {
        /// Listening sensitivity in percent (0-100)
        #[arg(long, default_value_t = 50.0)]
        sensitivity: f32,
        /// Clamp near-silent blocks to zero loudness
        #[arg(long)]
        ignore_ambient: bool,
    },
    /// Analyze a WAV file offline and print one update per block
    Wav {
        path: PathBuf,
        #[arg(long, default_value_t = 50.0)]
        sensitivity: f32,
    },
    /// Show the most recent stored sound events
    Events {
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Delete every stored sound event
    ClearEvents,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt::init();
    match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:?}");
            ExitCode::from(1)
        }
    }
}

fn run() -> Result<ExitCode> {
    let cli = Cli::parse();
    let config = match cli.config {
        Some(path) => AppConfig::load_from_file(path),
        None => AppConfig::default(),
    };

    match cli.command {
        Commands::Live {
            sensitivity,
            ignore_ambient,
        } => run_live(config, sensitivity, ignore_ambient),
        Commands::Wav { path, sensitivity } => run_wav(config, &path, sensitivity),
        Commands::Events { limit } => run_events(config, limit),
        Commands::ClearEvents => run_clear_events(config),
    }
}

fn listener_settings(sensitivity_percent: f32, ignore_ambient: bool) -> ListenerSettings {
    let mut settings = ListenerSettings::default();
    settings.set_sensitivity_percent(sensitivity_percent);
    settings.ignore_ambient_noise = ignore_ambient;
    settings
}

fn run_live(config: AppConfig, sensitivity: f32, ignore_ambient: bool) -> Result<ExitCode> {
    let settings = Arc::new(RwLock::new(listener_settings(sensitivity, ignore_ambient)));

    let (update_tx, mut update_rx) = broadcast::channel::<AnalysisUpdate>(32);
    let (event_tx, event_rx) = mpsc::channel::<SoundEvent>(config.events.channel_capacity);

    let sink = JsonFileSink::new(&config.events.path);
    let sink_handle = spawn_sink_worker(Box::new(sink), event_rx);

    let mut engine = CaptureEngine::new(config.audio, settings);
    engine
        .start(update_tx, event_tx)
        .context("starting audio capture")?;
    eprintln!("Listening... press Ctrl-C to stop");

    let runtime = tokio::runtime::Runtime::new().context("creating async runtime")?;
    runtime.block_on(async {
        loop {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => break,
                update = update_rx.recv() => match update {
                    Ok(update) => println!("{}", serde_json::to_string(&update)?),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!("Display fell behind, skipped {} updates", skipped);
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                },
            }
        }
        anyhow::Ok(())
    })?;

    engine.stop().context("stopping audio capture")?;
    sink_handle
        .join()
        .map_err(|_| anyhow!("event persistence worker panicked"))?;
    Ok(ExitCode::from(0))
}

fn run_wav(config: AppConfig, path: &Path, sensitivity: f32) -> Result<ExitCode> {
    let (interleaved, sample_rate, channel_count) = read_wav(path)?;

    let settings = Arc::new(RwLock::new(listener_settings(sensitivity, false)));
    let mut frames = FrameSource::new(sample_rate, channel_count);
    let mut pipeline = AnalysisPipeline::new(settings);
    let mut sink = JsonFileSink::new(&config.events.path);

    for block in frames.push_interleaved(&interleaved) {
        if let Some(outcome) = pipeline.process_block(&block) {
            println!("{}", serde_json::to_string(&outcome.update)?);
            if let Some(event) = outcome.event {
                let stored = sink.append(&event).context("storing sound event")?;
                eprintln!("Stored event {}: {} ({})", stored.id, stored.sound_type, stored.frequency);
            }
        }
    }

    Ok(ExitCode::from(0))
}

fn run_events(config: AppConfig, limit: Option<usize>) -> Result<ExitCode> {
    let limit = limit.unwrap_or(config.events.recent_limit);
    let sink = JsonFileSink::new(&config.events.path);
    let events = sink.list_recent(limit).context("reading event store")?;

    if events.is_empty() {
        println!("No stored sound events");
        return Ok(ExitCode::from(0));
    }
    for event in events {
        println!(
            "#{} [{} ms] {} {}",
            event.id, event.timestamp_ms, event.sound_type, event.frequency
        );
    }
    Ok(ExitCode::from(0))
}

fn run_clear_events(config: AppConfig) -> Result<ExitCode> {
    let mut sink = JsonFileSink::new(&config.events.path);
    let removed = sink.clear_all().context("clearing event store")?;
    println!("Removed {removed} stored events");
    Ok(ExitCode::from(0))
}

/// Decode a WAV file to interleaved f32 samples in [-1, 1]. Channels
/// beyond a stereo pair are rejected rather than silently mixed.
fn read_wav(path: &Path) -> Result<(Vec<f32>, u32, usize)> {
    let mut reader =
        hound::WavReader::open(path).with_context(|| format!("opening {}", path.display()))?;
    let spec = reader.spec();
    if spec.channels == 0 || spec.channels > 2 {
        return Err(anyhow!(
            "{} must be mono or stereo (found {} channels)",
            path.display(),
            spec.channels
        ));
    }

    let samples = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .map(|sample| sample.map_err(|err| anyhow!(err)))
            .collect::<Result<Vec<f32>>>()?,
        hound::SampleFormat::Int => {
            let max = ((1i64 << (spec.bits_per_sample - 1)) - 1) as f32;
            match spec.bits_per_sample {
                16 => reader
                    .samples::<i16>()
                    .map(|sample| {
                        sample.map(|value| value as f32 / max).map_err(|err| anyhow!(err))
                    })
                    .collect::<Result<Vec<f32>>>()?,
                24 | 32 => reader
                    .samples::<i32>()
                    .map(|sample| {
                        sample.map(|value| value as f32 / max).map_err(|err| anyhow!(err))
                    })
                    .collect::<Result<Vec<f32>>>()?,
                bits => {
                    return Err(anyhow!(
                        "{}: unsupported bit depth {}",
                        path.display(),
                        bits
                    ))
                }
            }
        }
    };

    Ok((samples, spec.sample_rate, spec.channels as usize))
}
