//! Audio device probe
//!
//! Lists audio devices, or records from the configured microphone through
//! the adapter and prints the input level once per second.
//!
//! ```text
//! adm-probe list [--json]
//! adm-probe record [config.toml]
//! ```

use anyhow::{bail, Result};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use audio_device_adapter::{
    backend::list_devices, AdapterConfig, AudioDeviceModule, AudioTransport, Microphone,
};

/// Transport that keeps the peak input level since the last report
#[derive(Default)]
struct LevelTransport {
    /// Peak absolute sample value (f32 bits)
    peak: AtomicU32,
    mic_level: AtomicU32,
    frames: AtomicU64,
}

impl LevelTransport {
    fn take_peak(&self) -> f32 {
        f32::from_bits(self.peak.swap(0, Ordering::Relaxed))
    }
}

impl AudioTransport for LevelTransport {
    fn recorded_data_is_available(
        &self,
        samples: &[f32],
        _channels: u16,
        _sample_rate: u32,
        mic_level: u32,
    ) {
        let peak = samples.iter().fold(0.0f32, |acc, s| acc.max(s.abs()));
        // Non-negative floats order the same as their bit patterns
        self.peak.fetch_max(peak.to_bits(), Ordering::Relaxed);
        self.mic_level.store(mic_level, Ordering::Relaxed);
        self.frames.fetch_add(1, Ordering::Relaxed);
    }

    fn need_more_play_data(&self, _out: &mut [f32], _channels: u16, _sample_rate: u32) -> usize {
        0
    }
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        Some("list") => list(args.iter().any(|a| a == "--json")),
        Some("record") => record(args.get(1).map(PathBuf::from)),
        _ => {
            eprintln!("Usage: adm-probe list [--json] | record [config.toml]");
            bail!("missing or unknown command");
        }
    }
}

fn list(json: bool) -> Result<()> {
    let devices = list_devices();
    if json {
        println!("{}", serde_json::to_string_pretty(&devices)?);
        return Ok(());
    }

    println!("\n=== Available Audio Devices ===");
    for device in &devices {
        let device_type = match (device.is_input, device.is_output) {
            (true, true) => "Input/Output",
            (true, false) => "Input",
            (false, true) => "Output",
            _ => "Unknown",
        };
        let default_marker = if device.is_default { " [DEFAULT]" } else { "" };
        println!("  {} ({}){}:", device.name, device_type, default_marker);
        println!("    ID: {}", device.id);
        println!("    Sample rates: {:?}", device.sample_rates);
        println!("    Channels: {:?}", device.channels);
    }
    println!();
    Ok(())
}

fn record(config_path: Option<PathBuf>) -> Result<()> {
    let config = match config_path.or_else(AdapterConfig::default_path) {
        Some(path) if path.exists() => {
            tracing::info!("Loading config from {}", path.display());
            AdapterConfig::load(&path)?
        }
        _ => AdapterConfig::default(),
    };

    let microphone = Microphone::from_config(&config)?;
    let adapter = microphone.adapter().clone();

    let transport = Arc::new(LevelTransport::default());
    adapter.register_audio_callback(Some(transport.clone()))?;
    adapter.init_recording()?;
    adapter.start_recording()?;

    let devices = microphone.devices().unwrap_or_default();
    let index = adapter.selected_mic_index() as usize;
    println!(
        "Recording from {} (press Ctrl+C to stop)",
        devices.get(index).map(String::as_str).unwrap_or("default device")
    );

    let running = Arc::new(AtomicBool::new(true));
    let running_for_signal = running.clone();
    ctrlc::set_handler(move || {
        running_for_signal.store(false, Ordering::SeqCst);
    })?;

    let mut ticks = 0u32;
    while running.load(Ordering::SeqCst) {
        std::thread::sleep(Duration::from_millis(100));
        ticks += 1;
        if ticks % 10 != 0 {
            continue;
        }

        let peak = transport.take_peak();
        let db = if peak > 0.0 { 20.0 * peak.log10() } else { f32::NEG_INFINITY };
        println!(
            "level {:>7.1} dBFS  mic volume {:>3}  frames {}",
            db,
            transport.mic_level.load(Ordering::Relaxed),
            transport.frames.load(Ordering::Relaxed)
        );
    }

    println!("Stopping...");
    adapter.stop_recording()?;
    adapter.register_audio_callback(None)?;
    adapter.terminate()?;
    Ok(())
}
