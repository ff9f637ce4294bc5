//! Audio device enumeration through cpal
//!
//! Devices are identified by name, with a `#n` suffix when several share
//! one; an index into [`input_devices`] or [`output_devices`] is what the
//! device module exposes to callers.

use cpal::traits::{DeviceTrait, HostTrait};
use std::collections::HashMap;
use serde::Serialize;

use crate::error::{AdmError, AdmResult};

/// Snapshot of an audio device's capabilities
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AudioDevice {
    /// Device identifier, unique within one direction
    pub id: String,

    /// Display name
    pub name: String,

    /// Device can capture
    pub is_input: bool,

    /// Device can render
    pub is_output: bool,

    /// Default device for its direction
    pub is_default: bool,

    /// Supported sample rate ranges (min, max)
    pub sample_rates: Vec<(u32, u32)>,

    /// Supported channel counts
    pub channels: Vec<u16>,
}

impl AudioDevice {
    /// Largest supported channel count
    pub fn max_channels(&self) -> u16 {
        self.channels.iter().copied().max().unwrap_or(0)
    }

    /// Whether the device supports two or more channels
    pub fn supports_stereo(&self) -> bool {
        self.max_channels() >= 2
    }
}

/// Direction of a device or stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Input,
    Output,
}

/// Stable identifiers for devices named `names`, in host order.
///
/// The first device with a given name is identified by the name alone;
/// later devices sharing it get a `#n` suffix counting from 2.
pub fn device_ids<'a>(names: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut seen: HashMap<&str, usize> = HashMap::new();
    names
        .into_iter()
        .map(|name| {
            let count = seen.entry(name).or_insert(0);
            *count += 1;
            if *count == 1 {
                name.to_string()
            } else {
                format!("{}#{}", name, count)
            }
        })
        .collect()
}

/// Named devices of the default host for `direction`, with their ids.
fn host_devices(direction: Direction) -> AdmResult<Vec<(String, cpal::Device)>> {
    let host = cpal::default_host();
    let iter: Box<dyn Iterator<Item = cpal::Device>> = match direction {
        Direction::Input => Box::new(host.input_devices()?),
        Direction::Output => Box::new(host.output_devices()?),
    };

    let named: Vec<(String, cpal::Device)> = iter
        .filter_map(|device| device.name().ok().map(|name| (name, device)))
        .collect();
    let ids = device_ids(named.iter().map(|(name, _)| name.as_str()));
    Ok(ids
        .into_iter()
        .zip(named)
        .map(|(id, (_, device))| (id, device))
        .collect())
}

fn describe(id: String, device: &cpal::Device, direction: Direction) -> Option<AudioDevice> {
    let name = device.name().ok()?;

    let mut sample_rates = Vec::new();
    let mut channels = Vec::new();
    let configs: Vec<cpal::SupportedStreamConfigRange> = match direction {
        Direction::Input => device.supported_input_configs().ok()?.collect(),
        Direction::Output => device.supported_output_configs().ok()?.collect(),
    };
    for config in &configs {
        let range = (config.min_sample_rate().0, config.max_sample_rate().0);
        if !sample_rates.contains(&range) {
            sample_rates.push(range);
        }
        if !channels.contains(&config.channels()) {
            channels.push(config.channels());
        }
    }
    channels.sort_unstable();

    Some(AudioDevice {
        id,
        name,
        is_input: direction == Direction::Input,
        is_output: direction == Direction::Output,
        is_default: false,
        sample_rates,
        channels,
    })
}

/// Flag the first device named `default_name` as the default.
fn mark_default(devices: &mut [AudioDevice], default_name: Option<&str>) {
    if let Some(device) = default_name.and_then(|name| devices.iter_mut().find(|d| d.name == name)) {
        device.is_default = true;
    }
}

/// Devices of the default host for one direction, in host order.
pub fn devices(direction: Direction) -> AdmResult<Vec<AudioDevice>> {
    let default_name = default_device(direction).ok().and_then(|d| d.name().ok());

    let mut devices: Vec<AudioDevice> = host_devices(direction)?
        .into_iter()
        .filter_map(|(id, device)| describe(id, &device, direction))
        .collect();
    mark_default(&mut devices, default_name.as_deref());
    Ok(devices)
}

/// Capture devices of the default host
pub fn input_devices() -> AdmResult<Vec<AudioDevice>> {
    devices(Direction::Input)
}

/// Render devices of the default host
pub fn output_devices() -> AdmResult<Vec<AudioDevice>> {
    devices(Direction::Output)
}

/// All devices of the default host; enumeration failures yield an empty list.
pub fn list_devices() -> Vec<AudioDevice> {
    let mut all = input_devices().unwrap_or_else(|e| {
        tracing::warn!("Failed to enumerate input devices: {}", e);
        Vec::new()
    });
    all.extend(output_devices().unwrap_or_else(|e| {
        tracing::warn!("Failed to enumerate output devices: {}", e);
        Vec::new()
    }));
    all
}

/// Resolve a cpal device by id for `direction`.
pub fn get_device_by_id(id: &str, direction: Direction) -> AdmResult<cpal::Device> {
    host_devices(direction)?
        .into_iter()
        .find(|(device_id, _)| device_id == id)
        .map(|(_, device)| device)
        .ok_or(AdmError::NoDevice)
}

/// Default cpal device for `direction`.
pub fn default_device(direction: Direction) -> AdmResult<cpal::Device> {
    let host = cpal::default_host();
    match direction {
        Direction::Input => host.default_input_device(),
        Direction::Output => host.default_output_device(),
    }
    .ok_or(AdmError::NoDevice)
}
