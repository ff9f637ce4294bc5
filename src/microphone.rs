//! Host-side microphone controls
//!
//! [`Microphone`] drives the recording policies of an [`AudioDeviceAdapter`]
//! by device name and volume fraction instead of raw indices and levels.

use std::sync::Arc;

use crate::adapter::{scaled_volume, AudioDeviceAdapter};
use crate::config::AdapterConfig;
use crate::error::{AdmResult, Error, Result};
use crate::module::AudioDeviceModule;

/// Microphone selection and volume for an adapter
#[derive(Clone)]
pub struct Microphone {
    adapter: Arc<AudioDeviceAdapter>,
}

impl Microphone {
    pub fn new(adapter: Arc<AudioDeviceAdapter>) -> Self {
        Self { adapter }
    }

    /// Build an adapter from `config`, initialize it and select the
    /// configured microphone by name if one is set. A named microphone that
    /// is not present leaves the configured `mic_index` in place.
    ///
    /// # Panics
    ///
    /// Panics if no module is available for the configured layer.
    pub fn from_config(config: &AdapterConfig) -> Result<Self> {
        let adapter = Arc::new(AudioDeviceAdapter::from_config(config));
        adapter.init()?;

        let microphone = Self::new(adapter);
        if let Some(name) = &config.recording.mic_name {
            match microphone.select_device(name) {
                Ok(()) => {}
                Err(Error::DeviceNotFound(_)) => {
                    tracing::warn!(
                        "Microphone {} not found, using index {}",
                        name,
                        config.recording.mic_index
                    );
                }
                Err(e) => return Err(e),
            }
        }
        Ok(microphone)
    }

    pub fn adapter(&self) -> &Arc<AudioDeviceAdapter> {
        &self.adapter
    }

    /// Names of the recording devices, in index order
    pub fn devices(&self) -> AdmResult<Vec<String>> {
        let count = self.adapter.recording_devices()?;
        (0..count)
            .map(|index| self.adapter.recording_device_name(index).map(|d| d.name))
            .collect()
    }

    /// Use the recording device called `name` for the next recording init.
    pub fn select_device(&self, name: &str) -> Result<()> {
        let index = self
            .devices()?
            .iter()
            .position(|device| device == name)
            .ok_or_else(|| Error::DeviceNotFound(name.to_string()))?;

        tracing::info!("Selected microphone {} ({})", name, index);
        self.adapter.set_selected_mic_index(index as u16);
        Ok(())
    }

    /// Set the microphone volume as a fraction of the device maximum.
    ///
    /// The fraction is stored for the next recording init and applied at once
    /// when recording is already initialized.
    pub fn set_volume(&self, fraction: f32) -> AdmResult<()> {
        self.adapter.set_initial_mic_volume_fraction(fraction);
        if !self.adapter.recording_is_initialized() {
            return Ok(());
        }

        let max_volume = self.adapter.max_microphone_volume()?;
        self.adapter
            .set_microphone_volume(scaled_volume(fraction, max_volume))
    }
}
