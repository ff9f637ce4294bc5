//! Configuration management

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::path::PathBuf;

use crate::module::AudioLayer;

/// Adapter configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AdapterConfig {
    /// Recording policy applied by the adapter
    pub recording: RecordingConfig,

    /// Audio layer and stream configuration
    pub audio: AudioConfig,
}

/// Recording configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordingConfig {
    /// Recording device index
    pub mic_index: u16,

    /// Recording device name; takes precedence over `mic_index` when the
    /// device is present
    pub mic_name: Option<String>,

    /// Fraction of the maximum mic volume applied once recording is
    /// initialized (0.0 - 1.0)
    pub initial_mic_volume_fraction: f32,
}

impl Default for RecordingConfig {
    fn default() -> Self {
        Self {
            mic_index: 0,
            mic_name: None,
            initial_mic_volume_fraction: 1.0,
        }
    }
}

/// Audio configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Audio layer to create the module for
    pub layer: AudioLayer,

    /// Preferred sample rate; the device default is used when unset or
    /// unsupported
    pub sample_rate: Option<u32>,

    /// Fixed hardware buffer size in frames; left to the backend when unset
    pub buffer_frames: Option<u32>,
}

impl AdapterConfig {
    /// Load configuration from file
    pub fn load(path: &Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> crate::Result<Self> {
        toml::from_str(content).map_err(|e| crate::Error::Config(e.to_string()))
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> crate::Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::Error::Config(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get default config file path
    pub fn default_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "audio-device-adapter", "adm")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AdapterConfig::default();
        assert_eq!(config.recording.mic_index, 0);
        assert_eq!(config.recording.initial_mic_volume_fraction, 1.0);
        assert_eq!(config.audio.layer, AudioLayer::PlatformDefault);
    }

    #[test]
    fn test_partial_toml() {
        let config = AdapterConfig::from_toml(
            r#"
            [recording]
            mic_index = 2
            initial_mic_volume_fraction = 0.4

            [audio]
            layer = "Dummy"
            buffer_frames = 256
            "#,
        )
        .unwrap();

        assert_eq!(config.recording.mic_index, 2);
        assert_eq!(config.recording.mic_name, None);
        assert_eq!(config.recording.initial_mic_volume_fraction, 0.4);
        assert_eq!(config.audio.layer, AudioLayer::Dummy);
        assert_eq!(config.audio.buffer_frames, Some(256));
        assert_eq!(config.audio.sample_rate, None);
    }

    #[test]
    fn test_invalid_toml() {
        let err = AdapterConfig::from_toml("[recording]\nmic_index = \"first\"").unwrap_err();
        assert!(matches!(err, crate::Error::Config(_)));
    }

    #[test]
    fn test_save_and_load() {
        let path = std::env::temp_dir()
            .join(format!("adm-config-{}", std::process::id()))
            .join("config.toml");

        let mut config = AdapterConfig::default();
        config.recording.mic_name = Some("USB Microphone".to_string());
        config.audio.sample_rate = Some(44100);
        config.save(&path).unwrap();

        let loaded = AdapterConfig::load(&path).unwrap();
        assert_eq!(loaded.recording.mic_name.as_deref(), Some("USB Microphone"));
        assert_eq!(loaded.audio, config.audio);

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }
}
