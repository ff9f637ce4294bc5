//! Types shared by audio device module implementations

use serde::{Deserialize, Serialize};

use crate::constants::{MAX_DEVICE_NAME_SIZE, MAX_GUID_SIZE};

/// Audio layer a module is built on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum AudioLayer {
    /// Whatever the current platform uses by default
    #[default]
    PlatformDefault,
    WindowsCoreAudio,
    WindowsCoreAudio2,
    LinuxAlsa,
    LinuxPulse,
    AndroidJava,
    AndroidOpenSles,
    AndroidJavaInputAndOpenSlesOutput,
    AndroidAAudio,
    AndroidJavaInputAndAAudioOutput,
    /// No devices; lifecycle calls succeed and no audio flows
    Dummy,
}

impl AudioLayer {
    /// Audio layer for a cpal host name (`HostId::name`).
    ///
    /// Hosts without a matching layer report `PlatformDefault`.
    pub fn from_host_name(name: &str) -> Self {
        match name {
            "WASAPI" | "Wasapi" => AudioLayer::WindowsCoreAudio,
            "ALSA" | "Alsa" => AudioLayer::LinuxAlsa,
            "PulseAudio" | "Pulse" => AudioLayer::LinuxPulse,
            "AAudio" | "Oboe" => AudioLayer::AndroidAAudio,
            _ => AudioLayer::PlatformDefault,
        }
    }
}

/// Windows default-device roles usable in place of an index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WindowsDeviceType {
    DefaultCommunicationDevice,
    DefaultDevice,
}

/// Name and unique identifier of a playout or recording device
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DeviceName {
    /// Human-readable name
    pub name: String,

    /// Stable identifier (may be empty)
    pub guid: String,
}

impl DeviceName {
    /// Create a device name, truncating both fields to their size limits.
    pub fn new(name: impl Into<String>, guid: impl Into<String>) -> Self {
        Self {
            name: truncate_utf8(name.into(), MAX_DEVICE_NAME_SIZE),
            guid: truncate_utf8(guid.into(), MAX_GUID_SIZE),
        }
    }
}

/// Truncate to at most `max_len` bytes without splitting a character.
fn truncate_utf8(mut s: String, max_len: usize) -> String {
    if s.len() > max_len {
        let mut end = max_len;
        while !s.is_char_boundary(end) {
            end -= 1;
        }
        s.truncate(end);
    }
    s
}

/// Stream parameters of an initialized playout or recording path
#[cfg(any(feature = "audio-parameters", target_os = "ios"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AudioParameters {
    /// Sample rate in Hz
    pub sample_rate: u32,

    /// Channel count
    pub channels: u16,

    /// Frames per hardware buffer (0 when left to the backend)
    pub frames_per_buffer: u32,
}

#[cfg(any(feature = "audio-parameters", target_os = "ios"))]
impl AudioParameters {
    /// Frames in one 10 ms transport buffer.
    pub fn frames_per_10ms_buffer(&self) -> u32 {
        self.sample_rate * crate::constants::FRAME_DURATION_MS / 1000
    }

    /// Whether the parameters describe a usable stream.
    pub fn is_valid(&self) -> bool {
        self.sample_rate > 0 && self.channels > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_name_truncation() {
        let long = "m".repeat(MAX_DEVICE_NAME_SIZE + 20);
        let name = DeviceName::new(long, "guid");
        assert_eq!(name.name.len(), MAX_DEVICE_NAME_SIZE);
        assert_eq!(name.guid, "guid");
    }

    #[test]
    fn test_truncation_respects_char_boundary() {
        // 'é' is two bytes, so the cut at 128 would land mid-character
        let s = format!("a{}", "é".repeat(MAX_GUID_SIZE));
        let name = DeviceName::new("mic", s);
        assert!(name.guid.len() <= MAX_GUID_SIZE);
        assert_eq!(name.guid.len(), MAX_GUID_SIZE - 1);
    }

    #[test]
    fn test_layer_from_host_name() {
        assert_eq!(AudioLayer::from_host_name("ALSA"), AudioLayer::LinuxAlsa);
        assert_eq!(AudioLayer::from_host_name("WASAPI"), AudioLayer::WindowsCoreAudio);
        assert_eq!(AudioLayer::from_host_name("CoreAudio"), AudioLayer::PlatformDefault);
    }

    #[cfg(any(feature = "audio-parameters", target_os = "ios"))]
    #[test]
    fn test_audio_parameters() {
        let params = AudioParameters {
            sample_rate: 48000,
            channels: 1,
            frames_per_buffer: 0,
        };
        assert!(params.is_valid());
        assert_eq!(params.frames_per_10ms_buffer(), 480);
        assert!(!AudioParameters::default().is_valid());
    }
}
