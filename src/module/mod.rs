//! Audio device module capability interface
//!
//! An [`AudioDeviceModule`] owns the playout and recording paths of one audio
//! layer: device enumeration and selection, stream lifecycle, volume and
//! mute control, stereo control and built-in voice processing toggles.
//! Audio flows through a registered [`AudioTransport`].
//!
//! All methods take `&self`; implementations are shared behind `Arc` and
//! provide their own interior mutability.

pub mod types;

use std::sync::Arc;

use crate::error::AdmResult;

pub use types::{AudioLayer, DeviceName, WindowsDeviceType};

#[cfg(any(feature = "audio-parameters", target_os = "ios"))]
pub use types::AudioParameters;

/// Sink for recorded audio and source for playout audio.
///
/// Both methods are called with interleaved samples in 10 ms frames.
pub trait AudioTransport: Send + Sync {
    /// A 10 ms frame of recorded audio is available.
    ///
    /// `mic_level` is the current microphone volume level.
    fn recorded_data_is_available(
        &self,
        samples: &[f32],
        channels: u16,
        sample_rate: u32,
        mic_level: u32,
    );

    /// Fill `out` with playout audio. Returns the number of samples written;
    /// the remainder is played as silence.
    fn need_more_play_data(&self, out: &mut [f32], channels: u16, sample_rate: u32) -> usize;
}

/// Capability set of an audio device module
pub trait AudioDeviceModule: Send + Sync {
    // Retrieve the currently utilized audio layer
    fn active_audio_layer(&self) -> AdmResult<AudioLayer>;

    // Full-duplex transportation of PCM audio
    fn register_audio_callback(&self, transport: Option<Arc<dyn AudioTransport>>) -> AdmResult<()>;

    // Main initialization and termination
    fn init(&self) -> AdmResult<()>;
    fn terminate(&self) -> AdmResult<()>;
    fn initialized(&self) -> bool;

    // Device enumeration
    fn playout_devices(&self) -> AdmResult<u16>;
    fn recording_devices(&self) -> AdmResult<u16>;
    fn playout_device_name(&self, index: u16) -> AdmResult<DeviceName>;
    fn recording_device_name(&self, index: u16) -> AdmResult<DeviceName>;

    // Device selection
    fn set_playout_device(&self, index: u16) -> AdmResult<()>;
    fn set_playout_device_type(&self, device: WindowsDeviceType) -> AdmResult<()>;
    fn set_recording_device(&self, index: u16) -> AdmResult<()>;
    fn set_recording_device_type(&self, device: WindowsDeviceType) -> AdmResult<()>;

    // Audio transport initialization
    fn playout_is_available(&self) -> AdmResult<bool>;
    fn init_playout(&self) -> AdmResult<()>;
    fn playout_is_initialized(&self) -> bool;
    fn recording_is_available(&self) -> AdmResult<bool>;
    fn init_recording(&self) -> AdmResult<()>;
    fn recording_is_initialized(&self) -> bool;

    // Audio transport control
    fn start_playout(&self) -> AdmResult<()>;
    fn stop_playout(&self) -> AdmResult<()>;
    fn playing(&self) -> bool;
    fn start_recording(&self) -> AdmResult<()>;
    fn stop_recording(&self) -> AdmResult<()>;
    fn recording(&self) -> bool;

    // Audio mixer initialization
    fn init_speaker(&self) -> AdmResult<()>;
    fn speaker_is_initialized(&self) -> bool;
    fn init_microphone(&self) -> AdmResult<()>;
    fn microphone_is_initialized(&self) -> bool;

    // Speaker volume controls
    fn speaker_volume_is_available(&self) -> AdmResult<bool>;
    fn set_speaker_volume(&self, volume: u32) -> AdmResult<()>;
    fn speaker_volume(&self) -> AdmResult<u32>;
    fn max_speaker_volume(&self) -> AdmResult<u32>;
    fn min_speaker_volume(&self) -> AdmResult<u32>;

    // Microphone volume controls
    fn microphone_volume_is_available(&self) -> AdmResult<bool>;
    fn set_microphone_volume(&self, volume: u32) -> AdmResult<()>;
    fn microphone_volume(&self) -> AdmResult<u32>;
    fn max_microphone_volume(&self) -> AdmResult<u32>;
    fn min_microphone_volume(&self) -> AdmResult<u32>;

    // Speaker mute control
    fn speaker_mute_is_available(&self) -> AdmResult<bool>;
    fn set_speaker_mute(&self, enable: bool) -> AdmResult<()>;
    fn speaker_mute(&self) -> AdmResult<bool>;

    // Microphone mute control
    fn microphone_mute_is_available(&self) -> AdmResult<bool>;
    fn set_microphone_mute(&self, enable: bool) -> AdmResult<()>;
    fn microphone_mute(&self) -> AdmResult<bool>;

    // Stereo support
    fn stereo_playout_is_available(&self) -> AdmResult<bool>;
    fn set_stereo_playout(&self, enable: bool) -> AdmResult<()>;
    fn stereo_playout(&self) -> AdmResult<bool>;
    fn stereo_recording_is_available(&self) -> AdmResult<bool>;
    fn set_stereo_recording(&self, enable: bool) -> AdmResult<()>;
    fn stereo_recording(&self) -> AdmResult<bool>;

    /// Playout delay in milliseconds
    fn playout_delay(&self) -> AdmResult<u16>;

    // Built-in voice processing
    fn built_in_aec_is_available(&self) -> bool;
    fn built_in_agc_is_available(&self) -> bool;
    fn built_in_ns_is_available(&self) -> bool;
    fn enable_built_in_aec(&self, enable: bool) -> AdmResult<()>;
    fn enable_built_in_agc(&self, enable: bool) -> AdmResult<()>;
    fn enable_built_in_ns(&self, enable: bool) -> AdmResult<()>;

    #[cfg(any(feature = "audio-parameters", target_os = "ios"))]
    fn playout_audio_parameters(&self) -> AdmResult<AudioParameters>;

    #[cfg(any(feature = "audio-parameters", target_os = "ios"))]
    fn record_audio_parameters(&self) -> AdmResult<AudioParameters>;
}
