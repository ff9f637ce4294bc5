//! Module without devices
//!
//! Every lifecycle call succeeds and no audio flows. Useful on machines
//! without audio hardware and wherever an audio engine needs a module but
//! no sound.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::{AdmError, AdmResult};
use crate::module::{AudioDeviceModule, AudioLayer, AudioTransport, DeviceName, WindowsDeviceType};

#[cfg(any(feature = "audio-parameters", target_os = "ios"))]
use crate::module::AudioParameters;

/// Audio device module with no devices
#[derive(Debug, Default)]
pub struct DummyAudioDeviceModule {
    initialized: AtomicBool,
    playout_initialized: AtomicBool,
    recording_initialized: AtomicBool,
    playing: AtomicBool,
    recording: AtomicBool,
    speaker_initialized: AtomicBool,
    microphone_initialized: AtomicBool,
}

impl DummyAudioDeviceModule {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AudioDeviceModule for DummyAudioDeviceModule {
    fn active_audio_layer(&self) -> AdmResult<AudioLayer> {
        Ok(AudioLayer::Dummy)
    }

    fn register_audio_callback(&self, _transport: Option<Arc<dyn AudioTransport>>) -> AdmResult<()> {
        Ok(())
    }

    fn init(&self) -> AdmResult<()> {
        self.initialized.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn terminate(&self) -> AdmResult<()> {
        self.initialized.store(false, Ordering::SeqCst);
        self.playout_initialized.store(false, Ordering::SeqCst);
        self.recording_initialized.store(false, Ordering::SeqCst);
        self.playing.store(false, Ordering::SeqCst);
        self.recording.store(false, Ordering::SeqCst);
        self.speaker_initialized.store(false, Ordering::SeqCst);
        self.microphone_initialized.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    fn playout_devices(&self) -> AdmResult<u16> {
        Ok(0)
    }

    fn recording_devices(&self) -> AdmResult<u16> {
        Ok(0)
    }

    fn playout_device_name(&self, index: u16) -> AdmResult<DeviceName> {
        Err(AdmError::InvalidDeviceIndex { index, count: 0 })
    }

    fn recording_device_name(&self, index: u16) -> AdmResult<DeviceName> {
        Err(AdmError::InvalidDeviceIndex { index, count: 0 })
    }

    fn set_playout_device(&self, _index: u16) -> AdmResult<()> {
        Ok(())
    }

    fn set_playout_device_type(&self, _device: WindowsDeviceType) -> AdmResult<()> {
        Ok(())
    }

    fn set_recording_device(&self, _index: u16) -> AdmResult<()> {
        Ok(())
    }

    fn set_recording_device_type(&self, _device: WindowsDeviceType) -> AdmResult<()> {
        Ok(())
    }

    fn playout_is_available(&self) -> AdmResult<bool> {
        Ok(false)
    }

    fn init_playout(&self) -> AdmResult<()> {
        self.playout_initialized.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn playout_is_initialized(&self) -> bool {
        self.playout_initialized.load(Ordering::SeqCst)
    }

    fn recording_is_available(&self) -> AdmResult<bool> {
        Ok(false)
    }

    fn init_recording(&self) -> AdmResult<()> {
        self.recording_initialized.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn recording_is_initialized(&self) -> bool {
        self.recording_initialized.load(Ordering::SeqCst)
    }

    fn start_playout(&self) -> AdmResult<()> {
        self.playing.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn stop_playout(&self) -> AdmResult<()> {
        self.playing.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn playing(&self) -> bool {
        self.playing.load(Ordering::SeqCst)
    }

    fn start_recording(&self) -> AdmResult<()> {
        self.recording.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn stop_recording(&self) -> AdmResult<()> {
        self.recording.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn recording(&self) -> bool {
        self.recording.load(Ordering::SeqCst)
    }

    fn init_speaker(&self) -> AdmResult<()> {
        self.speaker_initialized.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn speaker_is_initialized(&self) -> bool {
        self.speaker_initialized.load(Ordering::SeqCst)
    }

    fn init_microphone(&self) -> AdmResult<()> {
        self.microphone_initialized.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn microphone_is_initialized(&self) -> bool {
        self.microphone_initialized.load(Ordering::SeqCst)
    }

    fn speaker_volume_is_available(&self) -> AdmResult<bool> {
        Ok(false)
    }

    fn set_speaker_volume(&self, _volume: u32) -> AdmResult<()> {
        Err(AdmError::Unsupported("speaker volume"))
    }

    fn speaker_volume(&self) -> AdmResult<u32> {
        Err(AdmError::Unsupported("speaker volume"))
    }

    fn max_speaker_volume(&self) -> AdmResult<u32> {
        Err(AdmError::Unsupported("speaker volume"))
    }

    fn min_speaker_volume(&self) -> AdmResult<u32> {
        Err(AdmError::Unsupported("speaker volume"))
    }

    fn microphone_volume_is_available(&self) -> AdmResult<bool> {
        Ok(false)
    }

    fn set_microphone_volume(&self, _volume: u32) -> AdmResult<()> {
        Err(AdmError::Unsupported("microphone volume"))
    }

    fn microphone_volume(&self) -> AdmResult<u32> {
        Err(AdmError::Unsupported("microphone volume"))
    }

    fn max_microphone_volume(&self) -> AdmResult<u32> {
        Err(AdmError::Unsupported("microphone volume"))
    }

    fn min_microphone_volume(&self) -> AdmResult<u32> {
        Err(AdmError::Unsupported("microphone volume"))
    }

    fn speaker_mute_is_available(&self) -> AdmResult<bool> {
        Ok(false)
    }

    fn set_speaker_mute(&self, _enable: bool) -> AdmResult<()> {
        Err(AdmError::Unsupported("speaker mute"))
    }

    fn speaker_mute(&self) -> AdmResult<bool> {
        Err(AdmError::Unsupported("speaker mute"))
    }

    fn microphone_mute_is_available(&self) -> AdmResult<bool> {
        Ok(false)
    }

    fn set_microphone_mute(&self, _enable: bool) -> AdmResult<()> {
        Err(AdmError::Unsupported("microphone mute"))
    }

    fn microphone_mute(&self) -> AdmResult<bool> {
        Err(AdmError::Unsupported("microphone mute"))
    }

    fn stereo_playout_is_available(&self) -> AdmResult<bool> {
        Ok(false)
    }

    fn set_stereo_playout(&self, enable: bool) -> AdmResult<()> {
        if enable {
            Err(AdmError::Unsupported("stereo playout"))
        } else {
            Ok(())
        }
    }

    fn stereo_playout(&self) -> AdmResult<bool> {
        Ok(false)
    }

    fn stereo_recording_is_available(&self) -> AdmResult<bool> {
        Ok(false)
    }

    fn set_stereo_recording(&self, enable: bool) -> AdmResult<()> {
        if enable {
            Err(AdmError::Unsupported("stereo recording"))
        } else {
            Ok(())
        }
    }

    fn stereo_recording(&self) -> AdmResult<bool> {
        Ok(false)
    }

    fn playout_delay(&self) -> AdmResult<u16> {
        Ok(0)
    }

    fn built_in_aec_is_available(&self) -> bool {
        false
    }

    fn built_in_agc_is_available(&self) -> bool {
        false
    }

    fn built_in_ns_is_available(&self) -> bool {
        false
    }

    fn enable_built_in_aec(&self, _enable: bool) -> AdmResult<()> {
        Err(AdmError::Unsupported("built-in AEC"))
    }

    fn enable_built_in_agc(&self, _enable: bool) -> AdmResult<()> {
        Err(AdmError::Unsupported("built-in AGC"))
    }

    fn enable_built_in_ns(&self, _enable: bool) -> AdmResult<()> {
        Err(AdmError::Unsupported("built-in NS"))
    }

    #[cfg(any(feature = "audio-parameters", target_os = "ios"))]
    fn playout_audio_parameters(&self) -> AdmResult<AudioParameters> {
        Err(AdmError::Unsupported("audio parameters"))
    }

    #[cfg(any(feature = "audio-parameters", target_os = "ios"))]
    fn record_audio_parameters(&self) -> AdmResult<AudioParameters> {
        Err(AdmError::Unsupported("audio parameters"))
    }
}
