//! Forwarding audio device module with recording policies
//!
//! [`AudioDeviceAdapter`] wraps a platform module and forwards every call to
//! it. Recording initialization is the only intercepted operation: it first
//! selects the configured microphone, and once the underlying init succeeds
//! it primes the microphone volume to a fraction of the device maximum.

use std::sync::atomic::{AtomicU16, AtomicU32, Ordering};
use std::sync::Arc;

use crate::config::AdapterConfig;
use crate::error::AdmResult;
use crate::factory::{ModuleFactory, PlatformModuleFactory};
use crate::module::{AudioDeviceModule, AudioLayer, AudioTransport, DeviceName, WindowsDeviceType};
use crate::task_queue::DefaultTaskQueueFactory;

#[cfg(any(feature = "audio-parameters", target_os = "ios"))]
use crate::module::AudioParameters;

/// Audio device module that forwards to an underlying module
pub struct AudioDeviceAdapter {
    /// Wrapped module, fixed at construction
    inner: Arc<dyn AudioDeviceModule>,

    /// Recording device used by the next `init_recording`
    mic_index: AtomicU16,

    /// Fraction of the maximum mic volume applied after `init_recording`
    /// (f32 bits)
    initial_mic_volume_fraction: AtomicU32,
}

impl AudioDeviceAdapter {
    /// Create an adapter around the platform-default module.
    ///
    /// # Panics
    ///
    /// Panics if no module is available for the platform.
    pub fn new() -> Self {
        Self::with_factory(&PlatformModuleFactory::default(), AudioLayer::PlatformDefault)
    }

    /// Create an adapter around a module from `factory`.
    ///
    /// # Panics
    ///
    /// Panics if the factory returns no module.
    pub fn with_factory(factory: &dyn ModuleFactory, layer: AudioLayer) -> Self {
        let inner = match factory.create(layer, &DefaultTaskQueueFactory) {
            Some(module) => module,
            None => panic!("no audio device module available for {:?}", layer),
        };

        tracing::info!("Audio device adapter created for {:?}", layer);
        Self::from_module(inner)
    }

    /// Create an adapter around the layer named in `config` and apply its
    /// recording settings.
    ///
    /// # Panics
    ///
    /// Panics if no module is available for the configured layer.
    pub fn from_config(config: &AdapterConfig) -> Self {
        let factory = PlatformModuleFactory::new(config.audio.clone());
        let adapter = Self::with_factory(&factory, config.audio.layer);
        adapter.set_selected_mic_index(config.recording.mic_index);
        adapter.set_initial_mic_volume_fraction(config.recording.initial_mic_volume_fraction);
        adapter
    }

    /// Wrap an existing module.
    pub fn from_module(inner: Arc<dyn AudioDeviceModule>) -> Self {
        Self {
            inner,
            mic_index: AtomicU16::new(0),
            initial_mic_volume_fraction: AtomicU32::new(1.0f32.to_bits()),
        }
    }

    /// Select the recording device for the next `init_recording`.
    pub fn set_selected_mic_index(&self, index: u16) {
        self.mic_index.store(index, Ordering::Relaxed);
    }

    /// Recording device used by the next `init_recording`
    pub fn selected_mic_index(&self) -> u16 {
        self.mic_index.load(Ordering::Relaxed)
    }

    /// Set the fraction of the maximum microphone volume applied after the
    /// next successful `init_recording`.
    pub fn set_initial_mic_volume_fraction(&self, fraction: f32) {
        self.initial_mic_volume_fraction
            .store(fraction.to_bits(), Ordering::Relaxed);
    }

    /// Fraction applied after the next successful `init_recording`
    pub fn initial_mic_volume_fraction(&self) -> f32 {
        f32::from_bits(self.initial_mic_volume_fraction.load(Ordering::Relaxed))
    }

    /// Wrapped module
    pub fn inner(&self) -> &Arc<dyn AudioDeviceModule> {
        &self.inner
    }
}

impl Default for AudioDeviceAdapter {
    fn default() -> Self {
        Self::new()
    }
}

/// Volume level for `fraction` of `max_volume`, rounded to nearest.
pub fn scaled_volume(fraction: f32, max_volume: u32) -> u32 {
    let fraction = if fraction.is_nan() { 0.0 } else { fraction.clamp(0.0, 1.0) };
    (fraction as f64 * max_volume as f64).round() as u32
}

impl AudioDeviceModule for AudioDeviceAdapter {
    fn active_audio_layer(&self) -> AdmResult<AudioLayer> {
        self.inner.active_audio_layer()
    }

    fn register_audio_callback(&self, transport: Option<Arc<dyn AudioTransport>>) -> AdmResult<()> {
        self.inner.register_audio_callback(transport)
    }

    fn init(&self) -> AdmResult<()> {
        self.inner.init()
    }

    fn terminate(&self) -> AdmResult<()> {
        self.inner.terminate()
    }

    fn initialized(&self) -> bool {
        self.inner.initialized()
    }

    fn playout_devices(&self) -> AdmResult<u16> {
        self.inner.playout_devices()
    }

    fn recording_devices(&self) -> AdmResult<u16> {
        self.inner.recording_devices()
    }

    fn playout_device_name(&self, index: u16) -> AdmResult<DeviceName> {
        self.inner.playout_device_name(index)
    }

    fn recording_device_name(&self, index: u16) -> AdmResult<DeviceName> {
        self.inner.recording_device_name(index)
    }

    fn set_playout_device(&self, index: u16) -> AdmResult<()> {
        self.inner.set_playout_device(index)
    }

    fn set_playout_device_type(&self, device: WindowsDeviceType) -> AdmResult<()> {
        self.inner.set_playout_device_type(device)
    }

    fn set_recording_device(&self, index: u16) -> AdmResult<()> {
        self.inner.set_recording_device(index)
    }

    fn set_recording_device_type(&self, device: WindowsDeviceType) -> AdmResult<()> {
        self.inner.set_recording_device_type(device)
    }

    fn playout_is_available(&self) -> AdmResult<bool> {
        self.inner.playout_is_available()
    }

    fn init_playout(&self) -> AdmResult<()> {
        self.inner.init_playout()
    }

    fn playout_is_initialized(&self) -> bool {
        self.inner.playout_is_initialized()
    }

    fn recording_is_available(&self) -> AdmResult<bool> {
        self.inner.recording_is_available()
    }

    fn init_recording(&self) -> AdmResult<()> {
        let mic_index = self.selected_mic_index();
        // A bad index surfaces through the underlying init below
        let _ = self.inner.set_recording_device(mic_index);

        let status = self.inner.init_recording();
        if status.is_ok() {
            match self.inner.max_microphone_volume() {
                Ok(max_volume) => {
                    let volume = scaled_volume(self.initial_mic_volume_fraction(), max_volume);
                    tracing::debug!(
                        "Recording initialized on device {}, mic volume {}/{}",
                        mic_index,
                        volume,
                        max_volume
                    );
                    let _ = self.inner.set_microphone_volume(volume);
                }
                Err(e) => {
                    tracing::debug!("Skipping mic volume priming: {}", e);
                }
            }
        }

        status
    }

    fn recording_is_initialized(&self) -> bool {
        self.inner.recording_is_initialized()
    }

    fn start_playout(&self) -> AdmResult<()> {
        self.inner.start_playout()
    }

    fn stop_playout(&self) -> AdmResult<()> {
        self.inner.stop_playout()
    }

    fn playing(&self) -> bool {
        self.inner.playing()
    }

    fn start_recording(&self) -> AdmResult<()> {
        self.inner.start_recording()
    }

    fn stop_recording(&self) -> AdmResult<()> {
        self.inner.stop_recording()
    }

    fn recording(&self) -> bool {
        self.inner.recording()
    }

    fn init_speaker(&self) -> AdmResult<()> {
        self.inner.init_speaker()
    }

    fn speaker_is_initialized(&self) -> bool {
        self.inner.speaker_is_initialized()
    }

    fn init_microphone(&self) -> AdmResult<()> {
        self.inner.init_microphone()
    }

    fn microphone_is_initialized(&self) -> bool {
        self.inner.microphone_is_initialized()
    }

    fn speaker_volume_is_available(&self) -> AdmResult<bool> {
        self.inner.speaker_volume_is_available()
    }

    fn set_speaker_volume(&self, volume: u32) -> AdmResult<()> {
        self.inner.set_speaker_volume(volume)
    }

    fn speaker_volume(&self) -> AdmResult<u32> {
        self.inner.speaker_volume()
    }

    fn max_speaker_volume(&self) -> AdmResult<u32> {
        self.inner.max_speaker_volume()
    }

    fn min_speaker_volume(&self) -> AdmResult<u32> {
        self.inner.min_speaker_volume()
    }

    fn microphone_volume_is_available(&self) -> AdmResult<bool> {
        self.inner.microphone_volume_is_available()
    }

    fn set_microphone_volume(&self, volume: u32) -> AdmResult<()> {
        self.inner.set_microphone_volume(volume)
    }

    fn microphone_volume(&self) -> AdmResult<u32> {
        self.inner.microphone_volume()
    }

    fn max_microphone_volume(&self) -> AdmResult<u32> {
        self.inner.max_microphone_volume()
    }

    fn min_microphone_volume(&self) -> AdmResult<u32> {
        self.inner.min_microphone_volume()
    }

    fn speaker_mute_is_available(&self) -> AdmResult<bool> {
        self.inner.speaker_mute_is_available()
    }

    fn set_speaker_mute(&self, enable: bool) -> AdmResult<()> {
        self.inner.set_speaker_mute(enable)
    }

    fn speaker_mute(&self) -> AdmResult<bool> {
        self.inner.speaker_mute()
    }

    fn microphone_mute_is_available(&self) -> AdmResult<bool> {
        self.inner.microphone_mute_is_available()
    }

    fn set_microphone_mute(&self, enable: bool) -> AdmResult<()> {
        self.inner.set_microphone_mute(enable)
    }

    fn microphone_mute(&self) -> AdmResult<bool> {
        self.inner.microphone_mute()
    }

    fn stereo_playout_is_available(&self) -> AdmResult<bool> {
        self.inner.stereo_playout_is_available()
    }

    fn set_stereo_playout(&self, enable: bool) -> AdmResult<()> {
        self.inner.set_stereo_playout(enable)
    }

    fn stereo_playout(&self) -> AdmResult<bool> {
        self.inner.stereo_playout()
    }

    fn stereo_recording_is_available(&self) -> AdmResult<bool> {
        self.inner.stereo_recording_is_available()
    }

    fn set_stereo_recording(&self, enable: bool) -> AdmResult<()> {
        self.inner.set_stereo_recording(enable)
    }

    fn stereo_recording(&self) -> AdmResult<bool> {
        self.inner.stereo_recording()
    }

    fn playout_delay(&self) -> AdmResult<u16> {
        self.inner.playout_delay()
    }

    fn built_in_aec_is_available(&self) -> bool {
        self.inner.built_in_aec_is_available()
    }

    fn built_in_agc_is_available(&self) -> bool {
        self.inner.built_in_agc_is_available()
    }

    fn built_in_ns_is_available(&self) -> bool {
        self.inner.built_in_ns_is_available()
    }

    fn enable_built_in_aec(&self, enable: bool) -> AdmResult<()> {
        self.inner.enable_built_in_aec(enable)
    }

    fn enable_built_in_agc(&self, enable: bool) -> AdmResult<()> {
        self.inner.enable_built_in_agc(enable)
    }

    fn enable_built_in_ns(&self, enable: bool) -> AdmResult<()> {
        self.inner.enable_built_in_ns(enable)
    }

    #[cfg(any(feature = "audio-parameters", target_os = "ios"))]
    fn playout_audio_parameters(&self) -> AdmResult<AudioParameters> {
        self.inner.playout_audio_parameters()
    }

    #[cfg(any(feature = "audio-parameters", target_os = "ios"))]
    fn record_audio_parameters(&self) -> AdmResult<AudioParameters> {
        self.inner.record_audio_parameters()
    }
}
