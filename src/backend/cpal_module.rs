//! Platform-default audio device module on top of cpal
//!
//! Device lists are snapshotted by `init`; indices refer to those
//! snapshots. Recording and playout each run on their own stream thread.
//! Recorded audio is cut into 10 ms frames and handed to the transport on
//! the module's task queue, off the real-time callback.

use cpal::traits::DeviceTrait;
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;

use crate::backend::device::{self, AudioDevice, Direction};
use crate::backend::frames::{frame_len, remix, FrameChunker, PlayoutBuffer};
use crate::backend::stream::{StreamHandle, StreamSettings};
use crate::backend::volume::SoftwareVolume;
use crate::config::AudioConfig;
use crate::constants::{DEFAULT_PLAYOUT_DELAY_MS, RECORDING_TASK_QUEUE};
use crate::error::{AdmError, AdmResult};
use crate::module::{AudioDeviceModule, AudioLayer, AudioTransport, DeviceName, WindowsDeviceType};
use crate::task_queue::{TaskQueue, TaskQueueFactory};

#[cfg(any(feature = "audio-parameters", target_os = "ios"))]
use crate::module::AudioParameters;

type SharedTransport = Arc<RwLock<Option<Arc<dyn AudioTransport>>>>;

/// Which device a stream should open
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DeviceSelection {
    /// The host's default device
    Default,
    /// Index into the device snapshot
    Index(u16),
}

/// Mutable state of one direction (recording or playout)
struct PathState {
    /// Device snapshot taken by `init`
    devices: Vec<AudioDevice>,

    /// Selected device
    selection: DeviceSelection,

    /// Resolved stream settings, present once initialized
    settings: Option<StreamSettings>,

    /// Running stream
    stream: Option<StreamHandle>,

    /// Mixer (speaker or microphone) initialized
    mixer_initialized: bool,

    /// Exchange two channels with the transport
    stereo: bool,
}

impl PathState {
    fn new() -> Self {
        Self {
            devices: Vec::new(),
            selection: DeviceSelection::Default,
            settings: None,
            stream: None,
            mixer_initialized: false,
            stereo: false,
        }
    }

    fn device_count(&self) -> u16 {
        self.devices.len().min(u16::MAX as usize) as u16
    }

    fn check_index(&self, index: u16) -> AdmResult<&AudioDevice> {
        self.devices
            .get(index as usize)
            .ok_or(AdmError::InvalidDeviceIndex {
                index,
                count: self.device_count(),
            })
    }

    fn selected_device(&self) -> AdmResult<&AudioDevice> {
        match self.selection {
            DeviceSelection::Index(index) => self.check_index(index),
            DeviceSelection::Default => self
                .devices
                .iter()
                .find(|d| d.is_default)
                .or_else(|| self.devices.first())
                .ok_or(AdmError::NoDevice),
        }
    }

    fn select(&mut self, selection: DeviceSelection) -> AdmResult<()> {
        if self.settings.is_some() {
            return Err(AdmError::InvalidState("device in use"));
        }
        if let DeviceSelection::Index(index) = selection {
            self.check_index(index)?;
        }
        self.selection = selection;
        Ok(())
    }

    fn stop(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            stream.stop();
        }
        self.settings = None;
    }

    fn is_streaming(&self) -> bool {
        self.stream.as_ref().map(|s| s.is_running()).unwrap_or(false)
    }
}

struct State {
    initialized: bool,
    recording: PathState,
    playout: PathState,
}

/// Audio device module backed by the default cpal host
pub struct CpalAudioDeviceModule {
    /// Layer of the default host
    host_layer: AudioLayer,

    /// Stream preferences
    config: AudioConfig,

    /// Device and stream state
    state: Mutex<State>,

    /// Registered transport, shared with stream callbacks
    transport: SharedTransport,

    /// Delivers recorded frames to the transport
    task_queue: Arc<dyn TaskQueue>,

    /// Software microphone level
    mic_volume: Arc<SoftwareVolume>,

    /// Software speaker level
    speaker_volume: Arc<SoftwareVolume>,
}

impl CpalAudioDeviceModule {
    /// Create a module for the default host. Devices are not touched until
    /// `init`.
    pub fn new(config: AudioConfig, task_queue_factory: &dyn TaskQueueFactory) -> Self {
        let host = cpal::default_host();
        let host_layer = AudioLayer::from_host_name(host.id().name());
        tracing::info!("Created cpal audio device module on {}", host.id().name());

        Self {
            host_layer,
            config,
            state: Mutex::new(State {
                initialized: false,
                recording: PathState::new(),
                playout: PathState::new(),
            }),
            transport: Arc::new(RwLock::new(None)),
            task_queue: Arc::from(task_queue_factory.create_task_queue(RECORDING_TASK_QUEUE)),
            mic_volume: Arc::new(SoftwareVolume::new()),
            speaker_volume: Arc::new(SoftwareVolume::new()),
        }
    }

    /// Layer of the default cpal host
    pub fn host_layer(&self) -> AudioLayer {
        self.host_layer
    }

    fn with_state<T>(&self, f: impl FnOnce(&mut State) -> AdmResult<T>) -> AdmResult<T> {
        let mut state = self.state.lock();
        if !state.initialized {
            return Err(AdmError::NotInitialized);
        }
        f(&mut state)
    }

    /// Resolve stream settings for the selected device of `path`.
    fn resolve_settings(&self, path: &PathState, direction: Direction) -> AdmResult<StreamSettings> {
        let selected = path.selected_device()?;
        let device = device::get_device_by_id(&selected.id, direction)?;

        let default_config = match direction {
            Direction::Input => device.default_input_config()?,
            Direction::Output => device.default_output_config()?,
        };

        let sample_rate = match self.config.sample_rate {
            Some(rate) if selected.sample_rates.iter().any(|(lo, hi)| (*lo..=*hi).contains(&rate)) => rate,
            Some(rate) => {
                tracing::warn!(
                    "{} does not support {} Hz, using {} Hz",
                    selected.name,
                    rate,
                    default_config.sample_rate().0
                );
                default_config.sample_rate().0
            }
            None => default_config.sample_rate().0,
        };

        Ok(StreamSettings {
            device_id: selected.id.clone(),
            config: cpal::StreamConfig {
                channels: default_config.channels(),
                sample_rate: cpal::SampleRate(sample_rate),
                buffer_size: match self.config.buffer_frames {
                    Some(frames) => cpal::BufferSize::Fixed(frames),
                    None => cpal::BufferSize::Default,
                },
            },
            sample_format: default_config.sample_format(),
            transport_channels: if path.stereo { 2 } else { 1 },
        })
    }

    fn start_capture(&self, settings: StreamSettings) -> AdmResult<StreamHandle> {
        let sample_rate = settings.sample_rate();
        let device_channels = settings.device_channels();
        let channels = settings.transport_channels;

        let transport = self.transport.clone();
        let task_queue = self.task_queue.clone();
        let mic_volume = self.mic_volume.clone();
        let mut chunker = FrameChunker::new(frame_len(sample_rate, channels));
        let mut mixed = Vec::new();

        StreamHandle::spawn_input("adm-recording-stream", settings, move |samples| {
            remix(samples, device_channels, channels, &mut mixed);
            chunker.push(&mixed, |mut frame| {
                mic_volume.apply(&mut frame);

                let transport = transport.read().clone();
                if let Some(transport) = transport {
                    let mic_level = mic_volume.level();
                    task_queue.post_task(Box::new(move || {
                        transport.recorded_data_is_available(&frame, channels, sample_rate, mic_level);
                    }));
                }
            });
        })
    }

    fn start_render(&self, settings: StreamSettings) -> AdmResult<StreamHandle> {
        let sample_rate = settings.sample_rate();
        let device_channels = settings.device_channels() as usize;
        let channels = settings.transport_channels;

        let transport = self.transport.clone();
        let speaker_volume = self.speaker_volume.clone();
        let mut buffer = PlayoutBuffer::new(frame_len(sample_rate, channels));
        let mut pending: Vec<f32> = Vec::new();
        let mut mixed: Vec<f32> = Vec::new();

        StreamHandle::spawn_output("adm-playout-stream", settings, move |out| {
            let transport = transport.read().clone();
            let frames = out.len() / device_channels.max(1);

            pending.clear();
            pending.resize(frames * channels as usize, 0.0);
            buffer.fill(&mut pending, |frame| match &transport {
                Some(transport) => transport.need_more_play_data(frame, channels, sample_rate),
                None => 0,
            });

            remix(&pending, channels, device_channels as u16, &mut mixed);
            let n = mixed.len().min(out.len());
            out[..n].copy_from_slice(&mixed[..n]);
            out[n..].fill(0.0);
            speaker_volume.apply(out);
        })
    }
}

impl AudioDeviceModule for CpalAudioDeviceModule {
    fn active_audio_layer(&self) -> AdmResult<AudioLayer> {
        Ok(self.host_layer)
    }

    fn register_audio_callback(&self, transport: Option<Arc<dyn AudioTransport>>) -> AdmResult<()> {
        *self.transport.write() = transport;
        Ok(())
    }

    fn init(&self) -> AdmResult<()> {
        let mut state = self.state.lock();
        if state.initialized {
            return Ok(());
        }

        state.recording.devices = device::input_devices()?;
        state.playout.devices = device::output_devices()?;
        state.initialized = true;

        tracing::info!(
            "Audio device module initialized: {} recording, {} playout devices",
            state.recording.devices.len(),
            state.playout.devices.len()
        );
        Ok(())
    }

    fn terminate(&self) -> AdmResult<()> {
        let mut state = self.state.lock();
        if !state.initialized {
            return Ok(());
        }

        state.recording.stop();
        state.playout.stop();
        state.recording.mixer_initialized = false;
        state.playout.mixer_initialized = false;
        state.initialized = false;

        tracing::info!("Audio device module terminated");
        Ok(())
    }

    fn initialized(&self) -> bool {
        self.state.lock().initialized
    }

    fn playout_devices(&self) -> AdmResult<u16> {
        self.with_state(|state| Ok(state.playout.device_count()))
    }

    fn recording_devices(&self) -> AdmResult<u16> {
        self.with_state(|state| Ok(state.recording.device_count()))
    }

    fn playout_device_name(&self, index: u16) -> AdmResult<DeviceName> {
        self.with_state(|state| {
            let device = state.playout.check_index(index)?;
            Ok(DeviceName::new(device.name.clone(), device.id.clone()))
        })
    }

    fn recording_device_name(&self, index: u16) -> AdmResult<DeviceName> {
        self.with_state(|state| {
            let device = state.recording.check_index(index)?;
            Ok(DeviceName::new(device.name.clone(), device.id.clone()))
        })
    }

    fn set_playout_device(&self, index: u16) -> AdmResult<()> {
        self.with_state(|state| state.playout.select(DeviceSelection::Index(index)))
    }

    fn set_playout_device_type(&self, _device: WindowsDeviceType) -> AdmResult<()> {
        // cpal has a single default device per direction
        self.with_state(|state| state.playout.select(DeviceSelection::Default))
    }

    fn set_recording_device(&self, index: u16) -> AdmResult<()> {
        self.with_state(|state| state.recording.select(DeviceSelection::Index(index)))
    }

    fn set_recording_device_type(&self, _device: WindowsDeviceType) -> AdmResult<()> {
        self.with_state(|state| state.recording.select(DeviceSelection::Default))
    }

    fn playout_is_available(&self) -> AdmResult<bool> {
        self.with_state(|state| Ok(state.playout.selected_device().is_ok()))
    }

    fn init_playout(&self) -> AdmResult<()> {
        self.with_state(|state| {
            if state.playout.is_streaming() {
                return Err(AdmError::InvalidState("playout is running"));
            }
            if state.playout.settings.is_none() {
                state.playout.settings = Some(self.resolve_settings(&state.playout, Direction::Output)?);
                state.playout.mixer_initialized = true;
            }
            Ok(())
        })
    }

    fn playout_is_initialized(&self) -> bool {
        self.state.lock().playout.settings.is_some()
    }

    fn recording_is_available(&self) -> AdmResult<bool> {
        self.with_state(|state| Ok(state.recording.selected_device().is_ok()))
    }

    fn init_recording(&self) -> AdmResult<()> {
        self.with_state(|state| {
            if state.recording.is_streaming() {
                return Err(AdmError::InvalidState("recording is running"));
            }
            if state.recording.settings.is_none() {
                state.recording.settings =
                    Some(self.resolve_settings(&state.recording, Direction::Input)?);
                state.recording.mixer_initialized = true;
            }
            Ok(())
        })
    }

    fn recording_is_initialized(&self) -> bool {
        self.state.lock().recording.settings.is_some()
    }

    fn start_playout(&self) -> AdmResult<()> {
        self.with_state(|state| {
            if state.playout.is_streaming() {
                return Ok(());
            }
            let settings = state
                .playout
                .settings
                .clone()
                .ok_or(AdmError::InvalidState("playout not initialized"))?;
            state.playout.stream = Some(self.start_render(settings)?);
            Ok(())
        })
    }

    fn stop_playout(&self) -> AdmResult<()> {
        self.with_state(|state| {
            state.playout.stop();
            Ok(())
        })
    }

    fn playing(&self) -> bool {
        let state = self.state.lock();
        if let Some(stream) = &state.playout.stream {
            stream.drain_errors();
        }
        state.playout.is_streaming()
    }

    fn start_recording(&self) -> AdmResult<()> {
        self.with_state(|state| {
            if state.recording.is_streaming() {
                return Ok(());
            }
            let settings = state
                .recording
                .settings
                .clone()
                .ok_or(AdmError::InvalidState("recording not initialized"))?;
            state.recording.stream = Some(self.start_capture(settings)?);
            Ok(())
        })
    }

    fn stop_recording(&self) -> AdmResult<()> {
        self.with_state(|state| {
            state.recording.stop();
            Ok(())
        })
    }

    fn recording(&self) -> bool {
        let state = self.state.lock();
        if let Some(stream) = &state.recording.stream {
            stream.drain_errors();
        }
        state.recording.is_streaming()
    }

    fn init_speaker(&self) -> AdmResult<()> {
        self.with_state(|state| {
            state.playout.selected_device()?;
            state.playout.mixer_initialized = true;
            Ok(())
        })
    }

    fn speaker_is_initialized(&self) -> bool {
        self.state.lock().playout.mixer_initialized
    }

    fn init_microphone(&self) -> AdmResult<()> {
        self.with_state(|state| {
            state.recording.selected_device()?;
            state.recording.mixer_initialized = true;
            Ok(())
        })
    }

    fn microphone_is_initialized(&self) -> bool {
        self.state.lock().recording.mixer_initialized
    }

    fn speaker_volume_is_available(&self) -> AdmResult<bool> {
        self.with_state(|_| Ok(true))
    }

    fn set_speaker_volume(&self, volume: u32) -> AdmResult<()> {
        self.with_state(|_| self.speaker_volume.set_level(volume))
    }

    fn speaker_volume(&self) -> AdmResult<u32> {
        self.with_state(|_| Ok(self.speaker_volume.level()))
    }

    fn max_speaker_volume(&self) -> AdmResult<u32> {
        self.with_state(|_| Ok(self.speaker_volume.max_level()))
    }

    fn min_speaker_volume(&self) -> AdmResult<u32> {
        self.with_state(|_| Ok(self.speaker_volume.min_level()))
    }

    fn microphone_volume_is_available(&self) -> AdmResult<bool> {
        self.with_state(|_| Ok(true))
    }

    fn set_microphone_volume(&self, volume: u32) -> AdmResult<()> {
        self.with_state(|_| self.mic_volume.set_level(volume))
    }

    fn microphone_volume(&self) -> AdmResult<u32> {
        self.with_state(|_| Ok(self.mic_volume.level()))
    }

    fn max_microphone_volume(&self) -> AdmResult<u32> {
        self.with_state(|_| Ok(self.mic_volume.max_level()))
    }

    fn min_microphone_volume(&self) -> AdmResult<u32> {
        self.with_state(|_| Ok(self.mic_volume.min_level()))
    }

    fn speaker_mute_is_available(&self) -> AdmResult<bool> {
        self.with_state(|_| Ok(true))
    }

    fn set_speaker_mute(&self, enable: bool) -> AdmResult<()> {
        self.with_state(|_| {
            self.speaker_volume.set_muted(enable);
            Ok(())
        })
    }

    fn speaker_mute(&self) -> AdmResult<bool> {
        self.with_state(|_| Ok(self.speaker_volume.is_muted()))
    }

    fn microphone_mute_is_available(&self) -> AdmResult<bool> {
        self.with_state(|_| Ok(true))
    }

    fn set_microphone_mute(&self, enable: bool) -> AdmResult<()> {
        self.with_state(|_| {
            self.mic_volume.set_muted(enable);
            Ok(())
        })
    }

    fn microphone_mute(&self) -> AdmResult<bool> {
        self.with_state(|_| Ok(self.mic_volume.is_muted()))
    }

    fn stereo_playout_is_available(&self) -> AdmResult<bool> {
        self.with_state(|state| Ok(state.playout.selected_device()?.supports_stereo()))
    }

    fn set_stereo_playout(&self, enable: bool) -> AdmResult<()> {
        self.with_state(|state| {
            if state.playout.settings.is_some() {
                return Err(AdmError::InvalidState("playout already initialized"));
            }
            if enable && !state.playout.selected_device()?.supports_stereo() {
                return Err(AdmError::Unsupported("stereo playout"));
            }
            state.playout.stereo = enable;
            Ok(())
        })
    }

    fn stereo_playout(&self) -> AdmResult<bool> {
        self.with_state(|state| Ok(state.playout.stereo))
    }

    fn stereo_recording_is_available(&self) -> AdmResult<bool> {
        self.with_state(|state| Ok(state.recording.selected_device()?.supports_stereo()))
    }

    fn set_stereo_recording(&self, enable: bool) -> AdmResult<()> {
        self.with_state(|state| {
            if state.recording.settings.is_some() {
                return Err(AdmError::InvalidState("recording already initialized"));
            }
            if enable && !state.recording.selected_device()?.supports_stereo() {
                return Err(AdmError::Unsupported("stereo recording"));
            }
            state.recording.stereo = enable;
            Ok(())
        })
    }

    fn stereo_recording(&self) -> AdmResult<bool> {
        self.with_state(|state| Ok(state.recording.stereo))
    }

    fn playout_delay(&self) -> AdmResult<u16> {
        self.with_state(|state| {
            let delay = match &state.playout.settings {
                Some(settings) if settings.buffer_frames() > 0 => {
                    (settings.buffer_frames() as u64 * 1000 / settings.sample_rate().max(1) as u64)
                        .min(u16::MAX as u64) as u16
                }
                _ => DEFAULT_PLAYOUT_DELAY_MS,
            };
            Ok(delay)
        })
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
        self.with_state(|state| stream_parameters(&state.playout))
    }

    #[cfg(any(feature = "audio-parameters", target_os = "ios"))]
    fn record_audio_parameters(&self) -> AdmResult<AudioParameters> {
        self.with_state(|state| stream_parameters(&state.recording))
    }
}

#[cfg(any(feature = "audio-parameters", target_os = "ios"))]
fn stream_parameters(path: &PathState) -> AdmResult<AudioParameters> {
    let settings = path
        .settings
        .as_ref()
        .ok_or(AdmError::InvalidState("stream not initialized"))?;
    Ok(AudioParameters {
        sample_rate: settings.sample_rate(),
        channels: settings.transport_channels,
        frames_per_buffer: settings.buffer_frames(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task_queue::DefaultTaskQueueFactory;

    fn module() -> CpalAudioDeviceModule {
        CpalAudioDeviceModule::new(AudioConfig::default(), &DefaultTaskQueueFactory)
    }

    fn device(name: &str, is_default: bool, channels: Vec<u16>) -> AudioDevice {
        AudioDevice {
            id: name.to_string(),
            name: name.to_string(),
            is_input: true,
            is_output: false,
            is_default,
            sample_rates: vec![(8000, 48000)],
            channels,
        }
    }

    #[test]
    fn test_requires_init() {
        let module = module();
        assert!(!module.initialized());
        assert_eq!(module.recording_devices(), Err(AdmError::NotInitialized));
        assert_eq!(module.max_microphone_volume(), Err(AdmError::NotInitialized));
        assert_eq!(module.init_recording(), Err(AdmError::NotInitialized));
        // Terminating an uninitialized module is a no-op
        assert_eq!(module.terminate(), Ok(()));
    }

    #[test]
    fn test_voice_processing_unavailable() {
        let module = module();
        assert!(!module.built_in_aec_is_available());
        assert!(!module.built_in_agc_is_available());
        assert!(!module.built_in_ns_is_available());
        assert!(module.enable_built_in_ns(true).is_err());
    }

    #[test]
    fn test_layer_matches_host() {
        let module = module();
        assert_eq!(module.active_audio_layer(), Ok(module.host_layer()));
    }

    #[test]
    fn test_path_selection() {
        let mut path = PathState::new();
        path.devices = vec![device("a", false, vec![1]), device("b", true, vec![1, 2])];

        assert_eq!(path.selected_device().unwrap().name, "b");
        assert_eq!(
            path.select(DeviceSelection::Index(5)),
            Err(AdmError::InvalidDeviceIndex { index: 5, count: 2 })
        );

        path.select(DeviceSelection::Index(0)).unwrap();
        assert_eq!(path.selected_device().unwrap().name, "a");
        assert!(!path.selected_device().unwrap().supports_stereo());
    }

    #[test]
    fn test_selection_locked_while_initialized() {
        let mut path = PathState::new();
        path.devices = vec![device("a", true, vec![1]), device("b", false, vec![1])];
        path.settings = Some(StreamSettings {
            device_id: "a".to_string(),
            config: cpal::StreamConfig {
                channels: 1,
                sample_rate: cpal::SampleRate(48000),
                buffer_size: cpal::BufferSize::Default,
            },
            sample_format: cpal::SampleFormat::F32,
            transport_channels: 1,
        });

        assert_eq!(
            path.select(DeviceSelection::Index(1)),
            Err(AdmError::InvalidState("device in use"))
        );
        assert_eq!(path.selection, DeviceSelection::Default);

        path.stop();
        path.select(DeviceSelection::Index(1)).unwrap();
        assert_eq!(path.selected_device().unwrap().name, "b");
    }

    #[test]
    fn test_default_selection_without_devices() {
        let path = PathState::new();
        assert_eq!(path.selected_device().unwrap_err(), AdmError::NoDevice);
    }

    #[test]
    fn test_volume_after_init() {
        let module = module();
        // Hosts without audio hardware may still fail enumeration
        if module.init().is_err() {
            return;
        }

        assert_eq!(module.max_microphone_volume(), Ok(255));
        assert_eq!(module.min_microphone_volume(), Ok(0));
        module.set_microphone_volume(100).unwrap();
        assert_eq!(module.microphone_volume(), Ok(100));
        assert!(module.set_microphone_volume(256).is_err());

        module.set_speaker_mute(true).unwrap();
        assert_eq!(module.speaker_mute(), Ok(true));

        let count = module.recording_devices().unwrap();
        assert_eq!(
            module.set_recording_device(count),
            Err(AdmError::InvalidDeviceIndex { index: count, count })
        );

        module.terminate().unwrap();
        assert!(!module.initialized());
    }
}
