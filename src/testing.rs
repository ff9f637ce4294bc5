//! Call-recording module for tests

use parking_lot::Mutex;
use std::sync::Arc;

use crate::error::{AdmError, AdmResult};
use crate::module::{AudioDeviceModule, AudioLayer, AudioTransport, DeviceName, WindowsDeviceType};

#[cfg(any(feature = "audio-parameters", target_os = "ios"))]
use crate::module::AudioParameters;

/// A call received by [`MockModule`]
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    ActiveAudioLayer,
    RegisterAudioCallback(bool),
    Init,
    Terminate,
    Initialized,
    PlayoutDevices,
    RecordingDevices,
    PlayoutDeviceName(u16),
    RecordingDeviceName(u16),
    SetPlayoutDevice(u16),
    SetPlayoutDeviceType(WindowsDeviceType),
    SetRecordingDevice(u16),
    SetRecordingDeviceType(WindowsDeviceType),
    PlayoutIsAvailable,
    InitPlayout,
    PlayoutIsInitialized,
    RecordingIsAvailable,
    InitRecording,
    RecordingIsInitialized,
    StartPlayout,
    StopPlayout,
    Playing,
    StartRecording,
    StopRecording,
    Recording,
    InitSpeaker,
    SpeakerIsInitialized,
    InitMicrophone,
    MicrophoneIsInitialized,
    SpeakerVolumeIsAvailable,
    SetSpeakerVolume(u32),
    SpeakerVolume,
    MaxSpeakerVolume,
    MinSpeakerVolume,
    MicrophoneVolumeIsAvailable,
    SetMicrophoneVolume(u32),
    MicrophoneVolume,
    MaxMicrophoneVolume,
    MinMicrophoneVolume,
    SpeakerMuteIsAvailable,
    SetSpeakerMute(bool),
    SpeakerMute,
    MicrophoneMuteIsAvailable,
    SetMicrophoneMute(bool),
    MicrophoneMute,
    StereoPlayoutIsAvailable,
    SetStereoPlayout(bool),
    StereoPlayout,
    StereoRecordingIsAvailable,
    SetStereoRecording(bool),
    StereoRecording,
    PlayoutDelay,
    BuiltInAecIsAvailable,
    BuiltInAgcIsAvailable,
    BuiltInNsIsAvailable,
    EnableBuiltInAec(bool),
    EnableBuiltInAgc(bool),
    EnableBuiltInNs(bool),
    #[allow(dead_code)]
    PlayoutAudioParameters,
    #[allow(dead_code)]
    RecordAudioParameters,
}

#[derive(Default)]
struct Canned {
    fail_all: Option<AdmError>,
    init_recording: Option<AdmResult<()>>,
    max_mic_volume: Option<AdmResult<u32>>,
    set_mic_volume: Option<AdmResult<()>>,
    recording_is_initialized: bool,
    recording_devices: Vec<String>,
}

/// Module that records every call and answers with canned values.
///
/// Unless overridden, fallible calls succeed with fixed distinctive values;
/// `set_fail_all` makes every fallible call return the given error.
pub struct MockModule {
    calls: Mutex<Vec<Call>>,
    canned: Mutex<Canned>,
}

impl MockModule {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            canned: Mutex::new(Canned::default()),
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn last_volume_set(&self) -> Option<u32> {
        self.calls.lock().iter().rev().find_map(|call| match call {
            Call::SetMicrophoneVolume(volume) => Some(*volume),
            _ => None,
        })
    }

    pub fn set_fail_all(&self, err: Option<AdmError>) {
        self.canned.lock().fail_all = err;
    }

    pub fn set_init_recording_result(&self, result: AdmResult<()>) {
        self.canned.lock().init_recording = Some(result);
    }

    pub fn set_max_mic_volume(&self, result: AdmResult<u32>) {
        self.canned.lock().max_mic_volume = Some(result);
    }

    pub fn set_set_mic_volume_result(&self, result: AdmResult<()>) {
        self.canned.lock().set_mic_volume = Some(result);
    }

    pub fn set_recording_is_initialized(&self, initialized: bool) {
        self.canned.lock().recording_is_initialized = initialized;
    }

    pub fn set_recording_devices(&self, names: &[&str]) {
        self.canned.lock().recording_devices = names.iter().map(|n| n.to_string()).collect();
    }

    fn record(&self, call: Call) {
        self.calls.lock().push(call);
    }

    fn answer<T>(&self, call: Call, value: T) -> AdmResult<T> {
        self.record(call);
        match &self.canned.lock().fail_all {
            Some(err) => Err(err.clone()),
            None => Ok(value),
        }
    }
}

impl AudioDeviceModule for MockModule {
    fn active_audio_layer(&self) -> AdmResult<AudioLayer> {
        self.answer(Call::ActiveAudioLayer, AudioLayer::LinuxPulse)
    }

    fn register_audio_callback(&self, transport: Option<Arc<dyn AudioTransport>>) -> AdmResult<()> {
        self.answer(Call::RegisterAudioCallback(transport.is_some()), ())
    }

    fn init(&self) -> AdmResult<()> {
        self.answer(Call::Init, ())
    }

    fn terminate(&self) -> AdmResult<()> {
        self.answer(Call::Terminate, ())
    }

    fn initialized(&self) -> bool {
        self.record(Call::Initialized);
        true
    }

    fn playout_devices(&self) -> AdmResult<u16> {
        self.answer(Call::PlayoutDevices, 3)
    }

    fn recording_devices(&self) -> AdmResult<u16> {
        let count = self.canned.lock().recording_devices.len() as u16;
        self.answer(Call::RecordingDevices, count)
    }

    fn playout_device_name(&self, index: u16) -> AdmResult<DeviceName> {
        self.answer(
            Call::PlayoutDeviceName(index),
            DeviceName::new(format!("speaker {}", index), format!("out-{}", index)),
        )
    }

    fn recording_device_name(&self, index: u16) -> AdmResult<DeviceName> {
        let name = self
            .canned
            .lock()
            .recording_devices
            .get(index as usize)
            .cloned()
            .unwrap_or_else(|| format!("mic {}", index));
        self.answer(
            Call::RecordingDeviceName(index),
            DeviceName::new(name, format!("in-{}", index)),
        )
    }

    fn set_playout_device(&self, index: u16) -> AdmResult<()> {
        self.answer(Call::SetPlayoutDevice(index), ())
    }

    fn set_playout_device_type(&self, device: WindowsDeviceType) -> AdmResult<()> {
        self.answer(Call::SetPlayoutDeviceType(device), ())
    }

    fn set_recording_device(&self, index: u16) -> AdmResult<()> {
        self.answer(Call::SetRecordingDevice(index), ())
    }

    fn set_recording_device_type(&self, device: WindowsDeviceType) -> AdmResult<()> {
        self.answer(Call::SetRecordingDeviceType(device), ())
    }

    fn playout_is_available(&self) -> AdmResult<bool> {
        self.answer(Call::PlayoutIsAvailable, true)
    }

    fn init_playout(&self) -> AdmResult<()> {
        self.answer(Call::InitPlayout, ())
    }

    fn playout_is_initialized(&self) -> bool {
        self.record(Call::PlayoutIsInitialized);
        false
    }

    fn recording_is_available(&self) -> AdmResult<bool> {
        self.answer(Call::RecordingIsAvailable, true)
    }

    fn init_recording(&self) -> AdmResult<()> {
        self.record(Call::InitRecording);
        let canned = self.canned.lock();
        match (&canned.init_recording, &canned.fail_all) {
            (Some(result), _) => result.clone(),
            (None, Some(err)) => Err(err.clone()),
            (None, None) => Ok(()),
        }
    }

    fn recording_is_initialized(&self) -> bool {
        self.record(Call::RecordingIsInitialized);
        self.canned.lock().recording_is_initialized
    }

    fn start_playout(&self) -> AdmResult<()> {
        self.answer(Call::StartPlayout, ())
    }

    fn stop_playout(&self) -> AdmResult<()> {
        self.answer(Call::StopPlayout, ())
    }

    fn playing(&self) -> bool {
        self.record(Call::Playing);
        true
    }

    fn start_recording(&self) -> AdmResult<()> {
        self.answer(Call::StartRecording, ())
    }

    fn stop_recording(&self) -> AdmResult<()> {
        self.answer(Call::StopRecording, ())
    }

    fn recording(&self) -> bool {
        self.record(Call::Recording);
        false
    }

    fn init_speaker(&self) -> AdmResult<()> {
        self.answer(Call::InitSpeaker, ())
    }

    fn speaker_is_initialized(&self) -> bool {
        self.record(Call::SpeakerIsInitialized);
        true
    }

    fn init_microphone(&self) -> AdmResult<()> {
        self.answer(Call::InitMicrophone, ())
    }

    fn microphone_is_initialized(&self) -> bool {
        self.record(Call::MicrophoneIsInitialized);
        false
    }

    fn speaker_volume_is_available(&self) -> AdmResult<bool> {
        self.answer(Call::SpeakerVolumeIsAvailable, true)
    }

    fn set_speaker_volume(&self, volume: u32) -> AdmResult<()> {
        self.answer(Call::SetSpeakerVolume(volume), ())
    }

    fn speaker_volume(&self) -> AdmResult<u32> {
        self.answer(Call::SpeakerVolume, 77)
    }

    fn max_speaker_volume(&self) -> AdmResult<u32> {
        self.answer(Call::MaxSpeakerVolume, 1000)
    }

    fn min_speaker_volume(&self) -> AdmResult<u32> {
        self.answer(Call::MinSpeakerVolume, 5)
    }

    fn microphone_volume_is_available(&self) -> AdmResult<bool> {
        self.answer(Call::MicrophoneVolumeIsAvailable, false)
    }

    fn set_microphone_volume(&self, volume: u32) -> AdmResult<()> {
        self.record(Call::SetMicrophoneVolume(volume));
        let canned = self.canned.lock();
        match (&canned.set_mic_volume, &canned.fail_all) {
            (Some(result), _) => result.clone(),
            (None, Some(err)) => Err(err.clone()),
            (None, None) => Ok(()),
        }
    }

    fn microphone_volume(&self) -> AdmResult<u32> {
        self.answer(Call::MicrophoneVolume, 42)
    }

    fn max_microphone_volume(&self) -> AdmResult<u32> {
        self.record(Call::MaxMicrophoneVolume);
        let canned = self.canned.lock();
        match (&canned.max_mic_volume, &canned.fail_all) {
            (Some(result), _) => result.clone(),
            (None, Some(err)) => Err(err.clone()),
            (None, None) => Ok(255),
        }
    }

    fn min_microphone_volume(&self) -> AdmResult<u32> {
        self.answer(Call::MinMicrophoneVolume, 1)
    }

    fn speaker_mute_is_available(&self) -> AdmResult<bool> {
        self.answer(Call::SpeakerMuteIsAvailable, true)
    }

    fn set_speaker_mute(&self, enable: bool) -> AdmResult<()> {
        self.answer(Call::SetSpeakerMute(enable), ())
    }

    fn speaker_mute(&self) -> AdmResult<bool> {
        self.answer(Call::SpeakerMute, true)
    }

    fn microphone_mute_is_available(&self) -> AdmResult<bool> {
        self.answer(Call::MicrophoneMuteIsAvailable, false)
    }

    fn set_microphone_mute(&self, enable: bool) -> AdmResult<()> {
        self.answer(Call::SetMicrophoneMute(enable), ())
    }

    fn microphone_mute(&self) -> AdmResult<bool> {
        self.answer(Call::MicrophoneMute, false)
    }

    fn stereo_playout_is_available(&self) -> AdmResult<bool> {
        self.answer(Call::StereoPlayoutIsAvailable, true)
    }

    fn set_stereo_playout(&self, enable: bool) -> AdmResult<()> {
        self.answer(Call::SetStereoPlayout(enable), ())
    }

    fn stereo_playout(&self) -> AdmResult<bool> {
        self.answer(Call::StereoPlayout, true)
    }

    fn stereo_recording_is_available(&self) -> AdmResult<bool> {
        self.answer(Call::StereoRecordingIsAvailable, false)
    }

    fn set_stereo_recording(&self, enable: bool) -> AdmResult<()> {
        self.answer(Call::SetStereoRecording(enable), ())
    }

    fn stereo_recording(&self) -> AdmResult<bool> {
        self.answer(Call::StereoRecording, false)
    }

    fn playout_delay(&self) -> AdmResult<u16> {
        self.answer(Call::PlayoutDelay, 37)
    }

    fn built_in_aec_is_available(&self) -> bool {
        self.record(Call::BuiltInAecIsAvailable);
        true
    }

    fn built_in_agc_is_available(&self) -> bool {
        self.record(Call::BuiltInAgcIsAvailable);
        false
    }

    fn built_in_ns_is_available(&self) -> bool {
        self.record(Call::BuiltInNsIsAvailable);
        true
    }

    fn enable_built_in_aec(&self, enable: bool) -> AdmResult<()> {
        self.answer(Call::EnableBuiltInAec(enable), ())
    }

    fn enable_built_in_agc(&self, enable: bool) -> AdmResult<()> {
        self.answer(Call::EnableBuiltInAgc(enable), ())
    }

    fn enable_built_in_ns(&self, enable: bool) -> AdmResult<()> {
        self.answer(Call::EnableBuiltInNs(enable), ())
    }

    #[cfg(any(feature = "audio-parameters", target_os = "ios"))]
    fn playout_audio_parameters(&self) -> AdmResult<AudioParameters> {
        self.answer(
            Call::PlayoutAudioParameters,
            AudioParameters {
                sample_rate: 44100,
                channels: 2,
                frames_per_buffer: 512,
            },
        )
    }

    #[cfg(any(feature = "audio-parameters", target_os = "ios"))]
    fn record_audio_parameters(&self) -> AdmResult<AudioParameters> {
        self.answer(
            Call::RecordAudioParameters,
            AudioParameters {
                sample_rate: 16000,
                channels: 1,
                frames_per_buffer: 160,
            },
        )
    }
}
