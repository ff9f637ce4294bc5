//! Audio device module implementations
//!
//! Contains the cpal-backed platform module and the dummy module, plus the
//! device enumeration, stream threads, framing and volume helpers they use.

pub mod cpal_module;
pub mod device;
pub mod dummy;
pub mod frames;
pub mod stream;
pub mod volume;

pub use cpal_module::CpalAudioDeviceModule;
pub use device::{list_devices, get_device_by_id, AudioDevice, Direction};
pub use dummy::DummyAudioDeviceModule;
pub use volume::SoftwareVolume;
