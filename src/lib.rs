//! Audio device module adapter
//!
//! Defines the [`AudioDeviceModule`] capability interface, a platform-default
//! implementation backed by cpal, and [`AudioDeviceAdapter`], which forwards
//! every call to an underlying module while applying two recording policies:
//! the selected microphone index and the initial microphone volume.
//!
//! ## Layout
//!
//! ```text
//! audio-device-adapter
//! ├── module/      ← AudioDeviceModule trait, AudioTransport, device types
//! ├── adapter      ← AudioDeviceAdapter (forwarding + recording policy)
//! ├── factory      ← create(layer, task queue factory)
//! ├── task_queue   ← TaskQueueFactory, default thread-backed queues
//! ├── backend/     ← cpal and dummy modules
//! ├── microphone   ← host-side microphone helpers
//! └── config       ← TOML configuration
//! ```

pub mod adapter;
pub mod backend;
pub mod config;
pub mod error;
pub mod factory;
pub mod microphone;
pub mod module;
pub mod task_queue;

#[cfg(test)]
pub(crate) mod testing;

pub use adapter::AudioDeviceAdapter;
pub use config::AdapterConfig;
pub use error::{AdmError, AdmResult, Error, Result};
pub use factory::{create, ModuleFactory, PlatformModuleFactory};
pub use microphone::Microphone;
pub use module::{AudioDeviceModule, AudioLayer, AudioTransport, DeviceName, WindowsDeviceType};
pub use task_queue::{DefaultTaskQueueFactory, TaskQueue, TaskQueueFactory};

/// Shared constants
pub mod constants {
    /// Maximum device name length in bytes
    pub const MAX_DEVICE_NAME_SIZE: usize = 128;

    /// Maximum device GUID length in bytes
    pub const MAX_GUID_SIZE: usize = 128;

    /// Highest volume level reported by the software volume controls
    pub const MAX_VOLUME_LEVEL: u32 = 255;

    /// Lowest volume level reported by the software volume controls
    pub const MIN_VOLUME_LEVEL: u32 = 0;

    /// Audio is delivered to and requested from the transport in 10 ms frames
    pub const FRAME_DURATION_MS: u32 = 10;

    /// Playout delay reported when the buffer size is left to the backend
    pub const DEFAULT_PLAYOUT_DELAY_MS: u16 = 20;

    /// Capacity of the stream error channel
    pub const STREAM_ERROR_CAPACITY: usize = 16;

    /// Name of the task queue that delivers recorded audio
    pub const RECORDING_TASK_QUEUE: &str = "adm-recording";
}
