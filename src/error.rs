//! Error types
//!
//! [`AdmError`] is the status returned by every [`crate::AudioDeviceModule`]
//! operation. [`Error`] covers the host-facing surface: configuration and
//! microphone selection.

use thiserror::Error;

/// Result of an audio device module operation
pub type AdmResult<T> = std::result::Result<T, AdmError>;

/// Crate-level result
pub type Result<T> = std::result::Result<T, Error>;

/// Status of a failed audio device module operation
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AdmError {
    #[error("audio device module is not initialized")]
    NotInitialized,

    #[error("device index {index} out of range ({count} devices)")]
    InvalidDeviceIndex { index: u16, count: u16 },

    #[error("no audio device available")]
    NoDevice,

    #[error("operation not supported: {0}")]
    Unsupported(&'static str),

    #[error("invalid state: {0}")]
    InvalidState(&'static str),

    #[error("audio backend error: {0}")]
    Backend(String),

    #[error("status code {0}")]
    Status(i32),
}

impl AdmError {
    /// C-style status code for this error.
    pub fn code(&self) -> i32 {
        match self {
            AdmError::Status(code) => *code,
            _ => -1,
        }
    }
}

impl From<cpal::DevicesError> for AdmError {
    fn from(err: cpal::DevicesError) -> Self {
        AdmError::Backend(err.to_string())
    }
}

impl From<cpal::DefaultStreamConfigError> for AdmError {
    fn from(err: cpal::DefaultStreamConfigError) -> Self {
        AdmError::Backend(err.to_string())
    }
}

impl From<cpal::BuildStreamError> for AdmError {
    fn from(err: cpal::BuildStreamError) -> Self {
        AdmError::Backend(err.to_string())
    }
}

impl From<cpal::PlayStreamError> for AdmError {
    fn from(err: cpal::PlayStreamError) -> Self {
        AdmError::Backend(err.to_string())
    }
}

/// Host-facing errors
#[derive(Debug, Error)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("device not found: {0}")]
    DeviceNotFound(String),

    #[error(transparent)]
    Adm(#[from] AdmError),
}
