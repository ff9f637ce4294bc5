//! Software volume and mute
//!
//! cpal exposes no mixer controls, so the cpal module scales samples itself.
//! Levels run from `MIN_VOLUME_LEVEL` to `MAX_VOLUME_LEVEL`.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use crate::constants::{MAX_VOLUME_LEVEL, MIN_VOLUME_LEVEL};
use crate::error::{AdmError, AdmResult};

/// Volume level and mute flag shared with a stream callback
#[derive(Debug)]
pub struct SoftwareVolume {
    level: AtomicU32,
    muted: AtomicBool,
}

impl SoftwareVolume {
    /// Full volume, unmuted
    pub fn new() -> Self {
        Self {
            level: AtomicU32::new(MAX_VOLUME_LEVEL),
            muted: AtomicBool::new(false),
        }
    }

    /// Set the level; levels above the maximum are rejected.
    pub fn set_level(&self, level: u32) -> AdmResult<()> {
        if level > MAX_VOLUME_LEVEL {
            return Err(AdmError::InvalidState("volume above maximum"));
        }
        self.level.store(level, Ordering::Relaxed);
        Ok(())
    }

    pub fn level(&self) -> u32 {
        self.level.load(Ordering::Relaxed)
    }

    pub fn max_level(&self) -> u32 {
        MAX_VOLUME_LEVEL
    }

    pub fn min_level(&self) -> u32 {
        MIN_VOLUME_LEVEL
    }

    pub fn set_muted(&self, muted: bool) {
        self.muted.store(muted, Ordering::Relaxed);
    }

    pub fn is_muted(&self) -> bool {
        self.muted.load(Ordering::Relaxed)
    }

    /// Linear gain for the current level and mute state
    pub fn gain(&self) -> f32 {
        if self.is_muted() {
            0.0
        } else {
            self.level() as f32 / MAX_VOLUME_LEVEL as f32
        }
    }

    /// Scale samples in place
    pub fn apply(&self, samples: &mut [f32]) {
        let gain = self.gain();
        if gain == 1.0 {
            return;
        }
        for sample in samples.iter_mut() {
            *sample *= gain;
        }
    }
}

impl Default for SoftwareVolume {
    fn default() -> Self {
        Self::new()
    }
}
