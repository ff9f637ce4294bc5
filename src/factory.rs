//! Audio device module creation

use std::sync::Arc;

use crate::backend::{CpalAudioDeviceModule, DummyAudioDeviceModule};
use crate::config::AudioConfig;
use crate::module::{AudioDeviceModule, AudioLayer};
use crate::task_queue::TaskQueueFactory;

/// Create a module for `layer` with default stream settings.
///
/// `PlatformDefault`, or the concrete layer of the default cpal host, yields
/// a cpal-backed module. `Dummy` yields a module without devices. Any other
/// layer is not available on this platform and yields `None`.
pub fn create(
    layer: AudioLayer,
    task_queue_factory: &dyn TaskQueueFactory,
) -> Option<Arc<dyn AudioDeviceModule>> {
    let config = AudioConfig {
        layer,
        ..Default::default()
    };
    create_with_config(&config, task_queue_factory)
}

/// Create a module for `config.layer` using the configured stream settings.
pub fn create_with_config(
    config: &AudioConfig,
    task_queue_factory: &dyn TaskQueueFactory,
) -> Option<Arc<dyn AudioDeviceModule>> {
    match config.layer {
        AudioLayer::Dummy => Some(Arc::new(DummyAudioDeviceModule::new())),
        AudioLayer::PlatformDefault => Some(Arc::new(CpalAudioDeviceModule::new(
            config.clone(),
            task_queue_factory,
        ))),
        requested => {
            let module = CpalAudioDeviceModule::new(config.clone(), task_queue_factory);
            if module.host_layer() == requested {
                Some(Arc::new(module))
            } else {
                tracing::warn!(
                    "Audio layer {:?} unavailable (default host is {:?})",
                    requested,
                    module.host_layer()
                );
                None
            }
        }
    }
}

/// Source of audio device modules
pub trait ModuleFactory {
    fn create(
        &self,
        layer: AudioLayer,
        task_queue_factory: &dyn TaskQueueFactory,
    ) -> Option<Arc<dyn AudioDeviceModule>>;
}

/// Factory for the modules this crate provides
#[derive(Debug, Default, Clone)]
pub struct PlatformModuleFactory {
    /// Stream settings for created modules; the layer is taken from
    /// each `create` call
    config: AudioConfig,
}

impl PlatformModuleFactory {
    pub fn new(config: AudioConfig) -> Self {
        Self { config }
    }
}

impl ModuleFactory for PlatformModuleFactory {
    fn create(
        &self,
        layer: AudioLayer,
        task_queue_factory: &dyn TaskQueueFactory,
    ) -> Option<Arc<dyn AudioDeviceModule>> {
        let config = AudioConfig {
            layer,
            ..self.config.clone()
        };
        create_with_config(&config, task_queue_factory)
    }
}
