//! cpal stream threads
//!
//! cpal streams are not `Send`, so each stream is built and owned by a
//! dedicated thread that lives until the stream is stopped. Build failures
//! are reported back before `spawn_*` returns; runtime stream errors are
//! queued on a bounded channel.

use cpal::traits::{DeviceTrait, StreamTrait};
use cpal::{FromSample, Sample, SampleFormat, SizedSample, StreamConfig};
use crossbeam_channel::{bounded, Receiver, Sender};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::backend::device::{get_device_by_id, Direction};
use crate::constants::STREAM_ERROR_CAPACITY;
use crate::error::{AdmError, AdmResult};

/// Resolved parameters for opening a stream
#[derive(Debug, Clone)]
pub struct StreamSettings {
    /// Device identifier
    pub device_id: String,

    /// Device-side stream configuration
    pub config: StreamConfig,

    /// Device sample format
    pub sample_format: SampleFormat,

    /// Channels exchanged with the transport
    pub transport_channels: u16,
}

impl StreamSettings {
    pub fn sample_rate(&self) -> u32 {
        self.config.sample_rate.0
    }

    pub fn device_channels(&self) -> u16 {
        self.config.channels
    }

    /// Frames per hardware buffer (0 when left to the backend)
    pub fn buffer_frames(&self) -> u32 {
        match self.config.buffer_size {
            cpal::BufferSize::Fixed(frames) => frames,
            cpal::BufferSize::Default => 0,
        }
    }
}

/// A running stream and the thread that owns it
pub struct StreamHandle {
    /// Thread name, for logging
    name: String,

    /// Cleared to end the stream thread
    running: Arc<AtomicBool>,

    /// Stream thread handle
    thread_handle: Option<JoinHandle<()>>,

    /// Channel for stream errors
    error_rx: Receiver<AdmError>,
}

impl StreamHandle {
    /// Open and start a capture stream; `on_data` receives interleaved f32
    /// samples in the device channel layout.
    pub fn spawn_input<F>(name: &str, settings: StreamSettings, on_data: F) -> AdmResult<Self>
    where
        F: FnMut(&[f32]) + Send + 'static,
    {
        Self::spawn(name, Direction::Input, settings, move |device, settings, error_tx| {
            let config = &settings.config;
            match settings.sample_format {
                SampleFormat::F32 => build_input::<f32, _>(device, config, on_data, error_tx),
                SampleFormat::I16 => build_input::<i16, _>(device, config, on_data, error_tx),
                SampleFormat::U16 => build_input::<u16, _>(device, config, on_data, error_tx),
                SampleFormat::I32 => build_input::<i32, _>(device, config, on_data, error_tx),
                _ => Err(AdmError::Unsupported("input sample format")),
            }
        })
    }

    /// Open and start a render stream; `on_request` fills interleaved f32
    /// samples in the device channel layout.
    pub fn spawn_output<F>(name: &str, settings: StreamSettings, on_request: F) -> AdmResult<Self>
    where
        F: FnMut(&mut [f32]) + Send + 'static,
    {
        Self::spawn(name, Direction::Output, settings, move |device, settings, error_tx| {
            let config = &settings.config;
            match settings.sample_format {
                SampleFormat::F32 => build_output::<f32, _>(device, config, on_request, error_tx),
                SampleFormat::I16 => build_output::<i16, _>(device, config, on_request, error_tx),
                SampleFormat::U16 => build_output::<u16, _>(device, config, on_request, error_tx),
                SampleFormat::I32 => build_output::<i32, _>(device, config, on_request, error_tx),
                _ => Err(AdmError::Unsupported("output sample format")),
            }
        })
    }

    fn spawn<B>(
        name: &str,
        direction: Direction,
        settings: StreamSettings,
        build: B,
    ) -> AdmResult<Self>
    where
        B: FnOnce(&cpal::Device, &StreamSettings, Sender<AdmError>) -> AdmResult<cpal::Stream>
            + Send
            + 'static,
    {
        let running = Arc::new(AtomicBool::new(true));
        let running_for_loop = running.clone();
        let (error_tx, error_rx) = bounded::<AdmError>(STREAM_ERROR_CAPACITY);
        let (ready_tx, ready_rx) = bounded::<AdmResult<()>>(1);
        let thread_name = name.to_string();

        let handle = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || {
                let stream = get_device_by_id(&settings.device_id, direction)
                    .and_then(|device| build(&device, &settings, error_tx))
                    .and_then(|stream| {
                        stream.play()?;
                        Ok(stream)
                    });

                match stream {
                    Ok(stream) => {
                        tracing::info!(
                            "{} started on {} ({} Hz, {} ch)",
                            thread_name,
                            settings.device_id,
                            settings.sample_rate(),
                            settings.device_channels()
                        );
                        let _ = ready_tx.send(Ok(()));

                        // Keep thread alive while running
                        while running_for_loop.load(Ordering::Relaxed) {
                            thread::sleep(Duration::from_millis(10));
                        }
                        drop(stream);
                        tracing::info!("{} stopped", thread_name);
                    }
                    Err(e) => {
                        tracing::error!("Failed to start {}: {}", thread_name, e);
                        running_for_loop.store(false, Ordering::SeqCst);
                        let _ = ready_tx.send(Err(e));
                    }
                }
            })
            .map_err(|e| AdmError::Backend(e.to_string()))?;

        let ready = ready_rx
            .recv()
            .unwrap_or_else(|_| Err(AdmError::Backend("stream thread exited".to_string())));

        let mut stream = Self {
            name: name.to_string(),
            running,
            thread_handle: Some(handle),
            error_rx,
        };

        match ready {
            Ok(()) => Ok(stream),
            Err(e) => {
                stream.stop();
                Err(e)
            }
        }
    }

    /// Stop the stream and join its thread
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);

        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
        }
    }

    /// Check if the stream is running
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Log and discard queued stream errors. Returns how many there were.
    pub fn drain_errors(&self) -> usize {
        let mut count = 0;
        while let Ok(err) = self.error_rx.try_recv() {
            tracing::warn!("{} stream error: {}", self.name, err);
            count += 1;
        }
        count
    }
}

impl Drop for StreamHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

fn build_input<T, F>(
    device: &cpal::Device,
    config: &StreamConfig,
    mut on_data: F,
    error_tx: Sender<AdmError>,
) -> AdmResult<cpal::Stream>
where
    T: SizedSample,
    f32: FromSample<T>,
    F: FnMut(&[f32]) + Send + 'static,
{
    let mut scratch: Vec<f32> = Vec::new();
    let stream = device.build_input_stream(
        config,
        move |data: &[T], _: &cpal::InputCallbackInfo| {
            scratch.clear();
            scratch.extend(data.iter().map(|s| s.to_sample::<f32>()));
            on_data(&scratch);
        },
        move |err| {
            let _ = error_tx.try_send(AdmError::Backend(err.to_string()));
        },
        None,
    )?;
    Ok(stream)
}

fn build_output<T, F>(
    device: &cpal::Device,
    config: &StreamConfig,
    mut on_request: F,
    error_tx: Sender<AdmError>,
) -> AdmResult<cpal::Stream>
where
    T: SizedSample + FromSample<f32>,
    F: FnMut(&mut [f32]) + Send + 'static,
{
    let mut scratch: Vec<f32> = Vec::new();
    let stream = device.build_output_stream(
        config,
        move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
            scratch.clear();
            scratch.resize(data.len(), 0.0);
            on_request(&mut scratch);
            for (out, sample) in data.iter_mut().zip(scratch.iter()) {
                *out = T::from_sample(*sample);
            }
        },
        move |err| {
            let _ = error_tx.try_send(AdmError::Backend(err.to_string()));
        },
        None,
    )?;
    Ok(stream)
}
