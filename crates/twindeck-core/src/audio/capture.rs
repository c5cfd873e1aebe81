//! Microphone capture through CPAL
//!
//! The input callback downmixes whatever the device delivers and pushes it
//! into a [`MicFeed`]. It never blocks: when the output side falls behind,
//! frames are dropped.

use cpal::traits::{DeviceTrait, StreamTrait};
use cpal::{SampleFormat, Stream, StreamConfig};

use super::config::DeviceId;
use super::device::{available_devices, open_device, Direction};
use super::error::{AudioError, AudioResult};
use crate::engine::MicFeed;
use crate::sink::MicrophoneInput;

/// Live capture from an input device
pub struct CpalMicrophone {
    device: Option<DeviceId>,
    stream: Option<Stream>,
}

impl CpalMicrophone {
    /// Capture from `device`, or the system default input when None
    pub fn new(device: Option<DeviceId>) -> Self {
        Self {
            device,
            stream: None,
        }
    }
}

impl MicrophoneInput for CpalMicrophone {
    fn start(&mut self, mut feed: MicFeed) -> AudioResult<()> {
        self.stop();

        let device = open_device(self.device.as_ref(), Direction::Input)?;
        let device_name = device.name().unwrap_or_else(|_| "Unknown".to_string());

        let supported = device
            .default_input_config()
            .map_err(|e| AudioError::ConfigError(e.to_string()))?;
        let sample_format = supported.sample_format();
        let config: StreamConfig = supported.into();

        log::info!(
            "Microphone: {} ({} channels, {}Hz, {:?})",
            device_name,
            config.channels,
            config.sample_rate.0,
            sample_format
        );

        feed.set_input_rate(config.sample_rate.0);
        let stream = build_input_stream(&device, &config, sample_format, feed)?;
        stream
            .play()
            .map_err(|e| AudioError::StreamPlayError(e.to_string()))?;

        self.stream = Some(stream);
        Ok(())
    }

    fn stop(&mut self) {
        if let Some(stream) = self.stream.take() {
            if let Err(e) = stream.pause() {
                log::debug!("Pausing microphone stream failed: {}", e);
            }
            // Dropping the stream joins the callback
            drop(stream);
            log::info!("Microphone stopped");
        }
    }

    fn set_device(&mut self, index: usize) -> AudioResult<()> {
        let devices = available_devices(Direction::Input);
        let device = devices
            .get(index)
            .ok_or_else(|| AudioError::DeviceNotFound(format!("input device #{}", index)))?;
        log::info!("Microphone device set to {}", device);
        self.device = Some(device.id.clone());
        Ok(())
    }

    fn device_names(&self) -> Vec<String> {
        available_devices(Direction::Input)
            .iter()
            .map(ToString::to_string)
            .collect()
    }
}

impl Drop for CpalMicrophone {
    fn drop(&mut self) {
        self.stop();
    }
}

fn build_input_stream(
    device: &cpal::Device,
    config: &StreamConfig,
    sample_format: SampleFormat,
    mut feed: MicFeed,
) -> AudioResult<Stream> {
    let channels = config.channels as usize;
    let on_error = |err: cpal::StreamError| log::error!("Microphone stream error: {}", err);

    let stream = match sample_format {
        SampleFormat::F32 => device.build_input_stream(
            config,
            move |data: &[f32], _: &cpal::InputCallbackInfo| {
                feed.push_interleaved(data, channels);
            },
            on_error,
            None,
        ),
        SampleFormat::I16 => {
            let mut scratch: Vec<f32> = Vec::with_capacity(8192);
            device.build_input_stream(
                config,
                move |data: &[i16], _: &cpal::InputCallbackInfo| {
                    scratch.clear();
                    scratch.extend(data.iter().map(|&s| s as f32 / i16::MAX as f32));
                    feed.push_interleaved(&scratch, channels);
                },
                on_error,
                None,
            )
        }
        other => {
            return Err(AudioError::ConfigError(format!(
                "Unsupported microphone sample format: {:?}",
                other
            )))
        }
    };

    stream.map_err(|e| AudioError::StreamBuildError(e.to_string()))
}
