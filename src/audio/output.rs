use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};

use super::player::{new_playback, PlaybackController, Player};
use crate::error::{Error, Result};

/// Largest callback buffer the output can convert without allocating
const CONVERSION_BUFFER_SIZE: usize = 16384;

/// Running cpal output stream hosting a [`Player`]
///
/// Dropping this stops the stream.
pub struct CpalOutput {
    _stream: cpal::Stream,
    device_name: String,
    sample_rate: u32,
    channels: u32,
}

impl CpalOutput {
    /// Open the default output device and start the stream
    pub fn open(queue_capacity: usize) -> Result<(Self, PlaybackController)> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| Error::Device("no output device available".to_string()))?;
        let device_name = device.name().unwrap_or_else(|_| "unknown".to_string());

        let default_config = device
            .default_output_config()
            .map_err(|e| Error::Device(e.to_string()))?;
        let sample_format = default_config.sample_format();
        let config: cpal::StreamConfig = default_config.into();

        let sample_rate = config.sample_rate.0;
        let channels = config.channels as u32;
        let (controller, player) = new_playback(sample_rate, channels, queue_capacity);

        let stream = match sample_format {
            cpal::SampleFormat::F32 => build_stream::<f32>(&device, &config, player)?,
            cpal::SampleFormat::I16 => build_stream::<i16>(&device, &config, player)?,
            cpal::SampleFormat::U16 => build_stream::<u16>(&device, &config, player)?,
            other => {
                return Err(Error::Device(format!("unsupported sample format: {:?}", other)));
            }
        };

        stream.play().map_err(|e| Error::Device(e.to_string()))?;

        log::info!(
            "Audio output: {} ({} Hz, {} channels)",
            device_name,
            sample_rate,
            channels
        );

        Ok((
            Self {
                _stream: stream,
                device_name,
                sample_rate,
                channels,
            },
            controller,
        ))
    }

    pub fn device_name(&self) -> &str {
        &self.device_name
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> u32 {
        self.channels
    }
}

fn build_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    mut player: Player,
) -> Result<cpal::Stream>
where
    T: cpal::Sample + cpal::SizedSample + cpal::FromSample<f32>,
{
    let err_fn = |err| log::error!("Audio stream error: {}", err);

    // Preallocated; only grows if the device hands us a larger block
    let mut conversion_buffer = vec![0.0f32; CONVERSION_BUFFER_SIZE];

    device
        .build_output_stream(
            config,
            move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                if conversion_buffer.len() < data.len() {
                    conversion_buffer.resize(data.len(), 0.0);
                }

                let buffer_slice = &mut conversion_buffer[..data.len()];
                player.process(buffer_slice);

                for (out, &sample) in data.iter_mut().zip(buffer_slice.iter()) {
                    *out = T::from_sample(sample);
                }
            },
            err_fn,
            None,
        )
        .map_err(|e| Error::Device(e.to_string()))
}
