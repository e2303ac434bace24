// src/audio.rs

use anyhow::Context;
use cpal::traits::{DeviceTrait, HostTrait};
use cpal::{Device, SampleFormat, StreamConfig, SupportedBufferSize};

/// Upper bound used when the device does not report a buffer-size range.
const FALLBACK_MAX_BUFFER_FRAMES: usize = 8192;

/// Helper struct to hold output device info
pub struct OutputConfig {
    pub device: Device,
    pub config: StreamConfig,
    pub sample_format: SampleFormat,
    pub output_channels: usize,
    pub output_sample_rate: u32,
    pub max_buffer_frames: usize,
}

/// Finds the default audio output device and its config.
pub fn setup_output_device() -> Result<OutputConfig, anyhow::Error> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .context("no output device available")?;
    let supported_config = device.default_output_config()?;
    let sample_format = supported_config.sample_format();
    let max_buffer_frames = match *supported_config.buffer_size() {
        SupportedBufferSize::Range { max, .. } => max as usize,
        SupportedBufferSize::Unknown => FALLBACK_MAX_BUFFER_FRAMES,
    };
    let config = supported_config.config();
    let output_channels = config.channels as usize;
    let output_sample_rate = config.sample_rate.0;

    log::info!(
        "output device: {} channels @ {} Hz ({sample_format:?})",
        output_channels,
        output_sample_rate
    );

    Ok(OutputConfig {
        device,
        config,
        sample_format,
        output_channels,
        output_sample_rate,
        max_buffer_frames,
    })
}
