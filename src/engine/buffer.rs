// src/engine/buffer.rs

/// Fully decoded audio held in planar form: one `Vec<f32>` per channel,
/// all channels the same length. The shape is fixed once built; replacing
/// the audio means replacing the whole buffer.
#[derive(Debug, Default, Clone)]
pub struct SampleBuffer {
    channels: Vec<Vec<f32>>,
    frames: usize,
}

impl SampleBuffer {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build from planar channel data. Rows are truncated to the shortest
    /// channel so every channel reports the same frame count.
    pub fn from_planar(mut channels: Vec<Vec<f32>>) -> Self {
        let frames = channels.iter().map(|c| c.len()).min().unwrap_or(0);
        for ch in &mut channels {
            ch.truncate(frames);
        }
        Self { channels, frames }
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    pub fn frame_count(&self) -> usize {
        self.frames
    }

    pub fn is_empty(&self) -> bool {
        self.frames == 0 || self.channels.is_empty()
    }

    pub fn channel(&self, index: usize) -> &[f32] {
        &self.channels[index]
    }
}
