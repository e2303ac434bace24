// src/engine/mod.rs

pub mod buffer;

pub use buffer::SampleBuffer;

/// Default volume, matching the plugin's volume parameter default.
const DEFAULT_GAIN: f32 = 0.7;

/// Single-clip playback engine: owns the decoded buffer, a play flag and a
/// sample cursor, and renders fixed-size blocks for the audio callback.
///
/// Control operations (start/stop/seek/install) run in the control context;
/// `render` runs in the real-time callback and never allocates or blocks.
pub struct PlaybackEngine {
    buffer: SampleBuffer,
    playing: bool,
    cursor: usize,
    source_sample_rate: u32,
    gain: f32,
}

impl Default for PlaybackEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl PlaybackEngine {
    pub fn new() -> Self {
        Self {
            buffer: SampleBuffer::empty(),
            playing: false,
            cursor: 0,
            source_sample_rate: 0,
            gain: DEFAULT_GAIN,
        }
    }

    // --- BUFFER INSTALL ---

    /// Replace the active buffer and source rate, resetting the cursor.
    /// Does not touch the play flag; "load and play" is two explicit calls.
    pub fn install_buffer(&mut self, buffer: SampleBuffer, sample_rate: u32) {
        self.buffer = buffer;
        self.source_sample_rate = sample_rate;
        self.cursor = 0;
    }

    // --- TRANSPORT ---

    /// Start always restarts from frame 0. There is no pause/resume:
    /// the transport toggles between "start from zero" and "stop".
    pub fn start(&mut self) {
        self.playing = true;
        self.cursor = 0;
    }

    pub fn stop(&mut self) {
        self.playing = false;
        self.cursor = 0;
    }

    /// Move the cursor to the given position, clamped to [0, frame_count].
    /// Does not change the play flag.
    pub fn seek_seconds(&mut self, seconds: f64) {
        let target = (seconds * self.source_sample_rate as f64).round();
        let max = self.buffer.frame_count();
        self.cursor = if target <= 0.0 {
            0
        } else {
            (target as usize).min(max)
        };
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    // --- GAIN ---

    pub fn set_gain(&mut self, gain: f32) {
        self.gain = gain.clamp(0.0, 1.0);
    }

    pub fn gain(&self) -> f32 {
        self.gain
    }

    // --- DERIVED TIMES ---

    pub fn position_seconds(&self) -> f64 {
        if self.source_sample_rate == 0 || self.buffer.is_empty() {
            return 0.0;
        }
        self.cursor as f64 / self.source_sample_rate as f64
    }

    pub fn total_seconds(&self) -> f64 {
        if self.source_sample_rate == 0 || self.buffer.is_empty() {
            return 0.0;
        }
        self.buffer.frame_count() as f64 / self.source_sample_rate as f64
    }

    // --- RENDER ---

    /// Fill `frames` samples of every channel in `out` for one callback block.
    ///
    /// `out` is the planar callback scratch; each channel must hold at least
    /// `frames` samples. Extra output channels beyond the source stay silent,
    /// extra source channels beyond the output are dropped.
    pub fn render(&mut self, out: &mut [Vec<f32>], frames: usize) {
        // Silence first, so every early return leaves a clean block.
        for ch in out.iter_mut() {
            ch[..frames].fill(0.0);
        }

        if !self.playing || self.buffer.is_empty() {
            return;
        }

        let source_frames = self.buffer.frame_count();
        let available = source_frames.saturating_sub(self.cursor);
        let to_copy = frames.min(available);

        let channels = out.len().min(self.buffer.channel_count());
        for ch in 0..channels {
            let src = self.buffer.channel(ch);
            out[ch][..to_copy].copy_from_slice(&src[self.cursor..self.cursor + to_copy]);
        }

        // Advance by the full block so end-of-stream detection is exact.
        self.cursor += frames;
        if self.cursor >= source_frames {
            self.playing = false;
            self.cursor = 0;
        }

        if (self.gain - 1.0).abs() > f32::EPSILON {
            for ch in out.iter_mut() {
                for sample in &mut ch[..frames] {
                    *sample *= self.gain;
                }
            }
        }
    }
}
