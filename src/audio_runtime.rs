// src/audio_runtime.rs

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use cpal::traits::{DeviceTrait, StreamTrait};
use cpal::{SampleFormat, Stream, StreamConfig};
use parking_lot::Mutex;

use crate::audio::{setup_output_device, OutputConfig};
use crate::engine::PlaybackEngine;
use crate::loader::{LoadError, Loader};
use crate::session::PlayerManifest;
use crate::watcher::{default_watched_path, WatchedFile};

/// Owns the PlaybackEngine + CPAL stream and exposes a simple control API.
///
/// The engine sits behind a mutex shared with the audio callback. The
/// callback only ever `try_lock`s (silence when contended), and the control
/// side decodes files *before* taking the lock, so the critical section on
/// install is a buffer swap and the render path never waits on disk or
/// decode work.
pub struct AudioRuntime {
    engine: Arc<Mutex<PlaybackEngine>>,
    loader: Loader,
    watcher: WatchedFile,
    current_path: Option<PathBuf>,
    _stream: Stream,
}

impl AudioRuntime {
    pub fn new() -> Result<Self> {
        Self::with_watched_path(default_watched_path())
    }

    pub fn with_watched_path(watched: PathBuf) -> Result<Self> {
        let output = setup_output_device()?;
        let engine = Arc::new(Mutex::new(PlaybackEngine::new()));

        let OutputConfig {
            device,
            config,
            sample_format,
            output_channels,
            max_buffer_frames,
            ..
        } = output;

        let stream = match sample_format {
            SampleFormat::F32 => build_stream::<f32>(
                &device,
                &config,
                output_channels,
                max_buffer_frames,
                engine.clone(),
            ),
            SampleFormat::I16 => build_stream::<i16>(
                &device,
                &config,
                output_channels,
                max_buffer_frames,
                engine.clone(),
            ),
            SampleFormat::U16 => build_stream::<u16>(
                &device,
                &config,
                output_channels,
                max_buffer_frames,
                engine.clone(),
            ),
            other => anyhow::bail!("unsupported sample format: {other:?}"),
        }?;

        stream.play()?;

        Ok(Self {
            engine,
            loader: Loader::new(),
            watcher: WatchedFile::new(watched),
            current_path: None,
            _stream: stream,
        })
    }

    // --- LOADING ---

    /// Decode a file and install it. A failed load leaves the previous
    /// buffer and playback state untouched.
    pub fn load(&mut self, path: &Path) -> Result<(), LoadError> {
        let decoded = self.loader.load(path)?;
        {
            let mut eng = self.engine.lock();
            eng.install_buffer(decoded.buffer, decoded.sample_rate);
        }
        self.current_path = Some(path.to_path_buf());
        Ok(())
    }

    pub fn load_and_play(&mut self, path: &Path) -> Result<(), LoadError> {
        self.load(path)?;
        self.start();
        Ok(())
    }

    pub fn current_path(&self) -> Option<&Path> {
        self.current_path.as_deref()
    }

    // --- TRANSPORT ---

    pub fn start(&self) {
        self.engine.lock().start();
    }

    pub fn stop(&self) {
        self.engine.lock().stop();
    }

    /// Play-button semantics: stop if playing, otherwise restart from the
    /// top. There is no pause/resume.
    pub fn toggle(&self) {
        let mut eng = self.engine.lock();
        if eng.is_playing() {
            eng.stop();
        } else {
            eng.start();
        }
    }

    pub fn seek_seconds(&self, seconds: f64) {
        self.engine.lock().seek_seconds(seconds);
    }

    pub fn is_playing(&self) -> bool {
        self.engine.lock().is_playing()
    }

    pub fn position_seconds(&self) -> f64 {
        self.engine.lock().position_seconds()
    }

    pub fn total_seconds(&self) -> f64 {
        self.engine.lock().total_seconds()
    }

    // --- GAIN ---

    pub fn set_gain(&self, gain: f32) {
        self.engine.lock().set_gain(gain);
    }

    pub fn gain(&self) -> f32 {
        self.engine.lock().gain()
    }

    // --- WATCHER ---

    /// One control-loop tick of the file watcher: when the watched file
    /// changed size, reload it and auto-play. Load failures are logged and
    /// otherwise ignored.
    pub fn tick_watcher(&mut self) {
        if self.watcher.poll() {
            let path = self.watcher.path().to_path_buf();
            if let Err(e) = self.load_and_play(&path) {
                log::warn!("watched file reload failed: {e}");
            }
        }
    }

    // --- PERSISTED STATE ---

    /// Restore {last file, gain} from disk. Runs at startup, before any
    /// playback; a missing or stale manifest is non-fatal.
    pub fn restore_state(&mut self, state_path: &Path) {
        let manifest = match PlayerManifest::load_from_disk(state_path) {
            Ok(m) => m,
            Err(e) => {
                log::debug!("no player state restored: {e}");
                return;
            }
        };

        {
            let mut eng = self.engine.lock();
            manifest.restore_into(&mut eng, &self.loader);
        }
        if self.total_seconds() > 0.0 {
            self.current_path = manifest.last_file_path.map(PathBuf::from);
        }
    }

    pub fn save_state(&self, state_path: &Path) -> Result<()> {
        let manifest = PlayerManifest::new(
            self.current_path
                .as_ref()
                .map(|p| p.to_string_lossy().into_owned()),
            self.gain(),
        );
        manifest.save_to_disk(state_path)
    }
}

/// Build the CPAL output stream. The engine renders into a persistent planar
/// scratch sized to the device channel count and pre-allocated to the
/// device's maximum buffer size, so the callback never allocates; the
/// closure interleaves that into whatever sample format the device wants.
fn build_stream<T>(
    device: &cpal::Device,
    config: &StreamConfig,
    channels: usize,
    max_buffer_frames: usize,
    engine: Arc<Mutex<PlaybackEngine>>,
) -> Result<Stream>
where
    T: cpal::Sample + cpal::FromSample<f32> + cpal::SizedSample,
{
    let mut scratch: Vec<Vec<f32>> = vec![vec![0.0; max_buffer_frames]; channels];
    let err_fn = |err| log::error!("audio output error: {err}");

    let stream = device.build_output_stream(
        config,
        move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
            // Clamp rather than grow the scratch if the device ever hands us
            // more frames than it advertised.
            let frames = (data.len() / channels).min(max_buffer_frames);

            // Never block the device thread on the control context.
            match engine.try_lock() {
                Some(mut eng) => {
                    eng.render(&mut scratch, frames);
                    let mut whole = data.chunks_exact_mut(channels);
                    for (f, frame) in whole.by_ref().take(frames).enumerate() {
                        for (ch, sample) in frame.iter_mut().enumerate() {
                            *sample = T::from_sample(scratch[ch][f]);
                        }
                    }
                    for frame in whole.by_ref() {
                        for sample in frame.iter_mut() {
                            *sample = T::from_sample(0.0);
                        }
                    }
                    for sample in whole.into_remainder() {
                        *sample = T::from_sample(0.0);
                    }
                }
                None => {
                    data.fill(T::from_sample(0.0));
                }
            }
        },
        err_fn,
        None,
    )?;

    Ok(stream)
}
