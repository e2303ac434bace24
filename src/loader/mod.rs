// src/loader/mod.rs

pub mod dsp;
pub mod probe;
pub mod wav;

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::engine::SampleBuffer;

pub use probe::SymphoniaHandler;
pub use wav::WavHandler;

/// Result of a successful decode: the full clip in memory plus the file's
/// native sample rate.
#[derive(Debug)]
pub struct DecodedAudio {
    pub buffer: SampleBuffer,
    pub sample_rate: u32,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("audio file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("unsupported or corrupt audio file: {}", .0.display())]
    UnsupportedOrCorrupt(PathBuf),
}

/// One registered decoder capability: a cheap accept check plus the decode
/// itself. Handlers report failures as `anyhow::Error`; the loader folds
/// every failure into the `LoadError` taxonomy at its boundary.
pub trait FormatHandler: Send {
    fn name(&self) -> &'static str;
    fn can_decode(&self, path: &Path) -> bool;
    fn decode(&self, path: &Path) -> anyhow::Result<DecodedAudio>;
}

/// Ordered decoder registry. Handlers are probed in registration order and
/// the first acceptor wins; its decode result is final.
pub struct Loader {
    handlers: Vec<Box<dyn FormatHandler>>,
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

impl Loader {
    /// Registry with the stock handlers: hound for WAV, symphonia for the rest.
    pub fn new() -> Self {
        let mut loader = Self::with_handlers(Vec::new());
        loader.register(Box::new(WavHandler));
        loader.register(Box::new(SymphoniaHandler));
        loader
    }

    pub fn with_handlers(handlers: Vec<Box<dyn FormatHandler>>) -> Self {
        Self { handlers }
    }

    pub fn register(&mut self, handler: Box<dyn FormatHandler>) {
        self.handlers.push(handler);
    }

    /// Decode a file fully into memory. Never touches playback state: the
    /// caller decides whether and when to install the result.
    pub fn load(&self, path: &Path) -> Result<DecodedAudio, LoadError> {
        if !path.is_file() {
            return Err(LoadError::NotFound(path.to_path_buf()));
        }

        let handler = self
            .handlers
            .iter()
            .find(|h| h.can_decode(path))
            .ok_or_else(|| LoadError::UnsupportedOrCorrupt(path.to_path_buf()))?;

        match handler.decode(path) {
            Ok(decoded) => {
                log::info!(
                    "loaded {:?} via {}: {} ch, {} frames @ {} Hz",
                    path.file_name().unwrap_or_default(),
                    handler.name(),
                    decoded.buffer.channel_count(),
                    decoded.buffer.frame_count(),
                    decoded.sample_rate
                );
                Ok(decoded)
            }
            Err(e) => {
                log::warn!("decode failed for {}: {e:#}", path.display());
                Err(LoadError::UnsupportedOrCorrupt(path.to_path_buf()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_file_is_not_found() {
        let loader = Loader::new();
        let err = loader
            .load(Path::new("/nonexistent/waveplayer_missing.wav"))
            .unwrap_err();
        assert!(matches!(err, LoadError::NotFound(_)));
    }

    #[test]
    fn unknown_format_is_rejected() {
        let path = std::env::temp_dir().join("waveplayer_loader_unknown.txt");
        std::fs::write(&path, b"not audio").unwrap();

        let loader = Loader::new();
        let err = loader.load(&path).unwrap_err();
        assert!(matches!(err, LoadError::UnsupportedOrCorrupt(_)));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn corrupt_wav_is_rejected() {
        let path = std::env::temp_dir().join("waveplayer_loader_corrupt.wav");
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(b"RIFF\x00\x00\x00\x00WAVEgarbage").unwrap();
        drop(f);

        let loader = Loader::new();
        let err = loader.load(&path).unwrap_err();
        assert!(matches!(err, LoadError::UnsupportedOrCorrupt(_)));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn loads_wav_end_to_end() {
        let path = std::env::temp_dir().join("waveplayer_loader_ok.wav");
        let spec = hound::WavSpec {
            channels: 2,
            sample_rate: 44100,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(&path, spec).unwrap();
        for _ in 0..441 {
            writer.write_sample(1000i16).unwrap();
            writer.write_sample(1000i16).unwrap();
        }
        writer.finalize().unwrap();

        let decoded = Loader::new().load(&path).unwrap();
        assert_eq!(decoded.sample_rate, 44100);
        assert_eq!(decoded.buffer.channel_count(), 2);
        assert_eq!(decoded.buffer.frame_count(), 441);
        let _ = std::fs::remove_file(&path);
    }
}
