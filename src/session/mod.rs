// src/session/mod.rs

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::engine::PlaybackEngine;
use crate::loader::Loader;

/// Where the `player` binary keeps its state between runs.
pub fn default_state_path() -> PathBuf {
    std::env::temp_dir().join("waveplayer_state.json")
}

/// The two fields of player state that survive a restart: which file was
/// loaded last, and the volume. Stored as pretty JSON.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct PlayerManifest {
    pub version: u32,
    pub last_file_path: Option<String>,
    pub gain: f32,
}

impl PlayerManifest {
    pub fn new(last_file_path: Option<String>, gain: f32) -> Self {
        Self {
            version: 1,
            last_file_path,
            gain,
        }
    }

    pub fn save_to_disk(&self, path: &Path) -> Result<()> {
        let file = File::create(path)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    pub fn load_from_disk(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let manifest = serde_json::from_reader(reader)?;
        Ok(manifest)
    }

    /// Apply the manifest to a fresh engine: gain first, then a single load
    /// attempt for the remembered file. A path that is gone (or no longer
    /// decodes) is non-fatal; the engine just stays silent. Playback is
    /// never started here.
    pub fn restore_into(&self, engine: &mut PlaybackEngine, loader: &Loader) {
        engine.set_gain(self.gain);

        if let Some(path) = self.last_file_path.as_deref() {
            match loader.load(Path::new(path)) {
                Ok(decoded) => engine.install_buffer(decoded.buffer, decoded.sample_rate),
                Err(e) => log::info!("skipping restore of last file: {e}"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::{DecodedAudio, FormatHandler};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct CountingHandler {
        calls: Arc<AtomicUsize>,
    }

    impl FormatHandler for CountingHandler {
        fn name(&self) -> &'static str {
            "counting"
        }
        fn can_decode(&self, _path: &Path) -> bool {
            true
        }
        fn decode(&self, _path: &Path) -> anyhow::Result<DecodedAudio> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(DecodedAudio {
                buffer: crate::engine::SampleBuffer::from_planar(vec![vec![1.0; 100]; 2]),
                sample_rate: 44100,
            })
        }
    }

    fn counting_loader() -> (Loader, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut loader = Loader::with_handlers(Vec::new());
        loader.register(Box::new(CountingHandler {
            calls: calls.clone(),
        }));
        (loader, calls)
    }

    #[test]
    fn manifest_round_trips_through_json() {
        let path = std::env::temp_dir().join("waveplayer_manifest_roundtrip.json");
        let manifest = PlayerManifest::new(Some("/tmp/clip.wav".into()), 0.25);
        manifest.save_to_disk(&path).unwrap();

        let loaded = PlayerManifest::load_from_disk(&path).unwrap();
        assert_eq!(loaded.version, 1);
        assert_eq!(loaded.last_file_path.as_deref(), Some("/tmp/clip.wav"));
        assert!((loaded.gain - 0.25).abs() < 1e-6);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn restore_applies_gain_and_loads_exactly_once() {
        let (loader, calls) = counting_loader();
        let mut engine = PlaybackEngine::new();

        // Use a real temp file so `load` gets past the NotFound gate.
        let path = std::env::temp_dir().join("waveplayer_restore_once.wav");
        std::fs::write(&path, b"stub").unwrap();

        let manifest =
            PlayerManifest::new(Some(path.to_string_lossy().into_owned()), 0.25);
        manifest.restore_into(&mut engine, &loader);

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!((engine.gain() - 0.25).abs() < 1e-6);
        assert!(!engine.is_playing());
        assert!(engine.total_seconds() > 0.0);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn restore_with_missing_file_keeps_default_silence() {
        let (loader, calls) = counting_loader();
        let mut engine = PlaybackEngine::new();

        let manifest = PlayerManifest::new(
            Some("/nonexistent/waveplayer_gone.wav".into()),
            0.9,
        );
        manifest.restore_into(&mut engine, &loader);

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!((engine.gain() - 0.9).abs() < 1e-6);
        assert_eq!(engine.total_seconds(), 0.0);
        assert!(!engine.is_playing());
    }

    #[test]
    fn restore_with_no_path_only_sets_gain() {
        let (loader, calls) = counting_loader();
        let mut engine = PlaybackEngine::new();

        PlayerManifest::new(None, 0.5).restore_into(&mut engine, &loader);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!((engine.gain() - 0.5).abs() < 1e-6);
    }
}
