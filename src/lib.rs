// src/lib.rs

pub mod audio;
pub mod audio_runtime;
pub mod engine;
pub mod loader;
pub mod player_controller;
pub mod session;
pub mod watcher;

pub use audio_runtime::AudioRuntime;
pub use engine::{PlaybackEngine, SampleBuffer};
pub use loader::{LoadError, Loader};
pub use session::PlayerManifest;
pub use watcher::WatchedFile;
