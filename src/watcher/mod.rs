// src/watcher/mod.rs

use std::fs;
use std::path::{Path, PathBuf};

/// Sentinel for "file not present".
const ABSENT: i64 = -1;

/// Well-known drop location polled for externally produced audio: a fresh
/// recording written here is picked up and auto-played.
pub fn default_watched_path() -> PathBuf {
    std::env::temp_dir().join("chat.wav")
}

/// Size-poll state machine over a single path. A change in byte size (file
/// grew, shrank or appeared) fires a reload; disappearance just resets the
/// state. Comparing size only is a deliberate cheap heuristic: a same-size
/// content swap goes unnoticed.
pub struct WatchedFile {
    path: PathBuf,
    last_size: i64,
}

impl WatchedFile {
    /// Start watching `path`, seeded with its current size so a file that
    /// already exists at startup does not fire immediately.
    pub fn new(path: PathBuf) -> Self {
        let last_size = fs::metadata(&path).map(|m| m.len() as i64).unwrap_or(ABSENT);
        Self { path, last_size }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// One poll tick: read the current size and run the transition.
    pub fn poll(&mut self) -> bool {
        let size = fs::metadata(&self.path).ok().map(|m| m.len());
        self.observe(size)
    }

    /// Pure state transition over one observed size. Returns true when a
    /// reload-and-play should fire.
    pub fn observe(&mut self, size: Option<u64>) -> bool {
        match size {
            None => {
                if self.last_size != ABSENT {
                    log::debug!("watched file {} disappeared", self.path.display());
                }
                self.last_size = ABSENT;
                false
            }
            Some(size) => {
                let size = size as i64;
                let fire = size > 0 && size != self.last_size;
                self.last_size = size;
                if fire {
                    log::info!(
                        "watched file {} changed ({} bytes), reloading",
                        self.path.display(),
                        size
                    );
                }
                fire
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn watcher_starting_absent() -> WatchedFile {
        // A path that does not exist seeds the absent state.
        WatchedFile::new(std::env::temp_dir().join("waveplayer_watch_never_exists.wav"))
    }

    #[test]
    fn fires_on_every_size_change_but_not_on_disappearance() {
        let mut w = watcher_starting_absent();
        let observations = [None, Some(1000), Some(1000), Some(2000), None, Some(500)];
        let fired: Vec<bool> = observations
            .iter()
            .map(|o| w.observe(*o))
            .collect();
        assert_eq!(fired, [false, true, false, true, false, true]);
    }

    #[test]
    fn empty_file_does_not_fire() {
        let mut w = watcher_starting_absent();
        assert!(!w.observe(Some(0)));
        // Growing from empty fires.
        assert!(w.observe(Some(100)));
    }

    #[test]
    fn poll_reads_real_file_sizes() {
        let path = std::env::temp_dir().join("waveplayer_watch_poll_test.wav");
        let _ = fs::remove_file(&path);

        let mut w = WatchedFile::new(path.clone());
        assert!(!w.poll());

        fs::write(&path, vec![0u8; 128]).unwrap();
        assert!(w.poll());
        assert!(!w.poll());

        fs::write(&path, vec![0u8; 256]).unwrap();
        assert!(w.poll());

        fs::remove_file(&path).unwrap();
        assert!(!w.poll());
    }

    #[test]
    fn preexisting_file_does_not_fire_at_startup() {
        let path = std::env::temp_dir().join("waveplayer_watch_seed_test.wav");
        fs::write(&path, vec![0u8; 64]).unwrap();

        let mut w = WatchedFile::new(path.clone());
        assert!(!w.poll());

        let _ = fs::remove_file(&path);
    }
}
