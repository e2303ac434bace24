// src/player_controller.rs

use std::io::{stdout, Write};
use std::path::{Path, PathBuf};

use crossterm::event::KeyCode;

use crate::audio_runtime::AudioRuntime;
use crate::session::default_state_path;

const SEEK_STEP_SECONDS: f64 = 5.0;
const GAIN_STEP: f32 = 0.05;

/// Terminal transport driving the AudioRuntime: one status line, a handful
/// of keys, and the watcher tick. Stands in for the plugin's editor UI.
pub struct PlayerController {
    audio: AudioRuntime,
    state_path: PathBuf,

    // Redraw gating so the status line only repaints when it changes.
    cached_position_secs: u64,
    cached_playing: bool,
    force_redraw: bool,

    // Reusable buffer for CLI output.
    draw_buffer: String,
}

impl PlayerController {
    pub fn new(initial_file: Option<String>) -> Result<Self, anyhow::Error> {
        let mut audio = AudioRuntime::new()?;

        // Restore {last file, gain} first; an explicit CLI path wins over it.
        let state_path = default_state_path();
        audio.restore_state(&state_path);

        if let Some(path) = initial_file {
            match audio.load(Path::new(&path)) {
                Ok(()) => println!("🎧 Loaded {path}"),
                Err(e) => println!("⚠️ {e}"),
            }
        }

        Ok(Self {
            audio,
            state_path,
            cached_position_secs: u64::MAX,
            cached_playing: false,
            force_redraw: true,
            draw_buffer: String::with_capacity(120),
        })
    }

    pub fn should_quit(&self, code: KeyCode) -> bool {
        matches!(code, KeyCode::Char('q') | KeyCode::Char('Q'))
    }

    pub fn handle_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char(' ') => self.audio.toggle(),
            KeyCode::Char('s') | KeyCode::Char('S') => self.audio.stop(),
            KeyCode::Left => {
                let pos = self.audio.position_seconds();
                self.audio.seek_seconds(pos - SEEK_STEP_SECONDS);
            }
            KeyCode::Right => {
                let pos = self.audio.position_seconds();
                self.audio.seek_seconds(pos + SEEK_STEP_SECONDS);
            }
            KeyCode::Up => {
                let gain = self.audio.gain();
                self.audio.set_gain(gain + GAIN_STEP);
            }
            KeyCode::Down => {
                let gain = self.audio.gain();
                self.audio.set_gain(gain - GAIN_STEP);
            }
            _ => return,
        }
        self.force_redraw = true;
    }

    /// One cooperative tick: poll the watched file, then refresh the status
    /// line if anything visible moved.
    pub fn run_tick(&mut self) -> Result<(), anyhow::Error> {
        self.audio.tick_watcher();

        let position = self.audio.position_seconds();
        let playing = self.audio.is_playing();
        let position_secs = position as u64;

        if !self.force_redraw
            && position_secs == self.cached_position_secs
            && playing == self.cached_playing
        {
            return Ok(());
        }
        self.cached_position_secs = position_secs;
        self.cached_playing = playing;
        self.force_redraw = false;

        self.draw_buffer.clear();
        self.draw_buffer.push('\r');
        self.draw_buffer
            .push_str(if playing { "▶️ " } else { "⏸️ " });
        self.draw_buffer.push_str(&format_time(position));
        self.draw_buffer.push_str(" / ");
        self.draw_buffer
            .push_str(&format_time(self.audio.total_seconds()));
        self.draw_buffer
            .push_str(&format!("  🔊 {:3.0}%", self.audio.gain() * 100.0));
        if let Some(name) = self
            .audio
            .current_path()
            .and_then(|p| p.file_name())
            .and_then(|n| n.to_str())
        {
            self.draw_buffer.push_str("  ");
            self.draw_buffer.push_str(name);
        } else {
            self.draw_buffer.push_str("  (no file loaded)");
        }
        // Pad so a shorter line fully overwrites the previous one.
        while self.draw_buffer.len() < 72 {
            self.draw_buffer.push(' ');
        }

        let mut out = stdout();
        out.write_all(self.draw_buffer.as_bytes())?;
        out.flush()?;
        Ok(())
    }

    /// Persist {last file, gain} on the way out.
    pub fn shutdown(&self) {
        if let Err(e) = self.audio.save_state(&self.state_path) {
            log::warn!("failed to save player state: {e:#}");
        }
    }
}

/// mm:ss for the transport label.
fn format_time(seconds: f64) -> String {
    let mins = (seconds / 60.0) as u64;
    let secs = (seconds - mins as f64 * 60.0) as u64;
    format!("{mins:02}:{secs:02}")
}
