// src/main.rs

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    terminal::{disable_raw_mode, enable_raw_mode},
};
use std::time::Duration;

use waveplayer_modules::player_controller::PlayerController;

fn main() -> Result<(), anyhow::Error> {
    env_logger::init();

    let initial_file = std::env::args().nth(1);
    let mut player = PlayerController::new(initial_file)?;

    println!("Press [SPACE] Play/Stop | [S] Stop | [←/→] Seek | [↑/↓] Volume | [Q] Quit");

    enable_raw_mode()?;

    // Same cadence as the plugin editor's UI timer.
    let tick = Duration::from_millis(50);

    // Initial draw
    player.run_tick()?;

    loop {
        if event::poll(tick)? {
            if let Event::Key(ev) = event::read()? {
                if ev.kind == KeyEventKind::Press {
                    if ev.code == KeyCode::Char('c')
                        && ev.modifiers.contains(KeyModifiers::CONTROL)
                    {
                        break;
                    }
                    if player.should_quit(ev.code) {
                        break;
                    }
                    player.handle_key(ev.code);
                    // Immediate redraw on input for responsiveness.
                    player.run_tick()?;
                    continue;
                }
            }
        }

        player.run_tick()?;
    }

    disable_raw_mode()?;
    player.shutdown();
    println!("\n🛑 Exiting player.");
    Ok(())
}
