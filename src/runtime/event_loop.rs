use std::error::Error;
use std::fmt::Display;
use std::time::Duration;

use async_io::block_on;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::debug;

use crate::config;
use crate::ui;

use super::startup::Controller;

/// State tracked by the runtime event loop across iterations.
pub struct EventLoopState {
    /// Highlighted playlist row.
    pub cursor: usize,
    /// Duration last forwarded to the view, so it is announced once per track.
    last_duration: Option<f64>,
    /// Playing index seen last iteration; the cursor follows changes to it.
    last_current: Option<usize>,
}

impl EventLoopState {
    pub fn new(controller: &Controller) -> Self {
        Self {
            cursor: controller.current_index().unwrap_or(0),
            last_duration: None,
            last_current: controller.current_index(),
        }
    }
}

/// Errors are already on screen through the view; keep them in the log too.
fn report<T, E: Display>(action: &str, result: Result<T, E>) {
    if let Err(e) = result {
        debug!(action, error = %e, "request failed");
    }
}

/// Forward media events to the controller.
fn sync_media(controller: &Controller, state: &mut EventLoopState) {
    if let Some(status) = controller.media_status() {
        if status.ended {
            report("advance", block_on(controller.on_track_ended()));
        } else if !status.paused {
            controller.on_time_update();
        }
        if let Some(duration) = status.duration {
            if state.last_duration != Some(duration) {
                controller.on_duration_known(duration);
                state.last_duration = Some(duration);
            }
        }
    }

    let current = controller.current_index();
    if current != state.last_current {
        if let Some(index) = current {
            state.cursor = index;
        }
        state.last_current = current;
        state.last_duration = None;
    }
}

/// Main terminal loop. Returns `Ok(())` when the user quits.
pub fn run(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    settings: &config::Settings,
    controller: &Controller,
    state: &mut EventLoopState,
) -> Result<(), Box<dyn Error>> {
    loop {
        sync_media(controller, state);
        controller.poll_metadata();

        {
            let snapshot = controller.view().snapshot();
            terminal.draw(|f| {
                ui::draw(f, &snapshot, state.cursor, &settings.ui, &settings.controls)
            })?;
        }

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if handle_key_event(key, settings, controller, state) {
                    break;
                }
            }
        }
    }

    Ok(())
}

/// Returns true when the user asked to quit.
fn handle_key_event(
    key: KeyEvent,
    settings: &config::Settings,
    controller: &Controller,
    state: &mut EventLoopState,
) -> bool {
    let count = controller.track_count();
    match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::Char('j') => {
            state.cursor = (state.cursor + 1).min(count.saturating_sub(1));
        }
        KeyCode::Char('k') => {
            state.cursor = state.cursor.saturating_sub(1);
        }
        KeyCode::Enter => {
            if count > 0 {
                report("play", block_on(controller.play_track_at(state.cursor)));
            }
        }
        KeyCode::Char('p') | KeyCode::Char(' ') => {
            report("toggle", block_on(controller.toggle_play_pause()));
        }
        KeyCode::Char('h') => {
            report("seek", controller.seek_by(-settings.controls.seek_step));
        }
        KeyCode::Char('l') => {
            report("seek", controller.seek_by(settings.controls.seek_step));
        }
        KeyCode::Char(c @ '0'..='9') => {
            let tenth = f64::from(c as u8 - b'0');
            report("seek", controller.seek_to_fraction(tenth / 10.0));
        }
        KeyCode::Char('b') => report("preset", controller.apply_preset("bass")),
        KeyCode::Char('v') => report("preset", controller.apply_preset("vocal")),
        KeyCode::Char('n') => report("preset", controller.apply_preset("balanced")),
        _ => {}
    }
    false
}
