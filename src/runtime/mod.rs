use std::env;
use std::error::Error;
use std::path::PathBuf;

use async_io::block_on;
use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::{info, warn};

mod event_loop;
mod logging;
mod settings;
mod startup;

pub use startup::Controller;

/// `eightd [--dump-config] <file-or-dir>...`
pub fn run() -> Result<(), Box<dyn Error>> {
    let args: Vec<String> = env::args().skip(1).collect();
    let (settings, problem) = settings::load_settings();

    if args.iter().any(|a| a == "--dump-config") {
        if let Some(problem) = &problem {
            eprintln!("eightd: {problem}");
        }
        print!("{}", settings.to_toml()?);
        return Ok(());
    }

    if !logging::init(&settings.logging)? {
        if let Some(problem) = &problem {
            eprintln!("eightd: {problem}");
        }
    }
    if let Some(problem) = &problem {
        warn!("{problem}");
    }

    let mut paths: Vec<PathBuf> = args
        .iter()
        .filter(|a| !a.starts_with("--"))
        .map(PathBuf::from)
        .collect();
    if paths.is_empty() {
        paths.push(env::current_dir()?);
    }

    let inputs = startup::load_inputs(&paths, &settings.library);
    let controller = startup::build_controller(&settings);
    let added = block_on(controller.add_files(inputs));
    info!(
        added = added.added,
        duplicates = added.duplicates,
        started = added.started,
        "playlist loaded"
    );

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let run_result = {
        let mut state = event_loop::EventLoopState::new(&controller);
        event_loop::run(&mut terminal, &settings, &controller, &mut state)
    };

    let revoked = controller.teardown();
    info!(revoked, "session closed");

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    run_result
}
