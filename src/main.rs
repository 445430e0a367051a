//! Wirthforge - Entry Point
//!
//! Loads configuration, opens persisted state, sets up the terminal and runs
//! the frame loop.

use std::fs::OpenOptions;
use std::io;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};

use wirthforge::achievements::AchievementRegistry;
use wirthforge::config::ForgeConfig;
use wirthforge::energy::EnergySimulationStore;
use wirthforge::storage::KeyValueStore;
use wirthforge::ui::App;

fn main() -> Result<()> {
    let (config, config_source) = ForgeConfig::load();
    init_logging(&config);
    config_source.log();

    log::info!("Starting Wirthforge v{}", env!("CARGO_PKG_VERSION"));

    let mut registry = AchievementRegistry::new(config.open_storage());
    registry.initialize();
    let store = EnergySimulationStore::from_config(&config);
    let mut app = App::new(registry, store, &config);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_frame_loop(&mut terminal, &mut app, config.frame_time());

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(ref e) = result {
        log::error!("Exited with error: {}", e);
        eprintln!("Error: {}", e);
    }

    log::info!("Wirthforge shut down cleanly");
    result
}

/// Log to a file so output does not interfere with the TUI
fn init_logging(config: &ForgeConfig) {
    let log_file = match OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open("wirthforge.log")
    {
        Ok(file) => file,
        Err(e) => {
            eprintln!("Logging disabled: cannot open wirthforge.log: {}", e);
            return;
        }
    };

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.log_filter.as_str()),
    )
    .target(env_logger::Target::Pipe(Box::new(log_file)))
    .init();
}

fn run_frame_loop<S: KeyValueStore>(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App<S>,
    frame_time: Duration,
) -> Result<()> {
    let mut last_frame = Instant::now();

    loop {
        let frame_start = Instant::now();
        let delta = frame_start.duration_since(last_frame);
        last_frame = frame_start;

        // Drain pending input
        while event::poll(Duration::from_millis(0))? {
            if let Event::Key(key) = event::read()? {
                // Only handle key press events, not releases
                if key.kind == KeyEventKind::Press {
                    match app.handle_input(key) {
                        Ok(true) => return Ok(()),
                        Ok(false) => {}
                        Err(e) => log::warn!("Input handling error: {}", e),
                    }
                }
            }
        }

        app.update(delta);

        terminal.draw(|frame| app.render(frame))?;

        let elapsed = frame_start.elapsed();
        if elapsed < frame_time {
            std::thread::sleep(frame_time - elapsed);
        }
    }
}
