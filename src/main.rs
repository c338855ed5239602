use chrono::Local;
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use std::{
    io,
    path::PathBuf,
    process::ExitCode,
    time::Instant,
};
use tracing::{error, info};

use rcountdown::{
    app::{App, TICK_RATE},
    cli::{self, Args},
    config::AdjustConfig,
    logging::{self, Sink},
    storage,
    store::TimerStore,
    ui::render_ui,
    Result,
};

// ============================================================================
// Main
// ============================================================================

fn main() -> ExitCode {
    let Args { data_file, config, verbose, no_notify, no_sound, command } = Args::parse();
    let data_file = data_file.unwrap_or_else(storage::default_data_file);

    let result = match command {
        Some(command) => {
            logging::init(Sink::Stderr, verbose);
            cli::run(command, &data_file, Local::now(), &mut io::stdout(), &mut io::stdin().lock())
        }
        None => {
            logging::init(Sink::File(storage::log_file()), verbose);
            let config = AdjustConfig::load(&config.unwrap_or_else(storage::default_config_file));
            tui(data_file, config, !no_notify, !no_sound).inspect_err(|e| error!("{}", e))
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn tui(data_file: PathBuf, config: AdjustConfig, notifications: bool, sound: bool) -> Result<()> {
    let store = TimerStore::from_timers(storage::load_timers(&data_file)?);
    info!(count = store.len(), path = %data_file.display(), "starting session");
    let mut app = App::new(store, config, data_file, Local::now()).with_notifications(notifications, sound);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res
}

fn run(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    let mut last_tick = Instant::now();

    loop {
        terminal.draw(|f| render_ui(f, app))?;

        let timeout = TICK_RATE.saturating_sub(last_tick.elapsed());
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press && app.handle_key(key) {
                    app.save_on_quit();
                    return Ok(());
                }
            }
        }

        if last_tick.elapsed() >= TICK_RATE {
            app.update(Local::now());
            app.check_external_change();
            last_tick = Instant::now();
        }
    }
}
