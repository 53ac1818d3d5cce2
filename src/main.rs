use anyhow::Result;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::path::PathBuf;
use std::str::FromStr;

use claimdesk_app::{App, Claim};
use claimdesk_config::{constants::MAX_LOG_ENTRIES, Config};
use claimdesk_logger::{self as logger, LogLevel};

fn main() -> Result<()> {
    let config = Config::load().unwrap_or_else(|err| {
        eprintln!("Failed to load config, using defaults: {:#}", err);
        Config::default()
    });

    let min_level = LogLevel::from_str(&config.logging.min_level).unwrap_or(LogLevel::Info);
    logger::init(config.log_file_path(), MAX_LOG_ENTRIES, min_level);
    logger::info("Application started");

    // Optional claim file, otherwise the built-in demo claim
    let claim = match std::env::args().nth(1) {
        Some(path) => Claim::load(&PathBuf::from(path))?,
        None => Claim::demo()?,
    };

    // Initialize terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(&claim, &config);
    let result = app.run(&mut terminal);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    // Print error if there was one
    if let Err(err) = result {
        logger::error(format!("Application error: {:#}", err));
        eprintln!("Error: {:?}", err);
    }

    Ok(())
}
