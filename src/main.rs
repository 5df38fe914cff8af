//! MathVibe terminal front end

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use mathvibe::app::AppCoordinator;
use mathvibe::config::Config;
use mathvibe::storage::{Backend, OfflineBackend, Storage};
use mathvibe::tui::{self, Tui};
use std::path::Path;
use std::time::{Duration, Instant};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Longest wait for input before redrawing
const IDLE_REDRAW: Duration = Duration::from_millis(250);

fn main() -> Result<()> {
    let config = Config::from_env();
    setup_logging(&config.log_dir).context("failed to set up logging")?;
    tracing::info!(?config, "starting mathvibe");

    let backend = open_backend(&config);

    // Initialize terminal
    let mut terminal = Tui::new().context("failed to create terminal")?;
    terminal.enter().context("failed to enter raw mode")?;

    let mut coordinator = AppCoordinator::new(backend, &config);
    run(&mut terminal, &mut coordinator)?;

    tracing::info!("exiting");
    // Terminal cleanup happens automatically via Tui::drop
    Ok(())
}

/// Main event loop
fn run(terminal: &mut Tui, coordinator: &mut AppCoordinator) -> Result<()> {
    loop {
        // Render
        terminal
            .draw(|frame| tui::render(frame, coordinator))
            .context("failed to draw frame")?;

        // Sleep until the next timer or input, whichever comes first
        let now = Instant::now();
        let timeout = coordinator
            .next_deadline()
            .map(|due| due.saturating_duration_since(now))
            .unwrap_or(IDLE_REDRAW)
            .min(IDLE_REDRAW);

        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                // Only handle key press events (not release)
                if key.kind == KeyEventKind::Press {
                    handle_key(coordinator, key.code, Instant::now());
                }
            }
        }

        coordinator.poll(Instant::now());

        // Check for quit
        if coordinator.should_quit {
            return Ok(());
        }
    }
}

fn handle_key(coordinator: &mut AppCoordinator, code: KeyCode, now: Instant) {
    match code {
        KeyCode::Esc => coordinator.back(),
        KeyCode::Enter => coordinator.select(now),
        KeyCode::Up => coordinator.up(),
        KeyCode::Down => coordinator.down(),
        KeyCode::Left => coordinator.left(),
        KeyCode::Right => coordinator.right(),
        KeyCode::Backspace => coordinator.backspace(),
        KeyCode::Delete | KeyCode::Char('c') | KeyCode::Char('C') => coordinator.clear(),
        KeyCode::Char(c) if c.is_ascii_digit() => coordinator.digit(c),
        _ => {}
    }
}

/// Open the SQLite store, or run offline if that fails
fn open_backend(config: &Config) -> Box<dyn Backend> {
    let opened = match &config.db_path {
        Some(path) => Storage::open_at(path),
        None => Storage::open(),
    };

    match opened {
        Ok(storage) => {
            if let Err(e) = storage.seed_default_profiles() {
                tracing::warn!(error = %e, "failed to seed default profiles");
            }
            Box::new(storage)
        }
        Err(e) => {
            tracing::warn!(error = %e, "storage unavailable, scores will not be saved");
            Box::new(OfflineBackend::new(e.to_string()))
        }
    }
}

/// Log to a file; a full-screen TUI has no room for stderr output.
fn setup_logging(log_dir: &Path) -> Result<()> {
    std::fs::create_dir_all(log_dir)
        .with_context(|| format!("failed to create log directory {}", log_dir.display()))?;

    let file_appender = tracing_appender::rolling::never(log_dir, "mathvibe.log");
    let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing::Level::INFO.into());

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .try_init()
        .context("failed to install tracing subscriber")?;

    // Keep the writer alive for the whole process
    std::mem::forget(guard);

    tracing::info!(log_dir = %log_dir.display(), "logging initialized");
    Ok(())
}
