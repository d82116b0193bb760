use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind,
};
use crossterm::execute;
use ratatui::DefaultTerminal;
use std::fs::File;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::info;
use tracing_subscriber::EnvFilter;

use tui_globe::app::App;
use tui_globe::config::{Cli, CliCommand, GlobeConfig};
use tui_globe::data::convert_geojson;
use tui_globe::interaction::Command;
use tui_globe::ui;

fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(CliCommand::Convert { input, output }) = &cli.command {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter(&cli.log_level))
            .with_writer(std::io::stderr)
            .init();
        let count = convert_geojson(input, output)
            .with_context(|| format!("converting {}", input.display()))?;
        info!(count, output = %output.display(), "wrote records");
        return Ok(());
    }

    // The terminal belongs to the UI, so logs go to a file
    let log_file = File::create(&cli.log_file)
        .with_context(|| format!("creating log file {}", cli.log_file.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(&cli.log_level))
        .with_writer(Mutex::new(log_file))
        .with_ansi(false)
        .init();

    let config = GlobeConfig::from(&cli);
    info!(data = %config.data.display(), "starting");

    // Initialize terminal
    let mut terminal = ratatui::init();
    terminal.clear()?;

    // Enable mouse capture
    execute!(std::io::stdout(), EnableMouseCapture)?;

    let result = run(&mut terminal, &config);

    // Disable mouse capture and restore terminal
    let _ = execute!(std::io::stdout(), DisableMouseCapture);
    ratatui::restore();

    result
}

fn handle_key(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Char('q') | KeyCode::Esc => app.quit(),

        // Rotate with hl, tilt with jk (or arrows)
        KeyCode::Left | KeyCode::Char('h') => app.push(Command::Rotate { steps: -1 }),
        KeyCode::Right | KeyCode::Char('l') => app.push(Command::Rotate { steps: 1 }),
        KeyCode::Up | KeyCode::Char('k') => app.push(Command::Tilt { steps: 1 }),
        KeyCode::Down | KeyCode::Char('j') => app.push(Command::Tilt { steps: -1 }),

        KeyCode::Char('r') | KeyCode::Char('0') => app.push(Command::ResetView),

        // Layer toggles
        KeyCode::Char('f') | KeyCode::Char('F') => app.display.toggle_fills(),
        KeyCode::Char('b') | KeyCode::Char('B') => app.display.toggle_borders(),
        KeyCode::Char('m') | KeyCode::Char('M') => app.display.toggle_markers(),
        KeyCode::Char('g') | KeyCode::Char('G') => app.display.toggle_graticule(),
        KeyCode::Char('p') | KeyCode::Char('P') => app.display.toggle_poles(),
        KeyCode::Char('L') => app.display.toggle_legend(),

        _ => {}
    }
}

fn run(terminal: &mut DefaultTerminal, config: &GlobeConfig) -> Result<()> {
    let size = terminal.size()?;
    let mut app = App::new(size.width, size.height, config);

    // Main loop
    loop {
        // Draw
        terminal.draw(|frame| ui::render(frame, &app))?;

        // Drain pending events with ~60fps target
        if event::poll(Duration::from_millis(16))? {
            loop {
                match event::read()? {
                    // Only handle key press events (not release)
                    Event::Key(key) if key.kind == KeyEventKind::Press => {
                        handle_key(&mut app, key.code);
                    }
                    Event::Mouse(mouse) => app.handle_mouse(mouse, Instant::now()),
                    Event::Resize(width, height) => app.resize(width, height),
                    _ => {}
                }
                if !event::poll(Duration::ZERO)? {
                    break;
                }
            }
        }

        // Apply queued input and advance the fly-to
        app.update(Instant::now());

        if app.should_quit {
            break;
        }
    }

    info!("exiting");
    Ok(())
}
