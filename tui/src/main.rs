//! Tessera Demo Entry Point
//!
//! Runs the demo scene in the terminal.
//!
//! # Usage
//!
//! ```bash
//! # Start with defaults
//! tessera-demo
//!
//! # With config file and a log
//! tessera-demo --config tessera.toml --log-file demo.log
//!
//! # Override timing
//! tessera-demo --fps 60 --input-delay-ms 120
//!
//! # Verbose logging (only written when --log-file is given)
//! RUST_LOG=debug tessera-demo --log-file demo.log
//! ```
//!
//! Arrow keys or W/S move the menu highlight, Space/Enter activates, Tab
//! moves the arrows to the text area, Esc or Ctrl-C quits.

use std::fs::File;
use std::io::{self, IsTerminal};
use std::panic;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use tessera_core::{load_config_from_path, ConfigOverrides};
use tessera_tui::App;

/// Tessera demo - layered tile compositing in the terminal
#[derive(Parser, Debug)]
#[command(name = "tessera-demo")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short = 'c', long, env = "TESSERA_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Target ticks per second
    #[arg(long, value_name = "FPS")]
    fps: Option<u32>,

    /// Minimum time between menu key presses
    #[arg(long, value_name = "MS")]
    input_delay_ms: Option<u64>,

    /// Write logs to this file (the terminal is busy with the scene)
    #[arg(short = 'l', long, value_name = "FILE")]
    log_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.log_file.as_ref())?;

    let mut config = load_config_from_path(args.config.clone())
        .context("Failed to load configuration")?;
    ConfigOverrides {
        fps: args.fps,
        input_delay_ms: args.input_delay_ms,
    }
    .apply(&mut config);
    config.validate().context("Invalid configuration")?;
    tracing::info!(source = %config.source(), fps = config.terminal.fps, "Configuration loaded");

    if !io::stdin().is_terminal() || !io::stdout().is_terminal() {
        eprintln!("Error: tessera-demo requires a terminal (TTY)");
        std::process::exit(1);
    }

    // Set up panic hook to restore terminal
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        original_hook(panic_info);
    }));

    // Initialize terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let (width, height) = crossterm::terminal::size()?;
    let result = match App::new(config, width, height) {
        Ok(mut app) => app.run(&mut terminal).await.map_err(anyhow::Error::from),
        Err(error) => Err(error.into()),
    };

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn init_logging(log_file: Option<&PathBuf>) -> Result<()> {
    let file_layer = match log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create log file {}", path.display()))?;
            Some(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(file_layer)
        .init();
    Ok(())
}
