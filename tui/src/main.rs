//! Arcana TUI Entry Point
//!
//! Usage:
//!   arcana-tui [OPTIONS]
//!
//! Options:
//!   --api-url <URL>         Reading server base URL
//!   --config <FILE>         Configuration file path
//!   --category <ID>         Reading topic (love, job, business, money, study)
//!   --situation <TEXT>      What the querent wants to know
//!
//! Logs go to the file named by `ARCANA_LOG` (filtered by `RUST_LOG`), never
//! to the terminal being drawn on.

use std::fs::OpenOptions;
use std::io::{self, IsTerminal};
use std::panic;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::Context;
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing::info;

use arcana_core::config::{load_config_from_path, ConfigOverrides};
use arcana_core::{Category, HttpBackend, InterpretationBackend};
use arcana_tui::{App, AppSettings};

/// Arcana - a tarot table in the terminal
#[derive(Parser, Debug)]
#[command(name = "arcana-tui")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Reading server base URL
    #[arg(long, value_name = "URL")]
    api_url: Option<String>,

    /// Configuration file path
    #[arg(short = 'c', long, env = "ARCANA_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Reading topic (love, job, business, money, study)
    #[arg(long, value_name = "ID")]
    category: Option<String>,

    /// What the querent wants to know
    #[arg(long, default_value = "")]
    situation: String,

    /// Fixed shuffle seed
    #[arg(long, hide = true)]
    seed: Option<u64>,
}

/// Log to `ARCANA_LOG` if set; otherwise stay silent
fn init_logging() -> anyhow::Result<()> {
    let Some(path) = std::env::var_os("ARCANA_LOG") else {
        return Ok(());
    };
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open log file: {path:?}"))?;

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("arcana_tui=info,arcana_core=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging()?;

    // Check if we have a TTY before attempting initialization
    if !io::stdin().is_terminal() || !io::stdout().is_terminal() {
        eprintln!("Error: arcana-tui requires a terminal (TTY)");
        eprintln!("Use arcana-read for non-interactive readings.");
        std::process::exit(1);
    }

    let mut config = load_config_from_path(args.config.clone())?;
    let mut overrides = ConfigOverrides::new();
    if let Some(url) = &args.api_url {
        overrides = overrides.with_api_url(url.clone());
    }
    overrides.apply(&mut config)?;

    let category = match args.category.as_deref() {
        Some(id) => Some(
            Category::by_id(id).with_context(|| format!("Unknown category `{id}`"))?,
        ),
        None => None,
    };

    let backend = Arc::new(HttpBackend::from_config(&config.api)?);
    let deck = backend.deck_or_standard().await;
    info!(url = %config.api.url, cards = deck.len(), "Table ready");

    // Set up panic hook to restore terminal
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), DisableMouseCapture, LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    // Initialize terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;
    terminal.clear()?;

    let settings = AppSettings {
        category,
        situation: args.situation,
        seed: args.seed,
    };
    let mut app = App::new(backend, &deck, &config, settings);
    let result = app.run(&mut terminal).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableMouseCapture,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;

    result
}
