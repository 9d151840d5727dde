//! PlantATree terminal client.
//!
//! A keyboard-driven front end for the PlantATree eco-actions community:
//! sign in, register and browse the site's sections from a terminal.

mod app;
mod ui;

use std::io::{self, Write};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, layout::Rect, Terminal};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use ecoactions_core::Config;

use app::{App, AppState};
use ui::input::{handle_input, handle_mouse};
use ui::render::render;

// ============================================================================
// Constants
// ============================================================================

/// Timeout for polling terminal events (in milliseconds)
const EVENT_POLL_TIMEOUT_MS: u64 = 100;

/// Log file written in the data directory
const LOG_FILE: &str = "ecoactions.log";

const USAGE: &str = "\
Usage: ecoactions [OPTIONS]

Options:
  --login [EMAIL]   Sign in without starting the interface
  --logout          Sign out and forget the saved session
  -h, --help        Print this help";

/// Initialize the tracing subscriber for logging.
///
/// The terminal is owned by the interface, so logs go to a file in the data
/// directory. The returned guard flushes the writer when dropped.
fn init_tracing() -> Option<WorkerGuard> {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let log_dir = Config::data_dir().ok()?;
    std::fs::create_dir_all(&log_dir).ok()?;

    let appender = tracing_appender::rolling::never(log_dir, LOG_FILE);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .with(filter)
        .init();

    Some(guard)
}

fn load_config() -> Config {
    let mut config = Config::load().unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        Config::default()
    });
    config.apply_env();
    config
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let _guard = init_tracing();
    let config = load_config();

    // Check for CLI commands
    let args: Vec<String> = std::env::args().collect();
    match args.get(1).map(String::as_str) {
        Some("--login") => return headless_login(config, args.get(2).cloned()).await,
        Some("--logout") => return headless_logout(config).await,
        Some("-h") | Some("--help") => {
            println!("{}", USAGE);
            return Ok(());
        }
        Some(other) => {
            eprintln!("Unknown option: {}\n\n{}", other, USAGE);
            std::process::exit(2);
        }
        None => {}
    }

    info!(api = %config.api_base_url, "PlantATree client starting");

    // Create app before touching the terminal so setup errors print normally
    let mut app = App::new(config)?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Main loop
    let result = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        eprintln!("Error: {}", e);
    }

    info!("PlantATree client shutting down");
    Ok(())
}

/// Sign in from the command line and persist the session
async fn headless_login(config: Config, email: Option<String>) -> Result<()> {
    let email = match email.or_else(|| config.last_email.clone()) {
        Some(email) => email,
        None => {
            print!("Email: ");
            io::stdout().flush()?;
            let mut line = String::new();
            io::stdin().read_line(&mut line).context("Failed to read email")?;
            line.trim().to_string()
        }
    };
    let password = rpassword::prompt_password("Password: ").context("Failed to read password")?;

    let mut app = App::new(config)?;
    app.login_form.email = email;
    app.login_form.password = password;

    if app.submit_login().await {
        let name = app
            .current_user()
            .map(|u| u.username.clone())
            .unwrap_or_default();
        println!("Signed in as {}", name);
        Ok(())
    } else {
        bail!(app
            .notification_message()
            .unwrap_or_else(|| "Login failed".to_string()))
    }
}

async fn headless_logout(config: Config) -> Result<()> {
    let mut app = App::new(config)?;
    if app.forget_session().await {
        println!("Signed out");
    } else {
        println!("Not signed in; stored credentials cleared");
    }
    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    loop {
        // Draw UI
        terminal.draw(|f| render(f, app))?;

        // Poll with a timeout so expiring notifications and pending modal
        // switches are redrawn without input
        if event::poll(Duration::from_millis(EVENT_POLL_TIMEOUT_MS))? {
            match event::read()? {
                Event::Key(key) => {
                    if handle_input(app, key).await? {
                        return Ok(());
                    }
                }
                Event::Mouse(mouse) => {
                    let size = terminal.size()?;
                    handle_mouse(app, mouse, Rect::new(0, 0, size.width, size.height));
                }
                _ => {}
            }
        }

        // Check if we should quit
        if matches!(app.state, AppState::Quitting) {
            return Ok(());
        }
    }
}
