//! xpack - terminal front-end for resident registration.
//!
//! Runs the registration wizard in the terminal, and manages the offline
//! asset cache from the command line:
//!
//! ```text
//! xpack                      start the registration wizard
//! xpack --install-cache      pre-cache the static asset manifest
//! xpack --activate-cache     remove stale cache generations
//! xpack --fetch <url> [--html]
//!                            fetch through the cache worker
//! xpack --cache-status       list cache stores and entries
//! ```

mod app;
mod config;
mod ui;

use std::io::{self, Write};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use xpack_core::offline::{
    AssetCacheWorker, CacheStorage, DiskCacheStorage, FetchOutcome, HttpNetwork, Method, Network,
    Request,
};

use app::{App, AppState};
use config::Config;
use ui::input::handle_input;
use ui::render::render;

// ============================================================================
// Constants
// ============================================================================

/// Timeout for polling terminal events (in milliseconds)
const EVENT_POLL_TIMEOUT_MS: u64 = 100;

/// Log file written while the terminal UI owns the screen
const LOG_FILE: &str = "xpack.log";

type Worker = AssetCacheWorker<HttpNetwork, DiskCacheStorage>;

/// Initialize logging to stderr (command-line mode)
fn init_tracing() {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

/// Initialize logging to a file so log lines do not corrupt the screen.
/// The returned guard flushes the writer when dropped.
fn init_file_tracing(config: &Config) -> Result<WorkerGuard> {
    let log_dir = config.cache_dir()?;
    std::fs::create_dir_all(&log_dir)
        .with_context(|| format!("Failed to create {}", log_dir.display()))?;

    let appender = tracing_appender::rolling::never(log_dir, LOG_FILE);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .with(filter)
        .init();
    Ok(guard)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    // Install the wizard's shake animation before anything renders
    xpack_core::wizard::init();

    let config = Config::load()?;

    // Check for CLI commands
    let args: Vec<String> = std::env::args().collect();
    if let Some(command) = args.get(1) {
        init_tracing();
        return match command.as_str() {
            "--install-cache" => install_cache(&config).await,
            "--activate-cache" => activate_cache(&config).await,
            "--cache-status" => cache_status(&config).await,
            "--fetch" => {
                let url = args
                    .get(2)
                    .ok_or_else(|| anyhow::anyhow!("Usage: xpack --fetch <url> [--html]"))?;
                let html = args.iter().skip(3).any(|a| a == "--html");
                fetch(&config, url, html).await
            }
            other => Err(anyhow::anyhow!("Unknown argument: {}", other)),
        };
    }

    let _guard = init_file_tracing(&config)?;
    info!("xpack starting");

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new();

    // Main loop
    let result = run_app(&mut terminal, &mut app);

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

    // Dump this session's registrations for the caller to pipe elsewhere
    if !app.registrations.is_empty() {
        let payloads: Vec<_> = app.registrations.iter().map(|r| &r.payload).collect();
        println!("{}", serde_json::to_string_pretty(&payloads)?);
    }

    info!(registrations = app.registrations.len(), "xpack shutting down");
    Ok(())
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    loop {
        // Draw UI
        terminal.draw(|f| render(f, app))?;

        // Poll for events with timeout so deferred focus and animations advance
        if event::poll(Duration::from_millis(EVENT_POLL_TIMEOUT_MS))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    // Ctrl+C to quit
                    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                        return Ok(());
                    }

                    // Handle input
                    if handle_input(app, key)? {
                        return Ok(());
                    }
                }
                _ => {}
            }
        }

        app.tick(Instant::now());

        // Check if we should quit
        if matches!(app.state, AppState::Quitting) {
            return Ok(());
        }
    }
}

// ============================================================================
// Cache commands
// ============================================================================

fn build_worker(config: &Config) -> Result<Worker> {
    let storage = DiskCacheStorage::new(config.offline_dir()?)?;
    let network = HttpNetwork::new()?;
    Ok(AssetCacheWorker::new(config.worker_config(), network, storage))
}

/// Pre-cache the asset manifest into the current cache generation
async fn install_cache(config: &Config) -> Result<()> {
    let worker = build_worker(config)?;
    eprintln!(
        "Installing {} assets into '{}' (origin {})...",
        worker.config().assets.len(),
        worker.cache_name(),
        worker.config().origin
    );

    let count = worker
        .install()
        .await
        .context("Install failed; nothing was cached")?;
    eprintln!("Cached {} assets.", count);
    Ok(())
}

/// Delete every cache generation except the current one
async fn activate_cache(config: &Config) -> Result<()> {
    let worker = build_worker(config)?;
    let deleted = worker.activate().await?;

    if deleted.is_empty() {
        eprintln!("No stale caches. '{}' is current.", worker.cache_name());
    } else {
        for name in &deleted {
            eprintln!("Removed '{}'", name);
        }
        eprintln!("'{}' is now the only cache.", worker.cache_name());
    }
    Ok(())
}

/// Fetch a URL the way an intercepted page request would be served
async fn fetch(config: &Config, url: &str, html: bool) -> Result<()> {
    let worker = build_worker(config)?;
    let accept = if html { "text/html,application/xhtml+xml" } else { "*/*" };
    let request = Request::parse(Method::Get, url)?.with_accept(accept);
    eprintln!("Route: {:?}", worker.route(&request));

    let response = match worker.handle_fetch(&request).await? {
        FetchOutcome::Respond(response) => response,
        FetchOutcome::Passthrough => worker.network().fetch(&request).await?,
    };

    eprintln!(
        "{} {} ({} bytes{})",
        response.status,
        response.url,
        response.body.len(),
        response
            .content_type
            .as_deref()
            .map(|ct| format!(", {}", ct))
            .unwrap_or_default()
    );
    io::stdout().write_all(&response.body)?;
    Ok(())
}

/// List cache stores and the entries of the current one
async fn cache_status(config: &Config) -> Result<()> {
    let worker = build_worker(config)?;
    let storage = worker.storage();

    let names = storage.keys().await?;
    if names.is_empty() {
        eprintln!("No caches in {}", storage.root().display());
        return Ok(());
    }

    for name in names {
        let marker = if name == worker.cache_name() { " (current)" } else { "" };
        let entries = storage.entries(&name).await?;
        println!("{}{}: {} entries", name, marker, entries.len());
        for entry in entries {
            println!(
                "  {:<10} {:>4} {:>8}  {}",
                entry.cached.age_display(),
                entry.cached.data.status,
                entry.cached.data.body.len(),
                entry.key
            );
        }
    }
    Ok(())
}
