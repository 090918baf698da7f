//! `SecureChat` terminal client.
//!
//! Polls a `SecureChat` server for messages and lets you post to it from
//! the terminal. Configuration via CLI flags, environment variables, or
//! config file (`~/.config/securechat/config.toml`).
//!
//! ```bash
//! cargo run --bin securechat -- --server-url http://127.0.0.1:5000/ \
//!     --username alice --encryption-key hunter2 --encryption-enabled True
//!
//! # Or via environment variables
//! SECURECHAT_USERNAME=alice SECURECHAT_ENCRYPTION_KEY=hunter2 cargo run
//! ```

use std::io;
use std::path::Path;
use std::sync::Arc;

use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing_appender::non_blocking::WorkerGuard;

use securechat::api::{self, http::HttpChatApi};
use securechat::app::{App, AppCommand};
use securechat::config::{CliArgs, ClientConfig};
use securechat::crypto::fernet::FernetCipher;
use securechat::sync::{MessageSync, poll};
use securechat::ui;

type ChatSync = MessageSync<HttpChatApi, FernetCipher>;

#[tokio::main]
async fn main() -> io::Result<()> {
    let cli = CliArgs::parse();

    // Load and resolve configuration (CLI args > env > config file > defaults).
    let config = match ClientConfig::load(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Warning: failed to load config file: {e}");
            ClientConfig::from_cli(&cli)
        }
    };

    // Initialize logging before terminal setup (logs go to file, not stdout).
    let _log_guard = init_logging(&cli.log_level, cli.log_file.as_deref());

    tracing::info!(?config, "securechat starting");

    let base_url = config.server_url().map_err(io::Error::other)?;
    let api = HttpChatApi::new(base_url, config.request_timeout).map_err(io::Error::other)?;
    let session = config.to_session();
    let cipher = session.cipher(config.kdf_iterations);
    if session.encryption_enabled() && cipher.is_none() {
        tracing::warn!("encryption enabled without a key; messages will be sent in plaintext");
    }
    let sync = Arc::new(MessageSync::new(api, session, cipher));

    // Set up terminal.
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let poller = poll::spawn_polling(Arc::clone(&sync), config.poll_interval);

    // Run the app.
    let result = run_app(&mut terminal, &sync, &config);

    poller.shutdown().await;

    // Restore terminal.
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    tracing::info!("securechat exiting");
    result
}

/// Initialize file-based logging.
///
/// Logs are written to a file (never stdout, since ratatui owns the terminal).
/// Returns a [`WorkerGuard`] that must be held until shutdown to ensure all
/// buffered log entries are flushed.
fn init_logging(level: &str, file_path: Option<&Path>) -> Option<WorkerGuard> {
    let default_path = std::env::temp_dir().join("securechat.log");
    let log_path = file_path.unwrap_or(&default_path);

    let log_dir = log_path.parent()?;
    let file_name = log_path.file_name()?.to_str()?;

    let file_appender = tracing_appender::rolling::never(log_dir, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(env_filter)
        .with_ansi(false)
        .init();

    Some(guard)
}

/// Draw and dispatch key events until the user quits.
///
/// Network work is spawned onto the runtime so a slow server never stalls
/// drawing.
fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    sync: &Arc<ChatSync>,
    config: &ClientConfig,
) -> io::Result<()> {
    let mut app = App::new(sync.view(), sync.session().clone());

    loop {
        terminal.draw(|frame| ui::draw(frame, &app))?;

        if !event::poll(config.poll_timeout)? {
            continue;
        }

        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        match app.handle_key_event(key) {
            Some(AppCommand::SendMessage) => {
                let sync = Arc::clone(sync);
                tokio::spawn(async move {
                    // Outcome is logged by the sync loop.
                    let _ = sync.send_input().await;
                });
            }
            Some(AppCommand::UpdateSwitch(update)) => {
                let sync = Arc::clone(sync);
                tokio::spawn(async move { api::toggle_switch(sync.api(), update).await });
            }
            None => {}
        }

        if app.should_quit {
            return Ok(());
        }
    }
}
