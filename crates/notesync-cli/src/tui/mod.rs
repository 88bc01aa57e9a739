//! notesync TUI
//!
//! Terminal user interface: a create-note form above the note list.
//!
//! ## Layout
//!
//! - Top: Name and Description inputs with the Create action
//! - Middle: Note list with a completion toggle per item
//! - Bottom: Status bar
//!
//! ## Keys
//!
//! - Tab / Shift-Tab: Cycle between Name, Description and the list
//! - Enter (form): Create note
//! - j/k or ↑/↓ (list): Move selection
//! - Space or Enter (list): Toggle completed
//! - d (list): Delete note
//! - r (list): Reload notes
//! - q (list) or Ctrl-C: Quit

mod app;
mod ui;

use std::fs::File;
use std::io::stdout;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::prelude::*;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use notesync_core::{
    ClientId, Config, FormField, GraphqlClient, NoteSubscription, Store, SyncController,
};

use app::{pop_char, push_char, App, Focus, LiveIndicator};

type Controller = SyncController<GraphqlClient>;

/// Run the TUI application
pub async fn run(config_path: Option<&PathBuf>) -> Result<()> {
    let config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;

    // File-based, only if NOTESYNC_LOG is set
    init_tui_logging(&config);

    let api = GraphqlClient::from_config(&config)
        .context("Backend not configured. Set one with: notesync config set api_url <url>")?;
    let controller = SyncController::new(Arc::new(api), Store::new(), ClientId::generate());
    info!("Starting TUI as client {}", controller.client_id());

    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let mut app = App::new(controller.snapshot());

    spawn_fetch(&controller);
    let subscription = match controller.subscribe().await {
        Ok(subscription) => Some(subscription),
        Err(e) => {
            warn!("Real-time updates unavailable: {}", e);
            app.set_status(format!("Real-time updates unavailable: {}", e));
            None
        }
    };

    let result = run_app(&mut terminal, &mut app, &controller, subscription).await;

    // Restore terminal
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
}

async fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    controller: &Controller,
    mut subscription: Option<NoteSubscription>,
) -> Result<()> {
    let mut state_rx = controller.watch();

    loop {
        app.check_status_timeout();
        app.live = subscription
            .as_ref()
            .map(|s| LiveIndicator::from(s.status()))
            .unwrap_or(LiveIndicator::Off);

        terminal.draw(|frame| ui::draw(frame, app))?;

        tokio::select! {
            biased;

            // New snapshot from the store
            changed = state_rx.changed() => {
                if changed.is_ok() {
                    app.set_state(state_rx.borrow_and_update().clone());
                }
            }

            // Note created by some client
            event = async {
                match subscription.as_mut() {
                    Some(s) => s.recv().await,
                    None => std::future::pending().await,
                }
            } => {
                match event {
                    Some(note) => {
                        let name = note.name.clone();
                        if controller.handle_note_created(note) {
                            app.set_status(format!("New note: {}", name));
                        }
                    }
                    None => {
                        subscription = None;
                        app.set_status("Real-time updates stopped");
                    }
                }
            }

            // Poll for terminal events
            _ = tokio::time::sleep(Duration::from_millis(50)) => {
                if event::poll(Duration::from_millis(0))? {
                    if let Event::Key(key) = event::read()? {
                        // Only handle key press events (not release)
                        if key.kind != KeyEventKind::Press {
                            continue;
                        }

                        // A notice blocks everything until dismissed
                        if app.has_notice() {
                            app.clear_notice();
                            continue;
                        }

                        if app.show_help {
                            app.show_help = false;
                            continue;
                        }

                        handle_key(app, controller, key);
                    }
                }
            }
        }

        if app.should_quit {
            if let Some(subscription) = subscription.take() {
                subscription.unsubscribe().await;
            }
            break;
        }
    }

    Ok(())
}

/// Dispatch a key press
fn handle_key(app: &mut App, controller: &Controller, key: KeyEvent) {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    match (key.code, app.focus.field()) {
        (KeyCode::Tab, _) => app.next_focus(),
        (KeyCode::BackTab, _) => app.prev_focus(),
        (code, Some(field)) => handle_form_key(app, controller, field, code),
        (code, None) => handle_list_key(app, controller, code),
    }
}

fn handle_form_key(
    app: &mut App,
    controller: &Controller,
    field: FormField,
    code: KeyCode,
) {
    let current = controller.snapshot();
    let value = current.form.get(field);

    match code {
        KeyCode::Char(c) => controller.set_input(field, push_char(value, c)),
        KeyCode::Backspace => controller.set_input(field, pop_char(value)),
        KeyCode::Enter => match controller.create_note(&current.form) {
            Ok(remote) => {
                tokio::spawn(remote);
                app.focus = Focus::Name;
                app.selected = 0;
                app.set_status("Note created");
            }
            Err(e) => app.set_notice(e.to_string()),
        },
        KeyCode::Esc => app.focus = Focus::List,
        _ => {}
    }
}

fn handle_list_key(app: &mut App, controller: &Controller, code: KeyCode) {
    match code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char('k') | KeyCode::Up => app.move_up(),
        KeyCode::Char('j') | KeyCode::Down => app.move_down(),
        KeyCode::Char('?') => app.toggle_help(),
        KeyCode::Char('n') | KeyCode::Char('i') | KeyCode::Esc => app.focus = Focus::Name,
        KeyCode::Char('r') => {
            spawn_fetch(controller);
            app.set_status("Reloading notes...");
        }
        KeyCode::Char(' ') | KeyCode::Enter => {
            if let Some(note) = app.selected_note() {
                tokio::spawn(controller.update_note(note));
            }
        }
        KeyCode::Char('d') | KeyCode::Delete => {
            if let Some(note) = app.selected_note() {
                let name = note.name.clone();
                tokio::spawn(controller.delete_note(&note.id));
                app.set_status(format!("Deleted: {}", name));
            }
        }
        _ => {}
    }
}

/// Load the note list in the background
fn spawn_fetch(controller: &Controller) {
    let controller = controller.clone();
    tokio::spawn(async move { controller.fetch_notes().await });
}

/// Initialize file-based logging for TUI mode
///
/// Only enabled when NOTESYNC_LOG is set. Logs go to `log_file` from config,
/// or `{data_dir}/debug.log` if not specified.
fn init_tui_logging(config: &Config) {
    let Ok(log_level) = std::env::var("NOTESYNC_LOG") else {
        return;
    };

    let log_path = config.log_path();

    let log_file = match File::create(&log_path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Warning: Could not create log file {:?}: {}", log_path, e);
            return;
        }
    };

    let env_filter = EnvFilter::new(format!(
        "notesync_core={},notesync_cli={}",
        log_level, log_level
    ));

    // Ignore error if already initialized
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(log_file)
        .try_init();

    info!("TUI logging initialized to {:?}", log_path);
}
