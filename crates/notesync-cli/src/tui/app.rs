//! Application state for the TUI
//!
//! Holds view-only state (focus, selection, overlays). The note list and the
//! form contents live in the core store; `state` is the latest snapshot.

use std::sync::Arc;
use std::time::{Duration, Instant};

use notesync_core::{AppState, ConnectionStatus, FormField, Note};

/// Which widget receives key presses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Name,
    Description,
    List,
}

impl Focus {
    pub fn next(self) -> Self {
        match self {
            Focus::Name => Focus::Description,
            Focus::Description => Focus::List,
            Focus::List => Focus::Name,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Focus::Name => Focus::List,
            Focus::Description => Focus::Name,
            Focus::List => Focus::Description,
        }
    }

    /// The form field behind this focus, if any
    pub fn field(self) -> Option<FormField> {
        match self {
            Focus::Name => Some(FormField::Name),
            Focus::Description => Some(FormField::Description),
            Focus::List => None,
        }
    }
}

/// Real-time connection indicator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiveIndicator {
    /// Receiving events
    Live,
    /// Connection attempt in progress
    Connecting,
    /// Disconnected, waiting to retry
    Offline,
    /// Stream not available
    Off,
}

impl From<ConnectionStatus> for LiveIndicator {
    fn from(status: ConnectionStatus) -> Self {
        match status {
            ConnectionStatus::Connected => LiveIndicator::Live,
            ConnectionStatus::Connecting => LiveIndicator::Connecting,
            ConnectionStatus::Disconnected => LiveIndicator::Offline,
        }
    }
}

/// Main application state
pub struct App {
    /// Should the app quit?
    pub should_quit: bool,
    /// Focused widget
    pub focus: Focus,
    /// Latest store snapshot
    pub state: Arc<AppState>,
    /// Selected note index
    pub selected: usize,
    /// Blocking notice, dismissed by any key
    pub notice: Option<String>,
    /// Show help overlay
    pub show_help: bool,
    /// Status message to display
    pub status_message: Option<String>,
    /// When the status message was set
    pub status_message_time: Option<Instant>,
    /// Real-time connection indicator
    pub live: LiveIndicator,
}

impl App {
    pub fn new(state: Arc<AppState>) -> Self {
        Self {
            should_quit: false,
            focus: Focus::Name,
            state,
            selected: 0,
            notice: None,
            show_help: false,
            status_message: None,
            status_message_time: None,
            live: LiveIndicator::Off,
        }
    }

    /// Replace the snapshot, keeping the selection in range
    pub fn set_state(&mut self, state: Arc<AppState>) {
        self.state = state;
        if self.selected >= self.state.notes.len() {
            self.selected = self.state.notes.len().saturating_sub(1);
        }
    }

    /// Currently selected note
    pub fn selected_note(&self) -> Option<&Note> {
        self.state.notes.get(self.selected)
    }

    pub fn move_up(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn move_down(&mut self) {
        if self.selected + 1 < self.state.notes.len() {
            self.selected += 1;
        }
    }

    pub fn next_focus(&mut self) {
        self.focus = self.focus.next();
    }

    pub fn prev_focus(&mut self) {
        self.focus = self.focus.prev();
    }

    /// Show a blocking notice
    pub fn set_notice(&mut self, message: impl Into<String>) {
        self.notice = Some(message.into());
    }

    pub fn has_notice(&self) -> bool {
        self.notice.is_some()
    }

    pub fn clear_notice(&mut self) {
        self.notice = None;
    }

    /// Set a status message (auto-clears after 3 seconds)
    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
        self.status_message_time = Some(Instant::now());
    }

    /// Check and clear expired status message
    pub fn check_status_timeout(&mut self) {
        if let Some(time) = self.status_message_time {
            if time.elapsed() > Duration::from_secs(3) {
                self.status_message = None;
                self.status_message_time = None;
            }
        }
    }

    /// Toggle help overlay
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }
}

/// Value of a form field after typing a character
pub fn push_char(current: &str, c: char) -> String {
    let mut value = String::with_capacity(current.len() + c.len_utf8());
    value.push_str(current);
    value.push(c);
    value
}

/// Value of a form field after a backspace
pub fn pop_char(current: &str) -> String {
    let mut value = current.to_string();
    value.pop();
    value
}
