//! Application state and its transition function
//!
//! [`AppState`] is an immutable snapshot: [`transition`] never modifies its
//! input and always produces a new value, so a view can tell that something
//! changed by comparing snapshot pointers.

use serde::{Deserialize, Serialize};

use crate::models::{FormField, Note, NoteForm};

/// A point-in-time snapshot of the client state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppState {
    /// Notes in display order (local creations are prepended)
    pub notes: Vec<Note>,
    /// True until the first successful list fetch
    pub loading: bool,
    /// Set by a failed list fetch and never cleared
    pub error: bool,
    /// The pending create-note form
    pub form: NoteForm,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            notes: Vec::new(),
            loading: true,
            error: false,
            form: NoteForm::default(),
        }
    }
}

impl AppState {
    /// Position of the note with the given id
    pub fn position(&self, id: &str) -> Option<usize> {
        self.notes.iter().position(|n| n.id == id)
    }

    /// Whether a note with the given id is present
    pub fn contains(&self, id: &str) -> bool {
        self.position(id).is_some()
    }
}

/// A state change request
///
/// Serialized as `{"type": "SET_NOTES", ...}`. Any unrecognized `type`
/// decodes to [`Action::Unknown`], which leaves the state unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    /// Replace the note list and clear the loading flag
    SetNotes { notes: Vec<Note> },
    /// Prepend a note (no dedup)
    AddNote { note: Note },
    /// Clear both form fields
    ResetForm,
    /// Set one form field
    SetInput { field: FormField, value: String },
    /// Record a failed fetch
    Error,
    #[serde(other)]
    Unknown,
}

impl Action {
    /// Short name used in logs
    pub fn name(&self) -> &'static str {
        match self {
            Action::SetNotes { .. } => "SET_NOTES",
            Action::AddNote { .. } => "ADD_NOTE",
            Action::ResetForm => "RESET_FORM",
            Action::SetInput { .. } => "SET_INPUT",
            Action::Error => "ERROR",
            Action::Unknown => "UNKNOWN",
        }
    }
}

/// Compute the next state from the current state and an action
pub fn transition(state: &AppState, action: &Action) -> AppState {
    match action {
        Action::SetNotes { notes } => AppState {
            notes: notes.clone(),
            loading: false,
            ..state.clone()
        },
        Action::AddNote { note } => {
            let mut notes = Vec::with_capacity(state.notes.len() + 1);
            notes.push(note.clone());
            notes.extend(state.notes.iter().cloned());
            AppState {
                notes,
                ..state.clone()
            }
        }
        Action::ResetForm => AppState {
            form: NoteForm::default(),
            ..state.clone()
        },
        Action::SetInput { field, value } => AppState {
            form: state.form.with_field(*field, value.clone()),
            ..state.clone()
        },
        Action::Error => AppState {
            error: true,
            loading: false,
            ..state.clone()
        },
        Action::Unknown => state.clone(),
    }
}
