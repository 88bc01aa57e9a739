//! Data models for notesync
//!
//! Defines the note record exchanged with the backend, the pending form the
//! user types into, and the small input payloads used by mutations.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::identity::{new_note_id, ClientId};

/// A note as stored by the backend
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    /// Unique identifier
    pub id: String,
    /// Note name (title)
    pub name: String,
    /// Note description (body)
    pub description: String,
    /// Whether the note has been marked completed
    #[serde(default)]
    pub completed: bool,
    /// Identifier of the client that created the note
    #[serde(alias = "clientID", default)]
    pub client_id: String,
}

impl Note {
    /// Create a new, not-completed note owned by `client_id`
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        client_id: &ClientId,
    ) -> Self {
        Self {
            id: new_note_id(),
            name: name.into(),
            description: description.into(),
            completed: false,
            client_id: client_id.to_string(),
        }
    }

    /// Build a note from the pending form
    pub fn from_form(form: &NoteForm, client_id: &ClientId) -> Self {
        Self::new(form.name.clone(), form.description.clone(), client_id)
    }

    /// Whether this note was created by the given client
    pub fn is_from(&self, client_id: &ClientId) -> bool {
        self.client_id == client_id.as_str()
    }
}

/// A field of the pending form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormField {
    Name,
    Description,
}

impl std::fmt::Display for FormField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FormField::Name => write!(f, "name"),
            FormField::Description => write!(f, "description"),
        }
    }
}

/// The pending create-note form
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct NoteForm {
    pub name: String,
    pub description: String,
}

impl NoteForm {
    /// Create a form with both fields filled in
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }

    /// Get a field's current value
    pub fn get(&self, field: FormField) -> &str {
        match field {
            FormField::Name => &self.name,
            FormField::Description => &self.description,
        }
    }

    /// Check that both fields are filled in
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.is_empty() {
            return Err(ValidationError::EmptyName);
        }
        if self.description.is_empty() {
            return Err(ValidationError::EmptyDescription);
        }
        Ok(())
    }

    /// Return a copy with one field replaced
    pub fn with_field(&self, field: FormField, value: impl Into<String>) -> Self {
        let mut form = self.clone();
        match field {
            FormField::Name => form.name = value.into(),
            FormField::Description => form.description = value.into(),
        }
        form
    }
}

/// Input for the delete mutation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeleteNoteInput {
    pub id: String,
}

/// Input for the update mutation (only the completion flag is ever changed)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UpdateNoteInput {
    pub id: String,
    pub completed: bool,
}
