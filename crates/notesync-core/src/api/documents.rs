//! GraphQL operation documents
//!
//! Field names follow the hosted schema: the `Note` type has `id`,
//! `clientId`, `name`, `description` and `completed`.

/// Response field of [`LIST_NOTES`]
pub const LIST_NOTES_FIELD: &str = "listNotes";
/// Response field of [`CREATE_NOTE`]
pub const CREATE_NOTE_FIELD: &str = "createNote";
/// Response field of [`DELETE_NOTE`]
pub const DELETE_NOTE_FIELD: &str = "deleteNote";
/// Response field of [`UPDATE_NOTE`]
pub const UPDATE_NOTE_FIELD: &str = "updateNote";
/// Payload field of [`ON_CREATE_NOTE`] events
pub const ON_CREATE_NOTE_FIELD: &str = "onCreateNote";

pub const LIST_NOTES: &str = r#"query ListNotes {
  listNotes {
    items {
      id
      clientId
      name
      description
      completed
    }
  }
}"#;

pub const CREATE_NOTE: &str = r#"mutation CreateNote($input: CreateNoteInput!) {
  createNote(input: $input) {
    id
    clientId
    name
    description
    completed
  }
}"#;

pub const DELETE_NOTE: &str = r#"mutation DeleteNote($input: DeleteNoteInput!) {
  deleteNote(input: $input) {
    id
  }
}"#;

pub const UPDATE_NOTE: &str = r#"mutation UpdateNote($input: UpdateNoteInput!) {
  updateNote(input: $input) {
    id
    completed
  }
}"#;

pub const ON_CREATE_NOTE: &str = r#"subscription OnCreateNote {
  onCreateNote {
    id
    clientId
    name
    description
    completed
  }
}"#;
