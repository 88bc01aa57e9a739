//! Note command handlers
//!
//! Each command is a single call to the backend. There is no local state to
//! update, so these go straight to the API rather than through a controller.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use notesync_core::{ClientId, DeleteNoteInput, Note, NoteForm, NotesApi, UpdateNoteInput};

use super::connect;
use crate::output::{short_id, Output};

/// List all notes
pub async fn list(config_path: Option<&PathBuf>, output: &Output) -> Result<()> {
    let api = connect(config_path)?;
    let notes = api.list_notes().await.context("Failed to list notes")?;

    output.print_notes(&notes);
    Ok(())
}

/// Create a note
pub async fn create(
    config_path: Option<&PathBuf>,
    name: String,
    description: String,
    output: &Output,
) -> Result<()> {
    let form = NoteForm::new(name, description);
    form.validate()?;

    let api = connect(config_path)?;
    let note = Note::from_form(&form, &ClientId::generate());
    let created = api
        .create_note(&note)
        .await
        .context("Failed to create note")?;

    output.success(&format!("Created note: {}", created.id));
    output.print_note(&created);

    Ok(())
}

/// Delete a note
pub async fn delete(config_path: Option<&PathBuf>, id: String, output: &Output) -> Result<()> {
    let api = connect(config_path)?;
    let notes = api.list_notes().await.context("Failed to list notes")?;
    let note = resolve_note(&notes, &id)?;

    api.delete_note(&DeleteNoteInput {
        id: note.id.clone(),
    })
    .await
    .context("Failed to delete note")?;

    output.success(&format!("Deleted note: {} - {}", short_id(&note.id), note.name));

    Ok(())
}

/// Flip a note's completed flag
pub async fn toggle(config_path: Option<&PathBuf>, id: String, output: &Output) -> Result<()> {
    let api = connect(config_path)?;
    let notes = api.list_notes().await.context("Failed to list notes")?;
    let note = resolve_note(&notes, &id)?;

    let input = UpdateNoteInput {
        id: note.id.clone(),
        completed: !note.completed,
    };
    api.update_note(&input)
        .await
        .context("Failed to update note")?;

    let state = if input.completed {
        "completed"
    } else {
        "not completed"
    };
    output.success(&format!("Marked {} {}", short_id(&note.id), state));

    Ok(())
}

/// Find a note by full ID or unique prefix
fn resolve_note<'a>(notes: &'a [Note], id: &str) -> Result<&'a Note> {
    if let Some(note) = notes.iter().find(|n| n.id == id) {
        return Ok(note);
    }

    let matches: Vec<_> = notes.iter().filter(|n| n.id.starts_with(id)).collect();

    match matches.len() {
        0 => bail!("No note found matching: {}", id),
        1 => Ok(matches[0]),
        _ => {
            eprintln!("Multiple notes match '{}':", id);
            for note in &matches {
                eprintln!("  {} - {}", note.id, note.name);
            }
            bail!("Ambiguous ID. Please provide more characters.");
        }
    }
}
