//! Watch command handler

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::debug;

use notesync_core::NotesApi;

use super::connect;
use crate::output::Output;

/// Print every created note until Ctrl-C or the stream ends
pub async fn watch(config_path: Option<&PathBuf>, output: &Output) -> Result<()> {
    let api = connect(config_path)?;
    let mut subscription = api
        .subscribe_note_created()
        .await
        .context("Failed to subscribe to note events")?;

    output.message(&format!(
        "Watching {} for new notes (Ctrl-C to stop)",
        api.realtime_endpoint()
    ));

    loop {
        tokio::select! {
            event = subscription.recv() => {
                match event {
                    Some(note) => output.print_note_line(&note),
                    None => {
                        output.message("Event stream closed");
                        return Ok(());
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                debug!("Interrupted");
                break;
            }
        }
    }

    subscription.unsubscribe().await;
    Ok(())
}
