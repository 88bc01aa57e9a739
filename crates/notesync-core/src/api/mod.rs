//! Remote notes API
//!
//! [`NotesApi`] is the seam between the sync controller and the hosted
//! backend. [`GraphqlClient`] talks to a GraphQL endpoint over HTTP for
//! queries and mutations and over WebSocket for the note-created event
//! stream.
//!
//! ## Event stream
//!
//! `subscribe_note_created` returns a [`NoteSubscription`]: a channel fed by
//! a background task, a connection status watch, and an explicit
//! `unsubscribe()` that stops the task and waits for it to close the socket.

mod documents;
mod graphql;
mod message;
mod subscription;

use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::error::ApiResult;
use crate::models::{DeleteNoteInput, Note, UpdateNoteInput};

pub use graphql::GraphqlClient;
pub use message::{GraphqlError, GraphqlRequest, GraphqlResponse};
pub use subscription::{spawn_subscription_task, SubscriptionConfig};

/// Operations offered by the backend
#[async_trait]
pub trait NotesApi: Send + Sync {
    /// Fetch every note
    async fn list_notes(&self) -> ApiResult<Vec<Note>>;

    /// Store a new note
    async fn create_note(&self, note: &Note) -> ApiResult<Note>;

    /// Remove a note
    async fn delete_note(&self, input: &DeleteNoteInput) -> ApiResult<DeleteNoteInput>;

    /// Change a note's completion flag
    async fn update_note(&self, input: &UpdateNoteInput) -> ApiResult<UpdateNoteInput>;

    /// Open the note-created event stream
    async fn subscribe_note_created(&self) -> ApiResult<NoteSubscription>;
}

/// Commands sent to a subscription task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionCommand {
    /// Close the stream and stop the task
    Shutdown,
}

/// Connection status of the event stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    /// Not connected (initial state, between retries, or after shutdown)
    Disconnected,
    /// Attempting to connect
    Connecting,
    /// Connected and receiving events
    Connected,
}

/// How long `unsubscribe` waits for the task to close the connection
const UNSUBSCRIBE_TIMEOUT: Duration = Duration::from_secs(2);

/// Handle to an open note-created event stream
pub struct NoteSubscription {
    events: mpsc::Receiver<Note>,
    command_tx: mpsc::Sender<SubscriptionCommand>,
    status_rx: watch::Receiver<ConnectionStatus>,
    task: Option<JoinHandle<()>>,
}

impl NoteSubscription {
    /// Assemble a handle from its channels
    pub fn new(
        events: mpsc::Receiver<Note>,
        command_tx: mpsc::Sender<SubscriptionCommand>,
        status_rx: watch::Receiver<ConnectionStatus>,
    ) -> Self {
        Self {
            events,
            command_tx,
            status_rx,
            task: None,
        }
    }

    /// Attach the task feeding this handle so `unsubscribe` can wait for it
    pub fn with_task(mut self, task: JoinHandle<()>) -> Self {
        self.task = Some(task);
        self
    }

    /// Wait for the next created note
    ///
    /// Returns `None` once the stream has ended.
    pub async fn recv(&mut self) -> Option<Note> {
        self.events.recv().await
    }

    /// Current connection status
    pub fn status(&self) -> ConnectionStatus {
        *self.status_rx.borrow()
    }

    /// Watch connection status changes
    pub fn subscribe_status(&self) -> watch::Receiver<ConnectionStatus> {
        self.status_rx.clone()
    }

    /// Close the stream
    ///
    /// Returns once the task has sent `complete` and closed the socket, or
    /// after a short timeout if it is stuck connecting.
    pub async fn unsubscribe(self) {
        debug!("Unsubscribing from note-created events");
        let _ = self.command_tx.send(SubscriptionCommand::Shutdown).await;

        let Some(task) = self.task else {
            return;
        };
        match tokio::time::timeout(UNSUBSCRIBE_TIMEOUT, task).await {
            Ok(Ok(())) => debug!("Note subscription task stopped"),
            Ok(Err(e)) => warn!("Note subscription task failed: {}", e),
            Err(_) => warn!("Timed out waiting for note subscription to close"),
        }
    }
}

impl std::fmt::Debug for NoteSubscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NoteSubscription")
            .field("status", &self.status())
            .finish_non_exhaustive()
    }
}
