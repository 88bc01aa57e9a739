//! Synchronization controller
//!
//! Turns user intents into state changes and remote calls. Every mutation is
//! applied to the store optimistically, before the backend has answered.
//! Remote failures are logged and otherwise ignored: nothing is rolled back
//! and nothing is retried, so the local list can drift from the backend until
//! the next [`SyncController::fetch_notes`].
//!
//! ## Snapshot capture
//!
//! `delete_note` and `update_note` read the note list when they are called
//! and dispatch when their future first runs. Two such calls made back to
//! back, before either future has run, both compute from the same list and
//! the later `SetNotes` replaces the earlier one.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::api::{NoteSubscription, NotesApi};
use crate::error::{ApiResult, ValidationError};
use crate::identity::ClientId;
use crate::models::{DeleteNoteInput, FormField, Note, NoteForm, UpdateNoteInput};
use crate::state::{Action, AppState};
use crate::store::Store;

/// Mediates between user intents, the store and the remote API
pub struct SyncController<A: ?Sized> {
    api: Arc<A>,
    store: Store,
    client_id: ClientId,
}

impl<A: ?Sized> Clone for SyncController<A> {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
            store: self.store.clone(),
            client_id: self.client_id.clone(),
        }
    }
}

impl<A: NotesApi + ?Sized + 'static> SyncController<A> {
    /// Create a controller for this client
    pub fn new(api: Arc<A>, store: Store, client_id: ClientId) -> Self {
        Self {
            api,
            store,
            client_id,
        }
    }

    /// The id tagging notes created by this client
    pub fn client_id(&self) -> &ClientId {
        &self.client_id
    }

    /// Current snapshot
    pub fn snapshot(&self) -> Arc<AppState> {
        self.store.snapshot()
    }

    /// Subscribe to snapshot changes
    pub fn watch(&self) -> watch::Receiver<Arc<AppState>> {
        self.store.watch()
    }

    /// Update one field of the pending form
    pub fn set_input(&self, field: FormField, value: impl Into<String>) {
        self.store.dispatch(Action::SetInput {
            field,
            value: value.into(),
        });
    }

    /// Load the note list from the backend
    pub async fn fetch_notes(&self) {
        match self.api.list_notes().await {
            Ok(notes) => {
                info!("Fetched {} notes", notes.len());
                self.store.dispatch(Action::SetNotes { notes });
            }
            Err(e) => {
                warn!("Failed to fetch notes: {}", e);
                self.store.dispatch(Action::Error);
            }
        }
    }

    /// Create a note from the form
    ///
    /// Validation happens immediately; an incomplete form changes nothing.
    /// On success the note is added and the form cleared before this returns.
    /// The returned future performs the remote call.
    pub fn create_note(
        &self,
        form: &NoteForm,
    ) -> Result<impl Future<Output = ()> + Send + 'static, ValidationError> {
        form.validate()?;

        let note = Note::from_form(form, &self.client_id);
        self.store.dispatch(Action::AddNote { note: note.clone() });
        self.store.dispatch(Action::ResetForm);

        let api = Arc::clone(&self.api);
        Ok(async move {
            match api.create_note(&note).await {
                Ok(_) => info!("Created note {}", note.id),
                Err(e) => warn!("Failed to create note {}: {}", note.id, e),
            }
        })
    }

    /// Remove a note locally, then on the backend
    pub fn delete_note(&self, id: &str) -> impl Future<Output = ()> + Send + 'static {
        let base = self.store.snapshot();
        let store = self.store.clone();
        let api = Arc::clone(&self.api);
        let id = id.to_string();

        async move {
            let Some(index) = base.position(&id) else {
                warn!("Ignoring delete of unknown note {}", id);
                return;
            };

            let mut notes = base.notes.clone();
            notes.remove(index);
            store.dispatch(Action::SetNotes { notes });

            match api.delete_note(&DeleteNoteInput { id: id.clone() }).await {
                Ok(_) => info!("Deleted note {}", id),
                Err(e) => warn!("Failed to delete note {}: {}", id, e),
            }
        }
    }

    /// Flip a note's completion flag locally, then on the backend
    pub fn update_note(&self, note: &Note) -> impl Future<Output = ()> + Send + 'static {
        let base = self.store.snapshot();
        let store = self.store.clone();
        let api = Arc::clone(&self.api);
        let id = note.id.clone();

        async move {
            let Some(index) = base.position(&id) else {
                warn!("Ignoring update of unknown note {}", id);
                return;
            };

            let mut notes = base.notes.clone();
            notes[index].completed = !notes[index].completed;
            let input = UpdateNoteInput {
                id,
                completed: notes[index].completed,
            };
            store.dispatch(Action::SetNotes { notes });

            match api.update_note(&input).await {
                Ok(_) => info!("Updated note {} (completed={})", input.id, input.completed),
                Err(e) => warn!("Failed to update note {}: {}", input.id, e),
            }
        }
    }

    /// Handle a note-created event from the real-time stream
    ///
    /// Events this client originated are already in the list and are
    /// dropped. Notes from other clients are prepended unless an entry with
    /// the same id is already present (delivery is at-least-once).
    /// Returns whether the state changed.
    pub fn handle_note_created(&self, note: Note) -> bool {
        if note.is_from(&self.client_id) {
            debug!("Dropping self-echo for note {}", note.id);
            return false;
        }

        if self.store.snapshot().contains(&note.id) {
            debug!("Dropping duplicate event for note {}", note.id);
            return false;
        }

        debug!("Adding note {} from client {}", note.id, note.client_id);
        self.store.dispatch(Action::AddNote { note });
        true
    }

    /// Open the note-created event stream
    pub async fn subscribe(&self) -> ApiResult<NoteSubscription> {
        self.api.subscribe_note_created().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ConnectionStatus, SubscriptionCommand};
    use crate::error::ApiError;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use tokio::sync::mpsc;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        List,
        Create(Note),
        Delete(String),
        Update(UpdateNoteInput),
        Subscribe,
    }

    /// In-memory backend that records every call
    #[derive(Default)]
    struct MockApi {
        remote_notes: Vec<Note>,
        fail: bool,
        calls: Mutex<Vec<Call>>,
    }

    impl MockApi {
        fn with_notes(notes: Vec<Note>) -> Self {
            Self {
                remote_notes: notes,
                ..Self::default()
            }
        }

        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::default()
            }
        }

        fn record(&self, call: Call) -> ApiResult<()> {
            self.calls.lock().unwrap().push(call);
            if self.fail {
                return Err(ApiError::Status {
                    status: 500,
                    body: "boom".to_string(),
                });
            }
            Ok(())
        }

        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl NotesApi for MockApi {
        async fn list_notes(&self) -> ApiResult<Vec<Note>> {
            self.record(Call::List)?;
            Ok(self.remote_notes.clone())
        }

        async fn create_note(&self, note: &Note) -> ApiResult<Note> {
            self.record(Call::Create(note.clone()))?;
            Ok(note.clone())
        }

        async fn delete_note(&self, input: &DeleteNoteInput) -> ApiResult<DeleteNoteInput> {
            self.record(Call::Delete(input.id.clone()))?;
            Ok(input.clone())
        }

        async fn update_note(&self, input: &UpdateNoteInput) -> ApiResult<UpdateNoteInput> {
            self.record(Call::Update(input.clone()))?;
            Ok(input.clone())
        }

        async fn subscribe_note_created(&self) -> ApiResult<NoteSubscription> {
            self.record(Call::Subscribe)?;
            let (_event_tx, event_rx) = mpsc::channel(1);
            let (command_tx, _command_rx) = mpsc::channel::<SubscriptionCommand>(1);
            let (_status_tx, status_rx) = tokio::sync::watch::channel(ConnectionStatus::Connected);
            Ok(NoteSubscription::new(event_rx, command_tx, status_rx))
        }
    }

    fn note(id: &str, client: &str) -> Note {
        Note {
            id: id.to_string(),
            name: format!("name {}", id),
            description: format!("description {}", id),
            completed: false,
            client_id: client.to_string(),
        }
    }

    fn loaded_state(notes: Vec<Note>) -> AppState {
        AppState {
            notes,
            loading: false,
            ..AppState::default()
        }
    }

    fn controller(api: MockApi, state: AppState) -> (SyncController<MockApi>, Arc<MockApi>) {
        let api = Arc::new(api);
        let controller = SyncController::new(
            Arc::clone(&api),
            Store::with_state(state),
            ClientId::from("local"),
        );
        (controller, api)
    }

    #[tokio::test]
    async fn test_fetch_notes_sets_notes() {
        let remote = vec![note("1", "other"), note("2", "other")];
        let (ctrl, api) = controller(MockApi::with_notes(remote.clone()), AppState::default());

        ctrl.fetch_notes().await;

        let state = ctrl.snapshot();
        assert_eq!(state.notes, remote);
        assert!(!state.loading);
        assert!(!state.error);
        assert_eq!(api.calls(), vec![Call::List]);
    }

    #[tokio::test]
    async fn test_fetch_notes_failure_sets_error() {
        let (ctrl, api) = controller(MockApi::failing(), AppState::default());

        ctrl.fetch_notes().await;

        let state = ctrl.snapshot();
        assert!(state.error);
        assert!(!state.loading);
        assert!(state.notes.is_empty());
        // No retry
        assert_eq!(api.calls(), vec![Call::List]);
    }

    #[test]
    fn test_create_note_with_empty_name_does_nothing() {
        let (ctrl, api) = controller(MockApi::default(), AppState::default());
        let before = ctrl.snapshot();

        let result = ctrl.create_note(&NoteForm::new("", "description"));

        assert!(matches!(result, Err(ValidationError::EmptyName)));
        assert!(Arc::ptr_eq(&before, &ctrl.snapshot()));
        assert!(api.calls().is_empty());
    }

    #[test]
    fn test_create_note_with_empty_description_does_nothing() {
        let (ctrl, api) = controller(MockApi::default(), AppState::default());
        let before = ctrl.snapshot();

        let result = ctrl.create_note(&NoteForm::new("name", ""));

        assert!(matches!(result, Err(ValidationError::EmptyDescription)));
        assert!(Arc::ptr_eq(&before, &ctrl.snapshot()));
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_create_note_is_optimistic() {
        let (ctrl, api) = controller(
            MockApi::default(),
            loaded_state(vec![note("1", "other")]),
        );
        ctrl.set_input(FormField::Name, "Title");
        ctrl.set_input(FormField::Description, "Body");

        let form = ctrl.snapshot().form.clone();
        let remote_call = ctrl.create_note(&form).unwrap();

        // Applied before the remote call runs
        let state = ctrl.snapshot();
        assert_eq!(state.notes.len(), 2);
        assert_eq!(state.notes[0].name, "Title");
        assert_eq!(state.notes[0].description, "Body");
        assert_eq!(state.form, NoteForm::default());
        assert!(api.calls().is_empty());

        remote_call.await;

        let created = state.notes[0].clone();
        assert_eq!(api.calls(), vec![Call::Create(created.clone())]);
        assert_eq!(created.client_id, "local");
        assert!(!created.completed);
    }

    #[tokio::test]
    async fn test_create_note_failure_keeps_note() {
        let (ctrl, api) = controller(MockApi::failing(), loaded_state(vec![]));

        ctrl.create_note(&NoteForm::new("a", "b")).unwrap().await;

        assert_eq!(ctrl.snapshot().notes.len(), 1);
        assert_eq!(api.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_create_note_end_to_end() {
        let (ctrl, _api) = controller(MockApi::default(), loaded_state(vec![]));

        ctrl.create_note(&NoteForm::new("A", "B")).unwrap().await;

        let state = ctrl.snapshot();
        assert_eq!(state.notes.len(), 1);
        let created = &state.notes[0];
        assert_eq!(created.name, "A");
        assert_eq!(created.description, "B");
        assert!(!created.completed);
        assert_eq!(created.client_id, "local");
        assert!(!created.id.is_empty());
        assert_eq!(state.form.name, "");
        assert_eq!(state.form.description, "");
    }

    #[tokio::test]
    async fn test_delete_note_removes_entry() {
        let notes = vec![note("1", "a"), note("2", "a"), note("3", "a")];
        let (ctrl, api) = controller(MockApi::default(), loaded_state(notes.clone()));

        ctrl.delete_note("2").await;

        let state = ctrl.snapshot();
        assert_eq!(state.notes, vec![notes[0].clone(), notes[2].clone()]);
        assert_eq!(api.calls(), vec![Call::Delete("2".to_string())]);
    }

    #[tokio::test]
    async fn test_delete_unknown_note_is_ignored() {
        let notes = vec![note("1", "a"), note("2", "a")];
        let (ctrl, api) = controller(MockApi::default(), loaded_state(notes));
        let before = ctrl.snapshot();

        ctrl.delete_note("missing").await;

        assert!(Arc::ptr_eq(&before, &ctrl.snapshot()));
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_delete_failure_is_not_rolled_back() {
        let (ctrl, _api) = controller(MockApi::failing(), loaded_state(vec![note("1", "a")]));

        ctrl.delete_note("1").await;

        assert!(ctrl.snapshot().notes.is_empty());
    }

    #[tokio::test]
    async fn test_update_note_flips_completed_only() {
        let notes = vec![note("1", "a"), note("2", "a")];
        let (ctrl, api) = controller(MockApi::default(), loaded_state(notes.clone()));

        ctrl.update_note(&notes[1]).await;

        let state = ctrl.snapshot();
        assert_eq!(state.notes[0], notes[0]);
        let mut expected = notes[1].clone();
        expected.completed = true;
        assert_eq!(state.notes[1], expected);
        assert_eq!(
            api.calls(),
            vec![Call::Update(UpdateNoteInput {
                id: "2".to_string(),
                completed: true,
            })]
        );

        // Toggling again flips back
        let current = state.notes[1].clone();
        ctrl.update_note(&current).await;
        assert!(!ctrl.snapshot().notes[1].completed);
    }

    #[tokio::test]
    async fn test_update_unknown_note_is_ignored() {
        let (ctrl, api) = controller(MockApi::default(), loaded_state(vec![note("1", "a")]));
        let before = ctrl.snapshot();

        ctrl.update_note(&note("missing", "a")).await;

        assert!(Arc::ptr_eq(&before, &ctrl.snapshot()));
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_back_to_back_operations_lose_an_update() {
        let notes = vec![note("1", "a"), note("2", "a")];
        let (ctrl, api) = controller(MockApi::default(), loaded_state(notes.clone()));

        // Both capture the same list before either runs
        let delete = ctrl.delete_note("1");
        let update = ctrl.update_note(&notes[1]);
        delete.await;
        update.await;

        // The update's list still contains note 1: the delete was overwritten
        let state = ctrl.snapshot();
        assert_eq!(state.notes.len(), 2);
        assert_eq!(state.notes[0].id, "1");
        assert!(state.notes[1].completed);

        // Both remote calls were still issued
        assert_eq!(api.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_sequential_operations_compose() {
        let notes = vec![note("1", "a"), note("2", "a")];
        let (ctrl, _api) = controller(MockApi::default(), loaded_state(notes.clone()));

        ctrl.delete_note("1").await;
        ctrl.update_note(&notes[1]).await;

        let state = ctrl.snapshot();
        assert_eq!(state.notes.len(), 1);
        assert_eq!(state.notes[0].id, "2");
        assert!(state.notes[0].completed);
    }

    #[test]
    fn test_self_echo_is_dropped() {
        let (ctrl, _api) = controller(MockApi::default(), loaded_state(vec![]));
        let before = ctrl.snapshot();

        let changed = ctrl.handle_note_created(note("1", "local"));

        assert!(!changed);
        assert!(Arc::ptr_eq(&before, &ctrl.snapshot()));
    }

    #[test]
    fn test_foreign_note_is_prepended() {
        let (ctrl, _api) = controller(MockApi::default(), loaded_state(vec![note("1", "a")]));

        let changed = ctrl.handle_note_created(note("2", "someone-else"));

        assert!(changed);
        let state = ctrl.snapshot();
        assert_eq!(state.notes.len(), 2);
        assert_eq!(state.notes[0].id, "2");
    }

    #[test]
    fn test_duplicate_foreign_event_is_dropped() {
        let (ctrl, _api) = controller(MockApi::default(), loaded_state(vec![]));

        assert!(ctrl.handle_note_created(note("2", "someone-else")));
        assert!(!ctrl.handle_note_created(note("2", "someone-else")));
        assert_eq!(ctrl.snapshot().notes.len(), 1);
    }

    #[tokio::test]
    async fn test_own_created_note_echo_leaves_state_alone() {
        let (ctrl, _api) = controller(MockApi::default(), loaded_state(vec![]));
        ctrl.create_note(&NoteForm::new("A", "B")).unwrap().await;

        let echo = ctrl.snapshot().notes[0].clone();
        let before = ctrl.snapshot();
        assert!(!ctrl.handle_note_created(echo));
        assert!(Arc::ptr_eq(&before, &ctrl.snapshot()));
    }

    #[tokio::test]
    async fn test_subscribe_goes_through_api() {
        let (ctrl, api) = controller(MockApi::default(), AppState::default());

        let sub = ctrl.subscribe().await.unwrap();

        assert_eq!(sub.status(), ConnectionStatus::Connected);
        assert_eq!(api.calls(), vec![Call::Subscribe]);
    }
}
