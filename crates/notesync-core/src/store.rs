//! Application state store
//!
//! The store owns the canonical [`AppState`] and is the only place it
//! changes. Every dispatch runs [`transition`] and publishes the result as a
//! fresh `Arc`, so views holding an older snapshot keep it intact and can
//! detect changes with [`Arc::ptr_eq`].
//!
//! ```text
//! let store = Store::new();
//! let mut view = store.watch();
//!
//! store.dispatch(Action::ResetForm);
//! view.changed().await?;
//! let snapshot = view.borrow_and_update().clone();
//! ```

use std::sync::Arc;

use tokio::sync::watch;
use tracing::debug;

use crate::state::{transition, Action, AppState};

/// Owner of the current application snapshot
#[derive(Debug, Clone)]
pub struct Store {
    tx: Arc<watch::Sender<Arc<AppState>>>,
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl Store {
    /// Create a store holding the initial state
    pub fn new() -> Self {
        Self::with_state(AppState::default())
    }

    /// Create a store holding a specific state
    pub fn with_state(state: AppState) -> Self {
        let (tx, _rx) = watch::channel(Arc::new(state));
        Self { tx: Arc::new(tx) }
    }

    /// Get the current snapshot
    pub fn snapshot(&self) -> Arc<AppState> {
        self.tx.borrow().clone()
    }

    /// Apply an action and return the resulting snapshot
    pub fn dispatch(&self, action: Action) -> Arc<AppState> {
        debug!(action = action.name(), "dispatch");

        let mut next = Arc::default();
        self.tx.send_modify(|current| {
            *current = Arc::new(transition(current, &action));
            next = Arc::clone(current);
        });
        next
    }

    /// Subscribe to snapshot changes
    pub fn watch(&self) -> watch::Receiver<Arc<AppState>> {
        self.tx.subscribe()
    }
}
