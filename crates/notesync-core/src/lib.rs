//! notesync Core Library
//!
//! This crate provides the client-side core of notesync, a small note-taking
//! client whose data lives in a hosted GraphQL backend.
//!
//! # Architecture
//!
//! - **Store**: owns the current [`AppState`] snapshot, changed only through
//!   the pure [`transition`] function
//! - **SyncController**: applies user intents optimistically, then calls the
//!   backend through [`NotesApi`]
//! - **GraphqlClient**: HTTP queries/mutations and a WebSocket event stream
//!
//! # Quick Start
//!
//! ```text
//! let config = Config::load()?;
//! let api = Arc::new(GraphqlClient::from_config(&config)?);
//! let controller = SyncController::new(api, Store::new(), ClientId::generate());
//!
//! controller.fetch_notes().await;
//! controller.create_note(&NoteForm::new("Groceries", "milk"))?.await;
//! ```
//!
//! # Modules
//!
//! - `state`: Application state and transition function
//! - `store`: Snapshot owner
//! - `controller`: Synchronization controller
//! - `api`: Remote API trait and GraphQL implementation
//! - `models`: Note, form and mutation inputs
//! - `identity`: Client and note identifiers
//! - `config`: Application configuration
//! - `error`: Validation and API errors

pub mod api;
pub mod config;
pub mod controller;
pub mod error;
pub mod identity;
pub mod models;
pub mod state;
pub mod store;

pub use api::{ConnectionStatus, GraphqlClient, NoteSubscription, NotesApi};
pub use config::Config;
pub use controller::SyncController;
pub use error::{ApiError, ApiResult, ValidationError};
pub use identity::ClientId;
pub use models::{DeleteNoteInput, FormField, Note, NoteForm, UpdateNoteInput};
pub use state::{transition, Action, AppState};
pub use store::Store;
