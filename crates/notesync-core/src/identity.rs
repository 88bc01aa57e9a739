//! Client and note identity
//!
//! Each running client generates one [`ClientId`] during initialization and
//! passes it to the sync controller. Every note it creates is tagged with
//! that id, which is how the client recognizes its own creations when they
//! come back on the real-time event stream.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of a running client process
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientId(String);

impl ClientId {
    /// Generate a fresh random client id
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Get the id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ClientId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ClientId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ClientId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Generate a fresh note identifier
pub fn new_note_id() -> String {
    Uuid::new_v4().to_string()
}
