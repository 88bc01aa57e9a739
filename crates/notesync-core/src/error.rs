//! Error types
//!
//! Two tiers: [`ValidationError`] is raised before anything is dispatched and
//! is meant to be shown to the user; [`ApiError`] covers every failure of the
//! remote backend.

use thiserror::Error;
use tokio_tungstenite::tungstenite;

/// The create-note form is incomplete
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please enter a name and description (name is empty)")]
    EmptyName,

    #[error("Please enter a name and description (description is empty)")]
    EmptyDescription,
}

/// Errors returned by the remote notes API
#[derive(Error, Debug)]
pub enum ApiError {
    /// No endpoint configured
    #[error("API endpoint not configured. Set api_url with `notesync config set api_url <url>`.")]
    NotConfigured,

    /// Transport failure talking to the HTTP endpoint
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Endpoint answered with a non-success status
    #[error("Server returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The GraphQL response carried errors
    #[error("GraphQL error: {}", .messages.join("; "))]
    GraphQl { messages: Vec<String> },

    /// The response had no data for the requested operation
    #[error("Response is missing data for '{operation}'")]
    MissingData { operation: String },

    /// Response body could not be decoded
    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    /// WebSocket transport failure
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tungstenite::Error),

    /// The real-time endpoint broke the subscription protocol
    #[error("Subscription protocol error: {0}")]
    Protocol(String),
}

impl ApiError {
    /// Whether a retry could plausibly succeed
    ///
    /// Only consulted by the subscription transport when deciding whether to
    /// reconnect. Mutations and queries are never retried.
    pub fn is_transient(&self) -> bool {
        match self {
            ApiError::Http(_) | ApiError::WebSocket(_) | ApiError::Protocol(_) => true,
            ApiError::Status { status, .. } => *status >= 500 || *status == 429,
            ApiError::NotConfigured
            | ApiError::GraphQl { .. }
            | ApiError::MissingData { .. }
            | ApiError::Decode(_) => false,
        }
    }
}

/// Result type for remote API calls
pub type ApiResult<T> = Result<T, ApiError>;
