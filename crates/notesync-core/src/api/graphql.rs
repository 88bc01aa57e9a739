//! GraphQL client for the hosted notes backend

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use super::documents;
use super::message::{GraphqlRequest, GraphqlResponse};
use super::subscription::{spawn_subscription_task, SubscriptionConfig};
use super::{NoteSubscription, NotesApi};
use crate::config::Config;
use crate::error::{ApiError, ApiResult};
use crate::models::{DeleteNoteInput, Note, UpdateNoteInput};

/// Header carrying the API key
const API_KEY_HEADER: &str = "x-api-key";

/// `listNotes` result shape
#[derive(Debug, Deserialize)]
struct NoteConnection {
    #[serde(default)]
    items: Vec<Option<Note>>,
}

/// Client for the notes GraphQL API
#[derive(Debug, Clone)]
pub struct GraphqlClient {
    http: reqwest::Client,
    endpoint: String,
    realtime_endpoint: String,
    api_key: Option<String>,
}

impl GraphqlClient {
    /// Create a client for the given HTTP and WebSocket endpoints
    pub fn new(endpoint: impl Into<String>, realtime_endpoint: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.into(),
            realtime_endpoint: realtime_endpoint.into(),
            api_key: None,
        }
    }

    /// Set the API key sent with every request
    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key;
        self
    }

    /// Create a client from configuration
    pub fn from_config(config: &Config) -> ApiResult<Self> {
        let endpoint = config.api_url.clone().ok_or(ApiError::NotConfigured)?;
        let realtime = config.realtime_endpoint().ok_or(ApiError::NotConfigured)?;
        Ok(Self::new(endpoint, realtime).with_api_key(config.api_key.clone()))
    }

    /// WebSocket endpoint
    pub fn realtime_endpoint(&self) -> &str {
        &self.realtime_endpoint
    }

    /// Run one query or mutation and decode the named response field
    async fn execute<T: DeserializeOwned>(
        &self,
        field: &str,
        query: &str,
        variables: Value,
    ) -> ApiResult<T> {
        debug!("POST {} ({})", self.endpoint, field);

        let mut request = self
            .http
            .post(&self.endpoint)
            .json(&GraphqlRequest::with_variables(query, variables));
        if let Some(ref key) = self.api_key {
            request = request.header(API_KEY_HEADER, key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let envelope: GraphqlResponse = serde_json::from_slice(&response.bytes().await?)?;
        envelope.into_field(field)
    }
}

#[async_trait]
impl NotesApi for GraphqlClient {
    async fn list_notes(&self) -> ApiResult<Vec<Note>> {
        let connection: NoteConnection = self
            .execute(documents::LIST_NOTES_FIELD, documents::LIST_NOTES, Value::Null)
            .await?;
        Ok(connection.items.into_iter().flatten().collect())
    }

    async fn create_note(&self, note: &Note) -> ApiResult<Note> {
        self.execute(
            documents::CREATE_NOTE_FIELD,
            documents::CREATE_NOTE,
            json!({ "input": note }),
        )
        .await
    }

    async fn delete_note(&self, input: &DeleteNoteInput) -> ApiResult<DeleteNoteInput> {
        self.execute(
            documents::DELETE_NOTE_FIELD,
            documents::DELETE_NOTE,
            json!({ "input": input }),
        )
        .await
    }

    async fn update_note(&self, input: &UpdateNoteInput) -> ApiResult<UpdateNoteInput> {
        self.execute(
            documents::UPDATE_NOTE_FIELD,
            documents::UPDATE_NOTE,
            json!({ "input": input }),
        )
        .await
    }

    async fn subscribe_note_created(&self) -> ApiResult<NoteSubscription> {
        let config = SubscriptionConfig {
            url: self.realtime_endpoint.clone(),
            api_key: self.api_key.clone(),
            ..SubscriptionConfig::default()
        };
        Ok(spawn_subscription_task(config))
    }
}
