//! Wire messages
//!
//! The GraphQL request/response envelope shared by HTTP and WebSocket, and
//! the `graphql-transport-ws` frames used by the event stream. Frames are
//! JSON text messages tagged by `type`.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ApiError, ApiResult};

/// WebSocket subprotocol name
pub const GRAPHQL_TRANSPORT_WS: &str = "graphql-transport-ws";

/// A GraphQL operation request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphqlRequest {
    pub query: String,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub variables: Value,
}

impl GraphqlRequest {
    /// Request without variables
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            variables: Value::Null,
        }
    }

    /// Request with variables
    pub fn with_variables(query: impl Into<String>, variables: Value) -> Self {
        Self {
            query: query.into(),
            variables,
        }
    }
}

/// One entry of a GraphQL `errors` array
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphqlError {
    pub message: String,
}

/// A GraphQL response envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphqlResponse<T = Value> {
    #[serde(default)]
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Option<Vec<GraphqlError>>,
}

impl GraphqlResponse<Value> {
    /// Extract and decode one top-level field of `data`
    ///
    /// Any entry in `errors` fails the whole response.
    pub fn into_field<T: DeserializeOwned>(self, field: &str) -> ApiResult<T> {
        if let Some(errors) = self.errors.filter(|e| !e.is_empty()) {
            return Err(errors_to_api_error(errors));
        }

        let value = self
            .data
            .and_then(|mut data| data.get_mut(field).map(Value::take))
            .filter(|v| !v.is_null())
            .ok_or_else(|| ApiError::MissingData {
                operation: field.to_string(),
            })?;

        Ok(serde_json::from_value(value)?)
    }
}

/// Convert a GraphQL `errors` array into an [`ApiError`]
pub fn errors_to_api_error(errors: Vec<GraphqlError>) -> ApiError {
    ApiError::GraphQl {
        messages: errors.into_iter().map(|e| e.message).collect(),
    }
}

/// Frames sent to the real-time endpoint
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// First frame after the socket opens
    ConnectionInit {
        #[serde(skip_serializing_if = "Option::is_none")]
        payload: Option<Value>,
    },
    /// Start an operation
    Subscribe { id: String, payload: GraphqlRequest },
    /// Stop an operation
    Complete { id: String },
    Pong,
}

impl ClientMessage {
    /// Create the init frame, carrying the API key when one is configured
    pub fn connection_init(api_key: Option<&str>) -> Self {
        ClientMessage::ConnectionInit {
            payload: api_key.map(|key| serde_json::json!({ "x-api-key": key })),
        }
    }

    /// Create a subscribe frame
    pub fn subscribe(id: &str, query: &str) -> Self {
        ClientMessage::Subscribe {
            id: id.to_string(),
            payload: GraphqlRequest::new(query),
        }
    }

    /// Create a complete frame
    pub fn complete(id: &str) -> Self {
        ClientMessage::Complete { id: id.to_string() }
    }

    /// Encode to a JSON text frame
    pub fn encode(&self) -> ApiResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Frames received from the real-time endpoint
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Server accepted the connection
    ConnectionAck {
        #[serde(default)]
        payload: Option<Value>,
    },
    /// Operation result
    Next { id: String, payload: GraphqlResponse },
    /// Operation failed
    Error {
        id: String,
        payload: Vec<GraphqlError>,
    },
    /// Operation finished
    Complete { id: String },
    Ping {
        #[serde(default)]
        payload: Option<Value>,
    },
    Pong {
        #[serde(default)]
        payload: Option<Value>,
    },
}

impl ServerMessage {
    /// Decode a JSON text frame
    pub fn decode(text: &str) -> ApiResult<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Note;

    #[test]
    fn test_connection_init_with_key() {
        let text = ClientMessage::connection_init(Some("secret"))
            .encode()
            .unwrap();
        let json: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(json["type"], "connection_init");
        assert_eq!(json["payload"]["x-api-key"], "secret");
    }

    #[test]
    fn test_connection_init_without_key_has_no_payload() {
        let text = ClientMessage::connection_init(None).encode().unwrap();
        assert_eq!(text, r#"{"type":"connection_init"}"#);
    }

    #[test]
    fn test_subscribe_frame() {
        let text = ClientMessage::subscribe("1", "subscription { x }")
            .encode()
            .unwrap();
        let json: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(json["type"], "subscribe");
        assert_eq!(json["id"], "1");
        assert_eq!(json["payload"]["query"], "subscription { x }");
        assert!(json["payload"].get("variables").is_none());
    }

    #[test]
    fn test_pong_frame() {
        assert_eq!(ClientMessage::Pong.encode().unwrap(), r#"{"type":"pong"}"#);
    }

    #[test]
    fn test_decode_ack_and_ping() {
        assert!(matches!(
            ServerMessage::decode(r#"{"type":"connection_ack"}"#).unwrap(),
            ServerMessage::ConnectionAck { .. }
        ));
        assert!(matches!(
            ServerMessage::decode(r#"{"type":"ping"}"#).unwrap(),
            ServerMessage::Ping { .. }
        ));
    }

    #[test]
    fn test_decode_next_carries_note() {
        let text = r#"{
            "type": "next",
            "id": "1",
            "payload": {"data": {"onCreateNote": {
                "id": "n1", "clientId": "c1", "name": "a", "description": "b", "completed": false
            }}}
        }"#;

        match ServerMessage::decode(text).unwrap() {
            ServerMessage::Next { id, payload } => {
                assert_eq!(id, "1");
                let note: Note = payload.into_field("onCreateNote").unwrap();
                assert_eq!(note.client_id, "c1");
            }
            other => panic!("Expected Next, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_rejects_unknown_type() {
        assert!(ServerMessage::decode(r#"{"type":"mystery"}"#).is_err());
    }

    #[test]
    fn test_into_field_reports_errors() {
        let response: GraphqlResponse = serde_json::from_str(
            r#"{"data": null, "errors": [{"message": "Unauthorized"}]}"#,
        )
        .unwrap();

        let err = response.into_field::<Value>("listNotes").unwrap_err();
        assert!(matches!(err, ApiError::GraphQl { ref messages } if messages == &["Unauthorized"]));
    }

    #[test]
    fn test_into_field_missing_data() {
        let response: GraphqlResponse =
            serde_json::from_str(r#"{"data": {"listNotes": null}}"#).unwrap();

        let err = response.into_field::<Value>("listNotes").unwrap_err();
        assert!(matches!(err, ApiError::MissingData { .. }));
    }

    #[test]
    fn test_into_field_ignores_empty_errors() {
        let response: GraphqlResponse =
            serde_json::from_str(r#"{"data": {"deleteNote": {"id": "x"}}, "errors": []}"#)
                .unwrap();

        let value: Value = response.into_field("deleteNote").unwrap();
        assert_eq!(value["id"], "x");
    }
}
