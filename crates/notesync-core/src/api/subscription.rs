//! Note-created event stream
//!
//! A background task keeps a `graphql-transport-ws` connection open,
//! forwards every `onCreateNote` payload into a channel, and reconnects with
//! exponential backoff when the connection drops. The task stops on
//! [`SubscriptionCommand::Shutdown`], when the receiving side is dropped, or
//! when the server rejects the subscription itself.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, watch};
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};

use super::documents::{ON_CREATE_NOTE, ON_CREATE_NOTE_FIELD};
use super::message::{errors_to_api_error, ClientMessage, ServerMessage, GRAPHQL_TRANSPORT_WS};
use super::{ConnectionStatus, NoteSubscription, SubscriptionCommand};
use crate::error::{ApiError, ApiResult};
use crate::models::Note;

/// Operation id used for the single subscription on each connection
const SUBSCRIPTION_ID: &str = "on-create-note";

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsRead = futures_util::stream::SplitStream<WsStream>;
type WsWrite = futures_util::stream::SplitSink<WsStream, Message>;

/// Configuration for the subscription task
#[derive(Debug, Clone)]
pub struct SubscriptionConfig {
    /// WebSocket URL
    pub url: String,
    /// API key sent in `connection_init`
    pub api_key: Option<String>,
    /// Initial reconnect delay
    pub initial_reconnect_delay: Duration,
    /// Maximum reconnect delay
    pub max_reconnect_delay: Duration,
    /// How long to wait for `connection_ack`
    pub ack_timeout: Duration,
}

impl Default for SubscriptionConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            api_key: None,
            initial_reconnect_delay: Duration::from_secs(1),
            max_reconnect_delay: Duration::from_secs(30),
            ack_timeout: Duration::from_secs(10),
        }
    }
}

/// Spawn the subscription task and return its handle
pub fn spawn_subscription_task(config: SubscriptionConfig) -> NoteSubscription {
    let (command_tx, command_rx) = mpsc::channel(4);
    let (event_tx, event_rx) = mpsc::channel(64);
    let (status_tx, status_rx) = watch::channel(ConnectionStatus::Disconnected);

    let task = tokio::spawn(subscription_loop(config, command_rx, event_tx, status_tx));

    NoteSubscription::new(event_rx, command_tx, status_rx).with_task(task)
}

/// Main loop with reconnection
async fn subscription_loop(
    config: SubscriptionConfig,
    mut command_rx: mpsc::Receiver<SubscriptionCommand>,
    event_tx: mpsc::Sender<Note>,
    status_tx: watch::Sender<ConnectionStatus>,
) {
    let mut reconnect_delay = config.initial_reconnect_delay;

    loop {
        let _ = status_tx.send(ConnectionStatus::Connecting);

        match connect_and_listen(&config, &mut command_rx, &event_tx, &status_tx).await {
            Ok(true) => {
                info!("Note subscription closed");
                break;
            }
            Ok(false) => {
                // Closed by the server, reset backoff
                reconnect_delay = config.initial_reconnect_delay;
            }
            Err(e) if !e.is_transient() => {
                warn!("Note subscription failed: {}", e);
                break;
            }
            Err(e) => {
                warn!("Note subscription connection error: {}", e);
            }
        }

        let _ = status_tx.send(ConnectionStatus::Disconnected);
        debug!("Reconnecting in {:?}", reconnect_delay);

        tokio::select! {
            _ = tokio::time::sleep(reconnect_delay) => {
                reconnect_delay = next_delay(reconnect_delay, config.max_reconnect_delay);
            }
            cmd = command_rx.recv() => {
                if matches!(cmd, Some(SubscriptionCommand::Shutdown) | None) {
                    break;
                }
            }
        }
    }

    let _ = status_tx.send(ConnectionStatus::Disconnected);
}

/// Double the delay, capped at `max`
fn next_delay(current: Duration, max: Duration) -> Duration {
    (current * 2).min(max)
}

/// Connect, subscribe and forward events
///
/// Returns `Ok(true)` when the task should stop, `Ok(false)` when the server
/// closed the connection and a reconnect is due.
async fn connect_and_listen(
    config: &SubscriptionConfig,
    command_rx: &mut mpsc::Receiver<SubscriptionCommand>,
    event_tx: &mpsc::Sender<Note>,
    status_tx: &watch::Sender<ConnectionStatus>,
) -> ApiResult<bool> {
    let mut request = config.url.as_str().into_client_request()?;
    request.headers_mut().insert(
        "Sec-WebSocket-Protocol",
        HeaderValue::from_static(GRAPHQL_TRANSPORT_WS),
    );

    debug!("Connecting to {}", config.url);
    let (ws_stream, _response) = connect_async(request).await?;
    let (mut write, mut read) = ws_stream.split();

    send(
        &mut write,
        ClientMessage::connection_init(config.api_key.as_deref()),
    )
    .await?;
    wait_for_ack(&mut read, &mut write, config.ack_timeout).await?;

    send(
        &mut write,
        ClientMessage::subscribe(SUBSCRIPTION_ID, ON_CREATE_NOTE),
    )
    .await?;

    let _ = status_tx.send(ConnectionStatus::Connected);
    info!("Subscribed to note-created events at {}", config.url);

    loop {
        tokio::select! {
            cmd = command_rx.recv() => {
                if matches!(cmd, Some(SubscriptionCommand::Shutdown) | None) {
                    let _ = send(&mut write, ClientMessage::complete(SUBSCRIPTION_ID)).await;
                    write.close().await.ok();
                    return Ok(true);
                }
            }

            msg = read.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let message = match ServerMessage::decode(&text) {
                            Ok(message) => message,
                            Err(e) => {
                                warn!("Ignoring undecodable frame: {}", e);
                                continue;
                            }
                        };

                        match message {
                            ServerMessage::Next { id, payload } if id == SUBSCRIPTION_ID => {
                                match payload.into_field::<Note>(ON_CREATE_NOTE_FIELD) {
                                    Ok(note) => {
                                        debug!("Received note-created event for {}", note.id);
                                        if event_tx.send(note).await.is_err() {
                                            // Nobody is listening any more
                                            write.close().await.ok();
                                            return Ok(true);
                                        }
                                    }
                                    Err(e) => warn!("Ignoring malformed note-created event: {}", e),
                                }
                            }
                            ServerMessage::Error { payload, .. } => {
                                return Err(errors_to_api_error(payload));
                            }
                            ServerMessage::Complete { .. } => {
                                return Ok(false);
                            }
                            ServerMessage::Ping { .. } => {
                                send(&mut write, ClientMessage::Pong).await?;
                            }
                            _ => {}
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => return Ok(false),
                    Some(Err(e)) => return Err(e.into()),
                    _ => {}
                }
            }
        }
    }
}

/// Wait for `connection_ack`, answering pings meanwhile
async fn wait_for_ack(read: &mut WsRead, write: &mut WsWrite, timeout: Duration) -> ApiResult<()> {
    let deadline = tokio::time::Instant::now() + timeout;

    loop {
        let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
        if remaining.is_zero() {
            return Err(ApiError::Protocol(
                "Timeout waiting for connection_ack".to_string(),
            ));
        }

        tokio::select! {
            msg = read.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => match ServerMessage::decode(&text) {
                        Ok(ServerMessage::ConnectionAck { .. }) => return Ok(()),
                        Ok(ServerMessage::Ping { .. }) => send(write, ClientMessage::Pong).await?,
                        Ok(_) => {}
                        Err(e) => warn!("Ignoring undecodable frame: {}", e),
                    },
                    Some(Ok(Message::Close(_))) | None => {
                        return Err(ApiError::Protocol(
                            "Server closed connection during handshake".to_string(),
                        ));
                    }
                    Some(Err(e)) => return Err(e.into()),
                    _ => {}
                }
            }
            _ = tokio::time::sleep(remaining) => {
                return Err(ApiError::Protocol(
                    "Timeout waiting for connection_ack".to_string(),
                ));
            }
        }
    }
}

async fn send(write: &mut WsWrite, message: ClientMessage) -> ApiResult<()> {
    write.send(Message::Text(message.encode()?)).await?;
    Ok(())
}
