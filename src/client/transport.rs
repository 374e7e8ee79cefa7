//! WebSocket connection task and the session-facing transport handle

use crate::session::{SessionError, Transport};
use futures_util::{SinkExt, StreamExt};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tokio_tungstenite::{connect_async, tungstenite::Message};

/// What the connection task reports back to the run-loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SocketEvent {
    /// Handshake finished; frames may flow
    Opened,

    /// Inbound text frame
    Frame(String),

    /// Peer closed the connection
    Closed,

    /// Connect failed or the connection broke
    Failed(String),
}

/// Outbound handle owned by the session.
///
/// Frames are queued to the connection task, so `send` never blocks.
pub struct WsTransport {
    outbound: mpsc::UnboundedSender<String>,
}

impl WsTransport {
    /// Create the handle and the receiver the connection task drains
    pub fn new() -> (Self, mpsc::UnboundedReceiver<String>) {
        let (outbound, rx) = mpsc::unbounded_channel();
        (Self { outbound }, rx)
    }
}

impl Transport for WsTransport {
    fn send(&mut self, frame: String) -> Result<(), SessionError> {
        self.outbound
            .send(frame)
            .map_err(|_| SessionError::Transport("connection is no longer running".to_string()))
    }
}

/// Spawn the task that owns the socket for `url`
pub fn spawn_connection(
    url: String,
    connect_timeout: Duration,
    outbound: mpsc::UnboundedReceiver<String>,
    events: mpsc::UnboundedSender<SocketEvent>,
) -> JoinHandle<()> {
    tokio::spawn(run_connection(url, connect_timeout, outbound, events))
}

async fn run_connection(
    url: String,
    connect_timeout: Duration,
    mut outbound: mpsc::UnboundedReceiver<String>,
    events: mpsc::UnboundedSender<SocketEvent>,
) {
    tracing::info!("Opening WebSocket to {}", url);

    let stream = match timeout(connect_timeout, connect_async(url.as_str())).await {
        Ok(Ok((stream, _response))) => stream,
        Ok(Err(e)) => {
            tracing::error!("Failed to connect to {}: {}", url, e);
            let _ = events.send(SocketEvent::Failed(e.to_string()));
            return;
        }
        Err(_) => {
            tracing::error!("Timed out connecting to {}", url);
            let _ = events.send(SocketEvent::Failed(format!(
                "timed out after {}s",
                connect_timeout.as_secs()
            )));
            return;
        }
    };

    if events.send(SocketEvent::Opened).is_err() {
        return;
    }

    let (mut write, mut read) = stream.split();

    loop {
        tokio::select! {
            frame = outbound.recv() => {
                match frame {
                    Some(text) => {
                        if let Err(e) = write.send(Message::Text(text)).await {
                            tracing::error!("Failed to write frame: {}", e);
                            let _ = events.send(SocketEvent::Failed(e.to_string()));
                            break;
                        }
                    }
                    None => {
                        // Session dropped its transport
                        let _ = write.send(Message::Close(None)).await;
                        break;
                    }
                }
            }

            msg = read.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        if events.send(SocketEvent::Frame(text)).is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        tracing::info!("WebSocket closed by server");
                        let _ = events.send(SocketEvent::Closed);
                        break;
                    }
                    Some(Err(e)) => {
                        tracing::error!("WebSocket error: {}", e);
                        let _ = events.send(SocketEvent::Failed(e.to_string()));
                        break;
                    }
                    Some(Ok(_)) => {}
                }
            }
        }
    }

    tracing::debug!("Connection task for {} finished", url);
}
