//! WebSocket client transport using `tokio-tungstenite`.

use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;

use crate::{
    ConnectionState, StateCell, Transport, TransportError, TransportEvent,
};

/// Default capacity of the bounded event channel.
const DEFAULT_EVENT_CAPACITY: usize = 256;

/// Work handed from the handle to the connection task.
enum Command {
    Frame(String),
    Close,
}

/// How the connection task's I/O loop ended.
enum Outcome {
    Closed(String),
    Failed(String),
}

/// A WebSocket connection to the chat server.
///
/// The socket itself lives in a background task spawned by
/// [`connect`](Self::connect). This handle only carries the shared
/// lifecycle state and a command channel, so `send` never blocks.
pub struct WebSocketTransport {
    state: Arc<StateCell>,
    cmd_tx: mpsc::UnboundedSender<Command>,
    cmd_rx: Option<mpsc::UnboundedReceiver<Command>>,
    event_capacity: usize,
}

impl WebSocketTransport {
    /// Creates an idle transport with the default event channel capacity.
    pub fn new() -> Self {
        Self::with_event_capacity(DEFAULT_EVENT_CAPACITY)
    }

    /// Creates an idle transport whose event channel holds up to
    /// `capacity` undelivered events. Values below 1 are clamped to 1.
    pub fn with_event_capacity(capacity: usize) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        Self {
            state: Arc::new(StateCell::new(ConnectionState::Idle)),
            cmd_tx,
            cmd_rx: Some(cmd_rx),
            event_capacity: capacity.max(1),
        }
    }

    /// Starts connecting to `endpoint` (a `ws://` URL) in the background.
    ///
    /// Returns immediately with the receiver on which lifecycle events
    /// and inbound frames are delivered. A failed connection attempt is
    /// reported there as `Errored` followed by `Closed`, not here.
    ///
    /// Must be called from within a Tokio runtime.
    ///
    /// # Errors
    /// Returns [`TransportError::AlreadyStarted`] unless the transport is
    /// still [`ConnectionState::Idle`].
    pub fn connect(
        &mut self,
        endpoint: &str,
    ) -> Result<mpsc::Receiver<TransportEvent>, TransportError> {
        if self.state.get() != ConnectionState::Idle {
            return Err(TransportError::AlreadyStarted);
        }
        let cmd_rx = self.cmd_rx.take().ok_or(TransportError::AlreadyStarted)?;
        let (event_tx, event_rx) = mpsc::channel(self.event_capacity);

        self.state.set(ConnectionState::Connecting);
        tracing::info!(endpoint, "connecting");

        tokio::spawn(connection_loop(
            endpoint.to_owned(),
            Arc::clone(&self.state),
            cmd_rx,
            event_tx,
        ));
        Ok(event_rx)
    }
}

impl Default for WebSocketTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for WebSocketTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebSocketTransport")
            .field("state", &self.state.get())
            .field("event_capacity", &self.event_capacity)
            .finish()
    }
}

impl Transport for WebSocketTransport {
    fn state(&self) -> ConnectionState {
        self.state.get()
    }

    fn send(&self, frame: String) -> Result<(), TransportError> {
        let state = self.state.get();
        if !state.is_open() {
            return Err(TransportError::NotConnected(state));
        }
        self.cmd_tx
            .send(Command::Frame(frame))
            .map_err(|_| TransportError::Shutdown)
    }

    fn close(&self) -> Result<(), TransportError> {
        match self.state.get() {
            ConnectionState::Closed => Ok(()),
            ConnectionState::Idle => {
                self.state.set(ConnectionState::Closed);
                Ok(())
            }
            ConnectionState::Connecting | ConnectionState::Open => {
                self.state.set(ConnectionState::Closed);
                // A dead task means the socket is already gone.
                if self.cmd_tx.send(Command::Close).is_err() {
                    tracing::debug!("close requested after connection task ended");
                }
                Ok(())
            }
        }
    }
}

/// Owns the socket for its whole life: connect, pump frames both ways,
/// then report how it ended.
async fn connection_loop(
    endpoint: String,
    state: Arc<StateCell>,
    mut cmd_rx: mpsc::UnboundedReceiver<Command>,
    events: mpsc::Sender<TransportEvent>,
) {
    let ws = match tokio_tungstenite::connect_async(endpoint.as_str()).await {
        Ok((ws, _response)) => ws,
        Err(e) => {
            let reason = e.to_string();
            tracing::warn!(%endpoint, error = %reason, "connect failed");
            finish(&state, &mut cmd_rx, &events, Outcome::Failed(reason))
                .await;
            return;
        }
    };

    let (mut sink, mut stream) = ws.split();

    if !state.transition(ConnectionState::Connecting, ConnectionState::Open) {
        if let Err(e) = sink.send(Message::Close(None)).await {
            tracing::debug!(error = %e, "close frame not delivered");
        }
        finish(&state, &mut cmd_rx, &events, Outcome::Closed("closed by client".into()))
            .await;
        return;
    }
    tracing::info!(%endpoint, "connection open");
    if events.send(TransportEvent::Opened).await.is_err() {
        state.set(ConnectionState::Closed);
        return;
    }

    let outcome = loop {
        tokio::select! {
            cmd = cmd_rx.recv() => match cmd {
                Some(Command::Frame(frame)) => {
                    let size = frame.len();
                    if let Err(e) = sink.send(Message::Text(frame.into())).await {
                        break Outcome::Failed(e.to_string());
                    }
                    tracing::debug!(size, "frame sent");
                }
                // A dropped handle closes the connection the same way.
                Some(Command::Close) | None => {
                    if let Err(e) = sink.send(Message::Close(None)).await {
                        tracing::debug!(error = %e, "close frame not delivered");
                    }
                    break Outcome::Closed("closed by client".into());
                }
            },
            msg = stream.next() => match msg {
                Some(Ok(Message::Text(text))) => {
                    let frame = text.as_str().to_owned();
                    tracing::debug!(size = frame.len(), "frame received");
                    if events.send(TransportEvent::MessageReceived(frame)).await.is_err() {
                        break Outcome::Closed("event receiver dropped".into());
                    }
                }
                Some(Ok(Message::Binary(data))) => match String::from_utf8(data.to_vec()) {
                    Ok(frame) => {
                        if events.send(TransportEvent::MessageReceived(frame)).await.is_err() {
                            break Outcome::Closed("event receiver dropped".into());
                        }
                    }
                    Err(_) => {
                        tracing::warn!(size = data.len(), "dropping non-UTF-8 binary frame");
                    }
                },
                Some(Ok(Message::Close(frame))) => {
                    let reason = frame
                        .map(|f| f.reason.as_str().to_owned())
                        .filter(|r| !r.is_empty())
                        .unwrap_or_else(|| "closed by server".into());
                    break Outcome::Closed(reason);
                }
                // ping/pong are answered by tungstenite
                Some(Ok(_)) => {}
                Some(Err(e)) => break Outcome::Failed(e.to_string()),
                None => break Outcome::Closed("connection dropped".into()),
            },
        }
    };

    finish(&state, &mut cmd_rx, &events, outcome).await;
}

/// Moves to `Closed`, drops whatever is still queued, and emits the final
/// events.
async fn finish(
    state: &StateCell,
    cmd_rx: &mut mpsc::UnboundedReceiver<Command>,
    events: &mpsc::Sender<TransportEvent>,
    outcome: Outcome,
) {
    state.set(ConnectionState::Closed);

    cmd_rx.close();
    let mut dropped = 0usize;
    while let Ok(cmd) = cmd_rx.try_recv() {
        if let Command::Frame(_) = cmd {
            dropped += 1;
        }
    }
    if dropped > 0 {
        tracing::warn!(dropped, "connection closed with frames still queued");
    }

    let reason = match outcome {
        Outcome::Closed(reason) => reason,
        Outcome::Failed(reason) => {
            let _ = events.send(TransportEvent::Errored(reason.clone())).await;
            reason
        }
    };
    tracing::info!(%reason, "connection closed");
    let _ = events.send(TransportEvent::Closed(reason)).await;
}
