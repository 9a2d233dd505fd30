//! `ChatClient` builder and client loop.
//!
//! This is the entry point for running a Parlor client. It ties the layers
//! together: transport → protocol → session, with the room directory on
//! the side, all driven from one task.

use std::time::Duration;

use parlor_protocol::JsonCodec;
use parlor_room::{HttpRoomDirectory, RoomDirectory};
use parlor_transport::{TransportEvent, WebSocketTransport};
use tokio::sync::mpsc;

use crate::{ClientConfig, ClientError, Dispatcher, RenderSink};

/// Something the user asked for, delivered by the input source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserAction {
    /// Post this text to the current room.
    SubmitMessage(String),
    /// Create or join the room with this name.
    SubmitRoomName(String),
    /// Show the rooms the server knows about.
    ListRooms,
    /// Close the connection and stop.
    Quit,
}

/// Builder for configuring a [`ChatClient`].
///
/// # Example
///
/// ```rust,ignore
/// use parlor::prelude::*;
///
/// let client = ChatClientBuilder::new()
///     .ws_url("ws://127.0.0.1:8000/api/v1/realtime/ws")
///     .build(my_sink)?;
/// client.run(actions).await
/// ```
#[derive(Debug, Clone, Default)]
pub struct ChatClientBuilder {
    config: ClientConfig,
}

impl ChatClientBuilder {
    /// Creates a builder with [`ClientConfig::default`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the whole configuration.
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the WebSocket endpoint.
    pub fn ws_url(mut self, url: &str) -> Self {
        self.config.ws_url = url.to_string();
        self
    }

    /// Sets the room API base URL.
    pub fn api_url(mut self, url: &str) -> Self {
        self.config.api_url = url.to_string();
        self
    }

    /// Sets the timeout of each room directory request.
    pub fn http_timeout(mut self, timeout: Duration) -> Self {
        self.config.http_timeout = timeout;
        self
    }

    /// Sets how many transport events may queue up.
    pub fn event_capacity(mut self, capacity: usize) -> Self {
        self.config.event_capacity = capacity;
        self
    }

    /// Builds a client that talks to the room directory over HTTP.
    ///
    /// # Errors
    /// Returns [`ClientError::Directory`] if the API base URL is invalid.
    pub fn build<R: RenderSink>(
        self,
        sink: R,
    ) -> Result<ChatClient<R, HttpRoomDirectory>, ClientError> {
        let directory = HttpRoomDirectory::new(&self.config.api_url, self.config.http_timeout)?;
        Ok(self.build_with_directory(sink, directory))
    }

    /// Builds a client around any room directory.
    pub fn build_with_directory<R, D>(self, sink: R, directory: D) -> ChatClient<R, D>
    where
        R: RenderSink,
        D: RoomDirectory,
    {
        ChatClient {
            config: self.config,
            sink,
            directory,
        }
    }
}

/// A configured chat client, ready to connect.
///
/// Call [`run()`](Self::run) to connect and process events until the
/// connection closes.
pub struct ChatClient<R: RenderSink, D: RoomDirectory> {
    config: ClientConfig,
    sink: R,
    directory: D,
}

impl<R, D> ChatClient<R, D>
where
    R: RenderSink,
    D: RoomDirectory,
{
    /// The configuration the client was built with.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Connects and runs the client loop.
    ///
    /// Transport events and user actions are handled one at a time, in the
    /// order they are picked up. A room join is awaited in place, so no
    /// other event is handled while it is in flight. Errors from either
    /// side are shown through the sink and the loop carries on.
    ///
    /// After [`UserAction::Quit`] (or when the action channel closes) the
    /// loop stops reading actions and waits for the connection to close.
    /// It returns once the transport reports `Closed`.
    ///
    /// # Errors
    /// Returns an error only if the transport could not be started.
    pub async fn run(self, mut actions: mpsc::Receiver<UserAction>) -> Result<(), ClientError> {
        let ChatClient {
            config,
            sink,
            directory,
        } = self;

        let mut transport = WebSocketTransport::with_event_capacity(config.event_capacity);
        let mut events = transport.connect(&config.ws_url)?;
        let mut dispatcher = Dispatcher::new(transport, JsonCodec, sink);
        let mut quitting = false;

        tracing::info!(ws_url = %config.ws_url, api_url = %config.api_url, "chat client running");

        loop {
            tokio::select! {
                event = events.recv() => {
                    let Some(event) = event else {
                        tracing::debug!("event channel closed");
                        break;
                    };
                    let closed = matches!(event, TransportEvent::Closed(_));
                    if let Err(e) = dispatcher.handle_event(event) {
                        dispatcher.report(&e);
                    }
                    if closed {
                        break;
                    }
                }
                action = actions.recv(), if !quitting => {
                    match action {
                        Some(UserAction::SubmitMessage(text)) => {
                            if let Err(e) = dispatcher.send_message(&text) {
                                dispatcher.report(&e);
                            }
                        }
                        Some(UserAction::SubmitRoomName(name)) => {
                            if let Err(e) = dispatcher.join_room(&directory, &name).await {
                                dispatcher.report(&e);
                            }
                        }
                        Some(UserAction::ListRooms) => {
                            if let Err(e) = dispatcher.list_rooms(&directory).await {
                                dispatcher.report(&e);
                            }
                        }
                        Some(UserAction::Quit) | None => {
                            tracing::info!("closing connection");
                            quitting = true;
                            if let Err(e) = dispatcher.close() {
                                tracing::debug!(error = %e, "close request failed");
                            }
                        }
                    }
                }
            }
        }

        tracing::info!("chat client stopped");
        Ok(())
    }
}
