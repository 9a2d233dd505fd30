//! # Parlor
//!
//! Realtime chat client core.
//!
//! Parlor holds one connection to a chat server, keeps track of who the
//! server says this client is and which room it is posting to, and turns
//! typed room names into joined rooms. Presentation stays outside: the
//! application supplies a [`RenderSink`] and feeds [`UserAction`]s in.
//!
//! ```text
//!   input source ──UserAction──→ ChatClient ──→ Dispatcher ──→ RenderSink
//!                                                 │    ↑
//!                               WebSocketTransport┘    └ TransportEvent
//!                               HttpRoomDirectory (create / lookup / join)
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use parlor::prelude::*;
//!
//! struct Stdout;
//!
//! impl RenderSink for Stdout {
//!     fn display_message(&mut self, text: &str, is_self: bool) {
//!         println!("{}{text}", if is_self { "> " } else { "" });
//!     }
//!
//!     fn display_client_id(&mut self, id: &ClientId) {
//!         println!("connected as {id}");
//!     }
//! }
//!
//! # async fn start() -> Result<(), ClientError> {
//! let (actions, rx) = tokio::sync::mpsc::channel(16);
//! let client = ChatClientBuilder::new().config(ClientConfig::from_env()?).build(Stdout)?;
//! actions.send(UserAction::SubmitRoomName("lobby".into())).await.ok();
//! client.run(rx).await
//! # }
//! ```

mod client;
mod config;
mod dispatcher;
mod error;
mod sink;

pub use client::{ChatClient, ChatClientBuilder, UserAction};
pub use config::{
    ClientConfig, DEFAULT_API_URL, DEFAULT_WS_URL, ENV_API_URL, ENV_HTTP_TIMEOUT_SECS,
    ENV_WS_URL,
};
pub use dispatcher::Dispatcher;
pub use error::ClientError;
pub use sink::RenderSink;

/// Common imports for Parlor applications.
///
/// ```rust
/// use parlor::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        ChatClient, ChatClientBuilder, ClientConfig, ClientError, Dispatcher, RenderSink,
        UserAction,
    };
    pub use parlor_protocol::{ClientId, Codec, Envelope, JsonCodec, RoomId};
    pub use parlor_room::{
        CreateOutcome, DirectoryError, HttpRoomDirectory, RoomDirectory, RoomError, RoomSummary,
    };
    pub use parlor_session::{Session, SessionError};
    pub use parlor_transport::{ConnectionState, Transport, TransportEvent, WebSocketTransport};
}
