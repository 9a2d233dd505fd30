//! Client transport layer for Parlor.
//!
//! Owns exactly one connection to the chat server and hides its details
//! behind a small lifecycle state machine and a stream of [`TransportEvent`]s:
//!
//! ```text
//! Idle ──connect()──→ Connecting ──opened──→ Open ──closed──→ Closed
//!                         │                    │
//!                         └──errored──→ Closed ←┘ (errored)
//! ```
//!
//! There is no automatic reconnection. `Closed` is terminal; a new
//! connection needs a new transport.
//!
//! # Feature Flags
//!
//! - `websocket` (default): WebSocket transport via `tokio-tungstenite`

mod error;
#[cfg(feature = "websocket")]
mod websocket;

pub use error::TransportError;
#[cfg(feature = "websocket")]
pub use websocket::WebSocketTransport;

use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};

/// Where a transport is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionState {
    /// Created, `connect` not called yet.
    Idle,
    /// Handshake in flight.
    Connecting,
    /// Frames can be sent.
    Open,
    /// The connection is gone. Terminal.
    Closed,
}

impl ConnectionState {
    fn as_u8(self) -> u8 {
        match self {
            Self::Idle => 0,
            Self::Connecting => 1,
            Self::Open => 2,
            Self::Closed => 3,
        }
    }

    fn from_u8(raw: u8) -> Self {
        match raw {
            0 => Self::Idle,
            1 => Self::Connecting,
            2 => Self::Open,
            _ => Self::Closed,
        }
    }

    /// Returns `true` if frames may be sent in this state.
    pub fn is_open(self) -> bool {
        matches!(self, Self::Open)
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Connecting => write!(f, "connecting"),
            Self::Open => write!(f, "open"),
            Self::Closed => write!(f, "closed"),
        }
    }
}

/// Lock-free holder for a [`ConnectionState`] shared between a transport
/// handle and its background task.
#[derive(Debug)]
pub(crate) struct StateCell(AtomicU8);

impl StateCell {
    pub(crate) fn new(state: ConnectionState) -> Self {
        Self(AtomicU8::new(state.as_u8()))
    }

    pub(crate) fn get(&self) -> ConnectionState {
        ConnectionState::from_u8(self.0.load(Ordering::Acquire))
    }

    pub(crate) fn set(&self, state: ConnectionState) {
        self.0.store(state.as_u8(), Ordering::Release);
    }

    /// Moves from `from` to `to` only if the cell still holds `from`.
    /// Returns `false` if another transition got there first.
    pub(crate) fn transition(&self, from: ConnectionState, to: ConnectionState) -> bool {
        self.0
            .compare_exchange(from.as_u8(), to.as_u8(), Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}

/// Something that happened on the connection.
///
/// Events are delivered in the order they occurred. `Errored` is always
/// followed by `Closed`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// The connection is open and frames can be sent.
    Opened,
    /// The connection ended. Terminal.
    Closed(String),
    /// The connection failed, either while connecting or while open.
    Errored(String),
    /// One text frame arrived from the server.
    MessageReceived(String),
}

/// The outbound half of a connection, as seen by the dispatcher.
///
/// Inbound traffic is not part of the trait: it arrives as
/// [`TransportEvent`]s on the channel returned when connecting.
pub trait Transport: Send + 'static {
    /// Returns the current lifecycle state.
    fn state(&self) -> ConnectionState;

    /// Enqueues one text frame for transmission.
    ///
    /// # Errors
    /// Returns [`TransportError::NotConnected`] unless the state is
    /// [`ConnectionState::Open`].
    fn send(&self, frame: String) -> Result<(), TransportError>;

    /// Requests a graceful close. The state is `Closed` as soon as this
    /// returns, so later sends fail with
    /// [`TransportError::NotConnected`]. Frames sent before the close are
    /// still written.
    fn close(&self) -> Result<(), TransportError>;
}
