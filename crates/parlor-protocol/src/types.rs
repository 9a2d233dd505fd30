//! Protocol types for Parlor's wire format.
//!
//! Every frame on the connection is one JSON object with a `type` tag and a
//! `payload` whose shape depends on the tag:
//!
//! ```text
//! { "type": "welcome",      "payload": { "id": "<client id>" } }
//! { "type": "chat_message", "payload": { "room_id": "<room id>", "message": "<text>" } }
//! ```
//!
//! The types here are the typed view of those frames. How they become text
//! is the codec's business (see [`crate::Codec`]).

use serde::{Deserialize, Serialize};
use serde_json::Value;

use std::fmt;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// Server-assigned identity of one connection.
///
/// Opaque to the client: the server happens to hand out UUIDs, but nothing
/// here parses or compares them beyond equality. `#[serde(transparent)]`
/// keeps it a plain JSON string on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientId(String);

impl ClientId {
    /// Wraps a raw identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as sent on the wire.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of a chat room, as issued by the room directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(String);

impl RoomId {
    /// Wraps a raw identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as sent on the wire.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Payloads
// ---------------------------------------------------------------------------

/// Payload of `welcome`: the server telling a fresh connection who it is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Welcome {
    /// The identity assigned to this connection.
    pub id: ClientId,
}

/// Payload of `chat_message`, in either direction.
///
/// Outbound messages always carry the room they are posted to. Inbound
/// messages are only required to carry the text; when the server echoes
/// the room it is kept, otherwise `room_id` is `None` and omitted from the
/// encoded form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Room the message belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room_id: Option<RoomId>,
    /// The chat text.
    pub message: String,
}

/// A frame whose `type` this client does not know.
///
/// Only the codec can build one, and only for tags that are not known, so
/// an `Unrecognized` envelope always encodes back to an `Unrecognized`
/// envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct UnrecognizedFrame {
    kind: String,
    payload: Value,
}

impl UnrecognizedFrame {
    pub(crate) fn new(kind: String, payload: Value) -> Self {
        Self { kind, payload }
    }

    /// The unknown `type` tag.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// The payload exactly as received (`null` if it was absent).
    pub fn payload(&self) -> &Value {
        &self.payload
    }
}

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

/// Wire tag of [`Envelope::Welcome`].
pub const WELCOME: &str = "welcome";
/// Wire tag of [`Envelope::ChatMessage`].
pub const CHAT_MESSAGE: &str = "chat_message";

/// One decoded frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Envelope {
    /// Server → client, once per connection.
    Welcome(Welcome),
    /// A chat message to or from a room.
    ChatMessage(ChatMessage),
    /// Any other tag. Carried so the dispatcher can skip it.
    Unrecognized(UnrecognizedFrame),
}

impl Envelope {
    /// Builds a `welcome` envelope.
    pub fn welcome(id: ClientId) -> Self {
        Self::Welcome(Welcome { id })
    }

    /// Builds the outbound form of `chat_message`, scoped to a room.
    pub fn outbound_chat(room_id: RoomId, message: impl Into<String>) -> Self {
        Self::ChatMessage(ChatMessage {
            room_id: Some(room_id),
            message: message.into(),
        })
    }

    /// Builds the inbound form of `chat_message`, text only.
    pub fn inbound_chat(message: impl Into<String>) -> Self {
        Self::ChatMessage(ChatMessage {
            room_id: None,
            message: message.into(),
        })
    }

    /// The wire `type` tag of this envelope.
    pub fn kind(&self) -> &str {
        match self {
            Self::Welcome(_) => WELCOME,
            Self::ChatMessage(_) => CHAT_MESSAGE,
            Self::Unrecognized(frame) => frame.kind(),
        }
    }
}

// =========================================================================
// Tests
// =========================================================================
