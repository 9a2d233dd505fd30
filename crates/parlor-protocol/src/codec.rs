//! Codec trait and the JSON implementation.
//!
//! A codec maps between one text frame and one [`Envelope`]. The dispatcher
//! only talks to the [`Codec`] trait, so the JSON details stay here.

use serde::de::Error as _;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::{CHAT_MESSAGE, ChatMessage, UnrecognizedFrame, WELCOME, Welcome};
use crate::{Envelope, ProtocolError};

/// Converts envelopes to and from wire text.
///
/// Implementations must satisfy `decode(encode(e)) == e` for every
/// envelope a caller can construct.
pub trait Codec: Send + Sync + 'static {
    /// Serializes an envelope into one text frame.
    ///
    /// # Errors
    /// Returns [`ProtocolError::Encode`] if serialization fails.
    fn encode(&self, envelope: &Envelope) -> Result<String, ProtocolError>;

    /// Parses one text frame.
    ///
    /// Unknown `type` tags are not an error: they come back as
    /// [`Envelope::Unrecognized`].
    ///
    /// # Errors
    /// - [`ProtocolError::MalformedEnvelope`]: not a JSON object with a
    ///   string `type`
    /// - [`ProtocolError::UnknownShape`]: known tag, payload missing
    ///   required fields
    fn decode(&self, raw: &str) -> Result<Envelope, ProtocolError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// The envelope as it sits on the wire, before the payload is interpreted.
#[derive(Deserialize)]
struct RawFrame {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    payload: Value,
}

/// Serialization view of the known envelopes.
///
/// Adjacent tagging produces exactly `{"type": ..., "payload": {...}}`.
#[derive(Serialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
enum KnownRef<'a> {
    Welcome(&'a Welcome),
    ChatMessage(&'a ChatMessage),
}

#[derive(Serialize)]
struct UnrecognizedRef<'a> {
    #[serde(rename = "type")]
    kind: &'a str,
    payload: &'a Value,
}

/// A [`Codec`] that speaks the JSON envelope format (via `serde_json`).
///
/// ## Example
///
/// ```rust
/// use parlor_protocol::{Codec, Envelope, JsonCodec, RoomId};
///
/// let codec = JsonCodec;
/// let envelope = Envelope::outbound_chat(RoomId::new("r9"), "hi");
///
/// let text = codec.encode(&envelope).unwrap();
/// assert_eq!(
///     text,
///     r#"{"type":"chat_message","payload":{"room_id":"r9","message":"hi"}}"#
/// );
/// assert_eq!(codec.decode(&text).unwrap(), envelope);
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode(&self, envelope: &Envelope) -> Result<String, ProtocolError> {
        let result = match envelope {
            Envelope::Welcome(welcome) => {
                serde_json::to_string(&KnownRef::Welcome(welcome))
            }
            Envelope::ChatMessage(chat) => {
                serde_json::to_string(&KnownRef::ChatMessage(chat))
            }
            Envelope::Unrecognized(frame) => {
                serde_json::to_string(&UnrecognizedRef {
                    kind: frame.kind(),
                    payload: frame.payload(),
                })
            }
        };
        result.map_err(ProtocolError::Encode)
    }

    fn decode(&self, raw: &str) -> Result<Envelope, ProtocolError> {
        let value: Value =
            serde_json::from_str(raw).map_err(ProtocolError::MalformedEnvelope)?;
        // A derived struct also deserializes from a JSON array.
        if !value.is_object() {
            return Err(ProtocolError::MalformedEnvelope(serde_json::Error::custom(
                "envelope is not a JSON object",
            )));
        }
        let RawFrame { kind, payload } =
            serde_json::from_value(value).map_err(ProtocolError::MalformedEnvelope)?;

        if kind == WELCOME {
            serde_json::from_value::<Welcome>(payload)
                .map(Envelope::Welcome)
                .map_err(|source| ProtocolError::UnknownShape { kind, source })
        } else if kind == CHAT_MESSAGE {
            serde_json::from_value::<ChatMessage>(payload)
                .map(Envelope::ChatMessage)
                .map_err(|source| ProtocolError::UnknownShape { kind, source })
        } else {
            Ok(Envelope::Unrecognized(UnrecognizedFrame::new(kind, payload)))
        }
    }
}
