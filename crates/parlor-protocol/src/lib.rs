//! Wire protocol for Parlor.
//!
//! - **Types** ([`Envelope`], [`ClientId`], [`RoomId`], payloads): what
//!   travels on the connection.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how envelopes become text
//!   frames and back.
//! - **Errors** ([`ProtocolError`]): what can go wrong doing so.
//!
//! ```text
//! Transport (text frames) → Protocol (Envelope) → Dispatcher (session, render sink)
//! ```
//!
//! The protocol layer knows nothing about connections or rooms beyond the
//! identifiers it carries.

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{
    CHAT_MESSAGE, ChatMessage, ClientId, Envelope, RoomId, UnrecognizedFrame,
    WELCOME, Welcome,
};
