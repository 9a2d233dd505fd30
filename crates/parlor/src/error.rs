//! Unified error type for the Parlor client.

use parlor_protocol::ProtocolError;
use parlor_room::{DirectoryError, RoomError};
use parlor_session::SessionError;
use parlor_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// When using the `parlor` crate you deal with this single error type
/// instead of importing errors from each sub-crate. The `#[from]`
/// attribute on each variant generates the `From` impls, so `?` converts
/// sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// A transport-level error (not connected, already started).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, malformed or unknown envelope).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A session-level error (identity reassigned, not ready).
    #[error(transparent)]
    Session(#[from] SessionError),

    /// A room-level error (invalid name, resolution failed).
    #[error(transparent)]
    Room(#[from] RoomError),

    /// A single room directory request failed outside the join flow.
    #[error(transparent)]
    Directory(#[from] DirectoryError),

    /// A configuration value could not be used.
    #[error("invalid configuration: {0}")]
    Config(String),
}
