//! Error types for the session layer.

use parlor_protocol::ClientId;

/// Errors raised by [`Session`](crate::Session) transitions and checks.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// A second `welcome` tried to change an identity that is already set.
    /// A connection is expected to receive exactly one `welcome`.
    #[error("identity reassigned: already {current}, server sent {offered}")]
    IdentityReassigned {
        /// The identity the session keeps.
        current: ClientId,
        /// The conflicting identity from the later `welcome`.
        offered: ClientId,
    },

    /// An operation needed identity or room membership that is not there yet.
    #[error("session not ready: {0}")]
    NotReady(Missing),
}

/// What [`SessionError::NotReady`] was missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Missing {
    /// No `welcome` has been received on this connection.
    ClientId,
    /// No room has been joined.
    Room,
}

impl std::fmt::Display for Missing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ClientId => write!(f, "no client id assigned yet"),
            Self::Room => write!(f, "no room selected"),
        }
    }
}
