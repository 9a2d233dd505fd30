//! The client's local view of who it is and where it is posting.
//!
//! ```text
//!   clientId:  unset ──welcome──→ set ──disconnect──→ unset
//!   roomId:    unset ──set_room──→ set ──set_room──→ set (replaced)
//! ```
//!
//! The room is kept across a disconnect; only the identity is
//! tied to the connection.

use parlor_protocol::{ClientId, RoomId};

use crate::{Missing, SessionError};

/// Identity and room, both present. Returned by [`Session::require_ready`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ready {
    /// Identity of the current connection.
    pub client_id: ClientId,
    /// Room that outbound messages are posted to.
    pub room_id: RoomId,
}

/// Single-writer record of identity and room membership.
///
/// Fields are private: the only ways to change them are the transition
/// methods below, and the only owner is the dispatcher.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    client_id: Option<ClientId>,
    room_id: Option<RoomId>,
}

impl Session {
    /// Creates an empty session: no identity, no room.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the identity assigned by the server's `welcome`.
    ///
    /// Receiving the same id again is harmless and leaves the session as
    /// it is.
    ///
    /// # Errors
    /// Returns [`SessionError::IdentityReassigned`] if a different id is
    /// already set. The existing id is kept.
    pub fn apply_welcome(&mut self, id: ClientId) -> Result<(), SessionError> {
        match &self.client_id {
            Some(current) if *current == id => Ok(()),
            Some(current) => Err(SessionError::IdentityReassigned {
                current: current.clone(),
                offered: id,
            }),
            None => {
                tracing::info!(client_id = %id, "identity assigned");
                self.client_id = Some(id);
                Ok(())
            }
        }
    }

    /// Sets the room outbound messages go to, replacing any previous one.
    pub fn set_room(&mut self, id: RoomId) {
        if let Some(previous) = &self.room_id {
            tracing::info!(%previous, room_id = %id, "switching room");
        } else {
            tracing::info!(room_id = %id, "room selected");
        }
        self.room_id = Some(id);
    }

    /// Forgets the connection-scoped identity. The room is kept.
    pub fn reset_identity(&mut self) {
        if let Some(id) = self.client_id.take() {
            tracing::info!(client_id = %id, "identity cleared");
        }
    }

    /// Returns the identity, failing if no `welcome` arrived yet.
    ///
    /// # Errors
    /// Returns [`SessionError::NotReady`] with [`Missing::ClientId`].
    pub fn require_client_id(&self) -> Result<&ClientId, SessionError> {
        self.client_id
            .as_ref()
            .ok_or(SessionError::NotReady(Missing::ClientId))
    }

    /// Returns identity and room together, the precondition for sending a
    /// chat message.
    ///
    /// # Errors
    /// Returns [`SessionError::NotReady`] naming whichever is missing
    /// (identity is checked first).
    pub fn require_ready(&self) -> Result<Ready, SessionError> {
        let client_id = self.require_client_id()?.clone();
        let room_id = self
            .room_id
            .clone()
            .ok_or(SessionError::NotReady(Missing::Room))?;
        Ok(Ready { client_id, room_id })
    }

    /// The identity, if assigned.
    pub fn client_id(&self) -> Option<&ClientId> {
        self.client_id.as_ref()
    }

    /// The current room, if any.
    pub fn room_id(&self) -> Option<&RoomId> {
        self.room_id.as_ref()
    }
}
