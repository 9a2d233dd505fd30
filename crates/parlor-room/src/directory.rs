//! The room directory contract.
//!
//! The directory is a request/response API owned by the server. Parlor
//! defines the [`RoomDirectory`] trait so the create-or-join flow can run
//! against the real HTTP API ([`HttpRoomDirectory`](crate::HttpRoomDirectory))
//! or against an in-memory double in tests.

use std::future::Future;

use parlor_protocol::{ClientId, RoomId};
use serde::Deserialize;

use crate::DirectoryError;

/// What the server said to a create request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateOutcome {
    /// `201 Created`: a new room with this id.
    Created(RoomId),
    /// Any other status: the room already exists or creation was refused.
    Rejected {
        /// The HTTP status the server answered with.
        status: u16,
    },
}

/// One entry of the room listing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RoomSummary {
    /// The room's id.
    pub id: RoomId,
    /// The room's unique name.
    pub name: String,
}

/// The server-side room directory.
///
/// # Trait bounds
///
/// The returned futures are `Send` so the flow can run inside a spawned
/// Tokio task regardless of which implementation is plugged in.
pub trait RoomDirectory: Send + Sync + 'static {
    /// Asks the server to create a room called `name`.
    fn create_room(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<CreateOutcome, DirectoryError>> + Send;

    /// Resolves an existing room's name to its id.
    fn lookup_room_by_name(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<RoomId, DirectoryError>> + Send;

    /// Registers `client_id` as a member of `room_id`.
    fn join_room(
        &self,
        client_id: &ClientId,
        room_id: &RoomId,
    ) -> impl Future<Output = Result<(), DirectoryError>> + Send;

    /// Lists every room the server knows about.
    fn list_rooms(
        &self,
    ) -> impl Future<Output = Result<Vec<RoomSummary>, DirectoryError>> + Send;
}
