//! Room directory client for Parlor.
//!
//! Resolves a human-entered room name to a [`RoomId`](parlor_protocol::RoomId),
//! creating the room if it does not exist, and declares membership.
//!
//! # Key types
//!
//! - [`RoomDirectory`]: the request/response contract with the server
//! - [`HttpRoomDirectory`]: that contract over HTTP
//! - [`resolve_room`]: the sequential create → lookup → join flow
//! - [`RoomError`] / [`DirectoryError`]: what can go wrong, and where

mod directory;
mod error;
mod http;
mod resolve;

pub use directory::{CreateOutcome, RoomDirectory, RoomSummary};
pub use error::{ApiError, DirectoryError, RoomError, Stage};
pub use http::HttpRoomDirectory;
pub use resolve::{resolve_room, validate_room_name};
