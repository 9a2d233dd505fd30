//! Create-or-join: turning a typed room name into a joined room.
//!
//! ```text
//! validate ──→ create_room ──201──→ join_room ──→ RoomId
//!                   │                   ↑
//!                   └─other──→ lookup ──┘
//! ```
//!
//! Each step starts only after the previous one resolved. A failure at any
//! step stops the flow; the caller commits the returned id only on success.

use parlor_protocol::{ClientId, RoomId};

use crate::{CreateOutcome, DirectoryError, RoomDirectory, RoomError, Stage};

/// Checks a user-entered room name and returns it trimmed.
///
/// # Errors
/// Returns [`RoomError::InvalidRoomName`] for empty or whitespace-only
/// names.
pub fn validate_room_name(name: &str) -> Result<&str, RoomError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(RoomError::InvalidRoomName);
    }
    Ok(trimmed)
}

/// Runs the create-or-join flow for `name` on behalf of `client_id`.
///
/// Exactly one `create_room` call is made. Only when it does not report
/// `Created` is the name looked up, once. `join_room` is called once with
/// whichever id was obtained.
///
/// # Errors
/// - [`RoomError::InvalidRoomName`]: before any request is made
/// - [`RoomError::ResolutionFailed`]: naming the step that failed
pub async fn resolve_room<D>(
    directory: &D,
    client_id: &ClientId,
    name: &str,
) -> Result<RoomId, RoomError>
where
    D: RoomDirectory + ?Sized,
{
    let name = validate_room_name(name)?;

    let outcome = directory
        .create_room(name)
        .await
        .map_err(failed_at(Stage::Create))?;

    let room_id = match outcome {
        CreateOutcome::Created(room_id) => {
            tracing::info!(room = name, %room_id, "room created");
            room_id
        }
        CreateOutcome::Rejected { status } => {
            tracing::info!(room = name, status, "room not created, looking it up");
            directory
                .lookup_room_by_name(name)
                .await
                .map_err(failed_at(Stage::Lookup))?
        }
    };

    directory
        .join_room(client_id, &room_id)
        .await
        .map_err(failed_at(Stage::Join))?;

    tracing::info!(room = name, %room_id, %client_id, "joined room");
    Ok(room_id)
}

fn failed_at(stage: Stage) -> impl FnOnce(DirectoryError) -> RoomError {
    move |cause| {
        tracing::warn!(%stage, error = %cause, "room resolution failed");
        RoomError::ResolutionFailed { stage, cause }
    }
}
