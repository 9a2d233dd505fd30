//! The presentation seam.
//!
//! Parlor never draws anything itself. Everything the user should see goes
//! through a [`RenderSink`] supplied by the application: a terminal, a GUI
//! widget, or a recording double in tests.

use parlor_protocol::ClientId;
use parlor_room::RoomSummary;

/// Receives everything the client wants to show the user.
///
/// Calls arrive on the client task, in the order the underlying events
/// happened. Scrolling, formatting and colour are up to the implementor.
pub trait RenderSink: Send + 'static {
    /// Shows one chat line. `is_self` is `true` for lines this client sent.
    fn display_message(&mut self, text: &str, is_self: bool);

    /// Shows the identity the server assigned to this connection.
    fn display_client_id(&mut self, id: &ClientId);

    /// Shows a user-facing error. By default it is only logged.
    fn display_error(&mut self, message: &str) {
        tracing::warn!(message, "client error");
    }

    /// Shows the server's room listing. By default it is only logged.
    fn display_rooms(&mut self, rooms: &[RoomSummary]) {
        for room in rooms {
            tracing::info!(room_id = %room.id, name = %room.name, "room");
        }
    }
}
