//! Client session state for Parlor.
//!
//! A [`Session`] is the client's own record of:
//!
//! 1. **Identity**: the [`ClientId`](parlor_protocol::ClientId) the server
//!    assigned in its `welcome`
//! 2. **Membership**: the [`RoomId`](parlor_protocol::RoomId) outbound
//!    messages are posted to
//!
//! # How it fits in the stack
//!
//! ```text
//! Dispatcher (above)  ← sole owner and writer of the Session
//!     ↕
//! Session Layer (this crate)  ← identity + room, guarded transitions
//!     ↕
//! Protocol Layer (below)  ← provides ClientId, RoomId
//! ```

mod error;
mod session;

pub use error::{Missing, SessionError};
pub use session::{Ready, Session};
