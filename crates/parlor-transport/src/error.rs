/// Errors that can occur in the transport layer.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// A frame was offered while the connection was not open.
    #[error("not connected (connection is {0})")]
    NotConnected(crate::ConnectionState),

    /// `connect` was called on a transport that already left `Idle`.
    #[error("transport already started")]
    AlreadyStarted,

    /// The background connection task is gone.
    #[error("connection task stopped")]
    Shutdown,
}
