//! Error types for the protocol layer.
//!
//! Decoding distinguishes two failures: text that is not an envelope at
//! all, and an envelope whose tag is known but whose payload is missing
//! fields that tag requires. The dispatcher treats both the same way (log
//! and drop the frame), but the logs are far more useful when they say
//! which one happened.

/// Errors that can occur while encoding or decoding envelopes.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed.
    #[error("encode failed: {0}")]
    Encode(#[source] serde_json::Error),

    /// The frame is not a JSON object with a string `type`.
    #[error("malformed envelope: {0}")]
    MalformedEnvelope(#[source] serde_json::Error),

    /// The tag is known but the payload does not have the required shape.
    #[error("unexpected payload shape for {kind}: {source}")]
    UnknownShape {
        /// The envelope's `type` tag.
        kind: String,
        /// What serde found wrong with the payload.
        #[source]
        source: serde_json::Error,
    },
}
