//! Error types for the room layer.

use std::fmt;

use serde::Deserialize;

/// Which step of the create-or-join flow failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// `POST /room`
    Create,
    /// `GET /room/by-name/{name}`
    Lookup,
    /// `POST /room/join`
    Join,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Create => write!(f, "create"),
            Self::Lookup => write!(f, "lookup"),
            Self::Join => write!(f, "join"),
        }
    }
}

/// Errors from the create-or-join flow.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// The name is empty or only whitespace. Nothing was sent.
    #[error("invalid room name: must not be blank")]
    InvalidRoomName,

    /// One step of the flow failed; nothing was committed.
    #[error("room resolution failed at {stage}: {cause}")]
    ResolutionFailed {
        /// The step that failed.
        stage: Stage,
        /// Why it failed.
        #[source]
        cause: DirectoryError,
    },
}

/// Error body returned by the directory API: `{kind, status, reason}`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ApiError {
    /// Machine-readable kind, e.g. `"not_found"`.
    pub kind: String,
    /// HTTP status the server put in the body; `0` if it left it out.
    #[serde(default)]
    pub status: u16,
    /// Human-readable explanation.
    #[serde(default)]
    pub reason: String,
}

/// Errors from a single directory request.
#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    /// The configured API base cannot have paths appended to it.
    #[error("invalid room API base URL: {0}")]
    InvalidBaseUrl(String),

    /// The request never got an HTTP answer (refused, timed out, DNS...).
    #[error("request failed: {0}")]
    Request(String),

    /// The server answered with a status the step does not accept.
    #[error("server answered {status}{}", describe(.detail))]
    Status {
        /// HTTP status code.
        status: u16,
        /// Parsed error body, when the server sent one.
        detail: Option<ApiError>,
    },

    /// The answer did not have the expected shape.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// The blocking request task did not complete.
    #[error("request task failed: {0}")]
    Worker(String),
}

fn describe(detail: &Option<ApiError>) -> String {
    match detail {
        Some(api) if api.reason.is_empty() => format!(" ({})", api.kind),
        Some(api) => format!(" ({}: {})", api.kind, api.reason),
        None => String::new(),
    }
}
