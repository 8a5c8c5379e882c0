//! Error types for chatstate.
//!
//! The reducer itself never fails on event content: malformed or
//! unresolvable events are logged and dropped. The types here cover the
//! surfaces that are genuinely fallible: patch application, snapshot
//! decoding, wire decoding, outbound intents and configuration.

use thiserror::Error;

/// The main error type for chatstate operations.
#[derive(Error, Debug)]
pub enum ChatStateError {
    /// A JSON patch operation could not be applied. Nothing was committed.
    #[error("Patch operation {index} failed: {source}")]
    Patch {
        /// Zero-based position of the failing operation in the delta.
        index: usize,
        /// Why it failed.
        #[source]
        source: PatchError,
    },

    /// A snapshot (or a patched snapshot) does not have the snapshot shape.
    #[error("Invalid snapshot: {0}")]
    InvalidSnapshot(String),

    /// A known event type carried a payload that could not be decoded.
    #[error("Malformed {event_type} payload: {message}")]
    MalformedEvent {
        /// Wire event type name.
        event_type: String,
        /// Decoder message.
        message: String,
    },

    /// An outbound intent was rejected before dispatch.
    #[error("Invalid intent: {0}")]
    InvalidIntent(String),

    /// The transport failed to deliver an intent.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl ChatStateError {
    /// Create a malformed-event error.
    pub fn malformed(event_type: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self::MalformedEvent {
            event_type: event_type.into(),
            message: message.to_string(),
        }
    }

    /// Create a transport error from any displayable error.
    pub fn transport<E: std::fmt::Display>(err: E) -> Self {
        Self::Transport(err.to_string())
    }
}

/// Result type alias using ChatStateError.
pub type Result<T> = std::result::Result<T, ChatStateError>;

/// Why a single JSON patch operation failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PatchError {
    /// The path is not a valid JSON pointer.
    #[error("invalid JSON pointer `{0}`")]
    InvalidPointer(String),

    /// The path (or its parent) does not resolve.
    #[error("path `{0}` does not exist")]
    PathNotFound(String),

    /// An array index is not a number or lies past the end.
    #[error("array index out of bounds at `{0}`")]
    IndexOutOfBounds(String),

    /// The target's parent is a scalar.
    #[error("cannot index into a scalar at `{0}`")]
    NotAContainer(String),

    /// A `move` whose source is a prefix of its destination.
    #[error("cannot move `{from}` into its own child `{path}`")]
    MoveIntoChild {
        /// Source pointer.
        from: String,
        /// Destination pointer.
        path: String,
    },

    /// A `test` operation did not match.
    #[error("test failed at `{0}`")]
    TestFailed(String),
}
