//! Streaming errors.

use chatstate_core::ToolCallId;
use thiserror::Error;

/// Lookup failures in the streaming tables.
///
/// None of these are fatal: the reducer logs them and drops the event.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StreamError {
    /// No in-progress record for this tool call (never started, or
    /// already finalized and reaped).
    #[error("Unknown tool call: {0}")]
    UnknownToolCall(ToolCallId),

    /// A start for a tool call that is already in progress.
    #[error("Tool call already in progress: {0}")]
    DuplicateToolCall(ToolCallId),
}

impl StreamError {
    /// Whether the error indicates a replayed event rather than a gap.
    #[must_use]
    pub fn is_duplicate(&self) -> bool {
        matches!(self, Self::DuplicateToolCall(_))
    }
}

/// Result type for streaming operations.
pub type StreamResult<T> = Result<T, StreamError>;
