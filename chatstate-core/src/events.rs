//! The canonical store event.
//!
//! Every wire format (AG-UI, the legacy normalized set) is translated into
//! [`StoreEvent`] before reduction, so the reducer has exactly one input
//! vocabulary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::identifier::{
    AttachmentId, ClientMessageId, ConversationId, MessageId, ToolCallId,
};
use crate::model::{Attachment, Conversation, Message, MessageStatus, Role, ToolCall};
use crate::patch::PatchOperation;
use crate::snapshot::Snapshot;
use crate::usage::Usage;

/// A message as carried by a messages snapshot: no owning conversation
/// (the snapshot names it once) and possibly no timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageRecord {
    /// Message identifier.
    pub id: MessageId,
    /// Author role.
    pub role: Role,
    /// Text content.
    #[serde(default)]
    pub content: String,
    /// Finalized tool calls.
    #[serde(default)]
    pub tool_calls: Vec<ToolCall>,
    /// Back-reference for `tool` messages.
    #[serde(default)]
    pub tool_call_id: Option<ToolCallId>,
    /// Creation timestamp, if the source had one.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl MessageRecord {
    /// Materialize as a completed message owned by `conversation_id`.
    #[must_use]
    pub fn into_message(self, conversation_id: ConversationId, now: DateTime<Utc>) -> Message {
        let mut message = Message::new(
            self.id,
            conversation_id,
            self.role,
            MessageStatus::Completed,
            self.created_at.unwrap_or(now),
        );
        message.content = self.content;
        message.tool_calls = self.tool_calls;
        message.tool_call_id = self.tool_call_id;
        message
    }
}

/// One reducible event.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreEvent {
    /// A conversation was created.
    ConversationCreated(Conversation),
    /// A conversation record changed.
    ConversationUpdated(Conversation),
    /// A conversation was archived.
    ConversationArchived {
        /// Target conversation.
        conversation_id: ConversationId,
    },
    /// An agent run started in a conversation.
    RunStarted {
        /// Conversation (AG-UI thread) of the run.
        conversation_id: ConversationId,
        /// Run identifier.
        run_id: String,
    },
    /// An agent run finished; open messages and tool calls are settled.
    RunFinished {
        /// Conversation of the run.
        conversation_id: ConversationId,
        /// Run identifier.
        run_id: String,
    },
    /// An agent run failed; in-flight messages are errored.
    RunErrored {
        /// Conversation of the run, when the wire says.
        conversation_id: Option<ConversationId>,
        /// Error text.
        error: String,
    },
    /// A streamed message started.
    MessageStarted {
        /// New message.
        message_id: MessageId,
        /// Owning conversation, when the wire says.
        conversation_id: Option<ConversationId>,
        /// Author role.
        role: Role,
        /// Idempotency identifier echoed back by the backend.
        client_message_id: Option<ClientMessageId>,
        /// Event timestamp.
        created_at: Option<DateTime<Utc>>,
    },
    /// A text fragment for a streaming message.
    MessageContent {
        /// Target message.
        message_id: MessageId,
        /// Fragment to append.
        delta: String,
    },
    /// A fragment of a message streamed without start or end events.
    ///
    /// The first chunk for an id opens the message; a chunk for another id
    /// or the end of the run closes it.
    MessageChunk {
        /// Target message.
        message_id: MessageId,
        /// Author role used if the chunk opens the message.
        role: Role,
        /// Fragment to append, possibly empty.
        delta: String,
        /// Event timestamp.
        created_at: Option<DateTime<Utc>>,
    },
    /// A streamed message finished.
    MessageEnded {
        /// Target message.
        message_id: MessageId,
        /// Final usage, when reported.
        usage: Option<Usage>,
    },
    /// A complete message record (insert or replace).
    MessageUpserted(Message),
    /// A message failed.
    MessageErrored {
        /// Target message.
        message_id: MessageId,
        /// Error text.
        error: String,
    },
    /// A message was canceled.
    MessageCanceled {
        /// Target message.
        message_id: MessageId,
    },
    /// The complete message list of one conversation.
    MessagesSnapshot {
        /// Conversation, when the wire says.
        conversation_id: Option<ConversationId>,
        /// Messages in display order.
        messages: Vec<MessageRecord>,
    },
    /// A tool call started.
    ToolCallStarted {
        /// Tool call identifier.
        tool_call_id: ToolCallId,
        /// Tool name.
        tool_call_name: String,
        /// Owning message, when the wire says.
        parent_message_id: Option<MessageId>,
        /// Conversation, when the wire says.
        conversation_id: Option<ConversationId>,
    },
    /// A fragment of tool call arguments.
    ToolCallArgs {
        /// Tool call identifier.
        tool_call_id: ToolCallId,
        /// JSON fragment.
        delta: String,
    },
    /// A fragment of a tool call streamed without start or end events.
    ToolCallChunk {
        /// Tool call identifier.
        tool_call_id: ToolCallId,
        /// Tool name, present on the chunk that opens the call.
        tool_call_name: Option<String>,
        /// Owning message, when the wire says.
        parent_message_id: Option<MessageId>,
        /// JSON fragment, possibly empty.
        delta: String,
    },
    /// Tool call arguments are complete.
    ToolCallEnded {
        /// Tool call identifier.
        tool_call_id: ToolCallId,
    },
    /// A tool produced its result.
    ToolCallResult {
        /// The `tool` message carrying the result.
        message_id: MessageId,
        /// Originating tool call.
        tool_call_id: ToolCallId,
        /// Result content.
        content: String,
        /// Conversation, when the wire says.
        conversation_id: Option<ConversationId>,
        /// Event timestamp.
        created_at: Option<DateTime<Utc>>,
    },
    /// Full state replacement.
    StateSnapshot(Snapshot),
    /// Patch against the flattened state.
    StateDelta(Vec<PatchOperation>),
    /// An attachment record changed availability.
    AttachmentUpdated(Attachment),
    /// Attachment processing failed.
    AttachmentFailed {
        /// Target attachment.
        attachment_id: AttachmentId,
        /// Failure reason.
        error: String,
    },
}

impl StoreEvent {
    /// Stable name for logging.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ConversationCreated(_) => "conversation_created",
            Self::ConversationUpdated(_) => "conversation_updated",
            Self::ConversationArchived { .. } => "conversation_archived",
            Self::RunStarted { .. } => "run_started",
            Self::RunFinished { .. } => "run_finished",
            Self::RunErrored { .. } => "run_errored",
            Self::MessageStarted { .. } => "message_started",
            Self::MessageContent { .. } => "message_content",
            Self::MessageChunk { .. } => "message_chunk",
            Self::MessageEnded { .. } => "message_ended",
            Self::MessageUpserted(_) => "message_upserted",
            Self::MessageErrored { .. } => "message_errored",
            Self::MessageCanceled { .. } => "message_canceled",
            Self::MessagesSnapshot { .. } => "messages_snapshot",
            Self::ToolCallStarted { .. } => "tool_call_started",
            Self::ToolCallArgs { .. } => "tool_call_args",
            Self::ToolCallChunk { .. } => "tool_call_chunk",
            Self::ToolCallEnded { .. } => "tool_call_ended",
            Self::ToolCallResult { .. } => "tool_call_result",
            Self::StateSnapshot(_) => "state_snapshot",
            Self::StateDelta(_) => "state_delta",
            Self::AttachmentUpdated(_) => "attachment_updated",
            Self::AttachmentFailed { .. } => "attachment_failed",
        }
    }

    /// Shorthand for a message start with no explicit conversation.
    pub fn message_started(message_id: impl Into<MessageId>, role: Role) -> Self {
        Self::MessageStarted {
            message_id: message_id.into(),
            conversation_id: None,
            role,
            client_message_id: None,
            created_at: None,
        }
    }

    /// Shorthand for a content fragment.
    pub fn message_content(message_id: impl Into<MessageId>, delta: impl Into<String>) -> Self {
        Self::MessageContent {
            message_id: message_id.into(),
            delta: delta.into(),
        }
    }

    /// Shorthand for a message end without usage.
    pub fn message_ended(message_id: impl Into<MessageId>) -> Self {
        Self::MessageEnded {
            message_id: message_id.into(),
            usage: None,
        }
    }

    /// Shorthand for a tool call start.
    pub fn tool_call_started(
        tool_call_id: impl Into<ToolCallId>,
        tool_call_name: impl Into<String>,
        parent_message_id: Option<MessageId>,
    ) -> Self {
        Self::ToolCallStarted {
            tool_call_id: tool_call_id.into(),
            tool_call_name: tool_call_name.into(),
            parent_message_id,
            conversation_id: None,
        }
    }

    /// Shorthand for a tool call arguments fragment.
    pub fn tool_call_args(tool_call_id: impl Into<ToolCallId>, delta: impl Into<String>) -> Self {
        Self::ToolCallArgs {
            tool_call_id: tool_call_id.into(),
            delta: delta.into(),
        }
    }

    /// Shorthand for a tool call end.
    pub fn tool_call_ended(tool_call_id: impl Into<ToolCallId>) -> Self {
        Self::ToolCallEnded {
            tool_call_id: tool_call_id.into(),
        }
    }
}
