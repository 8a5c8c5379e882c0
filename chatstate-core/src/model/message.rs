//! Message records.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::tool_call::ToolCall;
use crate::identifier::{AttachmentId, ClientMessageId, ConversationId, MessageId, ToolCallId};
use crate::usage::Usage;

/// Role of the message author.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// End user.
    User,
    /// The agent.
    #[default]
    Assistant,
    /// Tool result.
    Tool,
    /// System prompt.
    System,
    /// Developer instructions.
    Developer,
}

impl Role {
    /// Wire name of the role.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::Tool => "tool",
            Self::System => "system",
            Self::Developer => "developer",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "assistant" => Ok(Self::Assistant),
            "tool" => Ok(Self::Tool),
            "system" => Ok(Self::System),
            "developer" => Ok(Self::Developer),
            other => Err(format!("unknown role `{other}`")),
        }
    }
}

/// Lifecycle status of a message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageStatus {
    /// Text is still arriving.
    Streaming,
    /// Finalized normally.
    #[default]
    Completed,
    /// Finalized by a failure.
    Errored,
    /// Finalized by a cancellation.
    Canceled,
}

impl MessageStatus {
    /// Terminal statuses are immutable apart from sanctioned corrections.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Streaming)
    }
}

/// A structured content part.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    /// Plain text.
    Text {
        /// The text.
        text: String,
    },
    /// Reference to an attachment by id.
    Attachment {
        /// Referenced attachment.
        #[serde(rename = "attachmentId")]
        attachment_id: AttachmentId,
    },
    /// Arbitrary structured data.
    Data {
        /// The payload.
        data: Value,
    },
}

/// A message in a conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Message identifier.
    pub id: MessageId,
    /// Owning conversation.
    pub conversation_id: ConversationId,
    /// Author role.
    pub role: Role,
    /// Lifecycle status.
    #[serde(default)]
    pub status: MessageStatus,
    /// Accumulated text content.
    #[serde(default)]
    pub content: String,
    /// Structured parts beyond the text content.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parts: Vec<ContentPart>,
    /// Finalized tool calls, in arrival order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
    /// For `tool` messages: the tool call this result answers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<ToolCallId>,
    /// Token usage, when reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
    /// Error text for `errored` messages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Client-supplied idempotency identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_message_id: Option<ClientMessageId>,
}

impl Message {
    /// Create an empty message.
    pub fn new(
        id: impl Into<MessageId>,
        conversation_id: impl Into<ConversationId>,
        role: Role,
        status: MessageStatus,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            conversation_id: conversation_id.into(),
            role,
            status,
            content: String::new(),
            parts: Vec::new(),
            tool_calls: Vec::new(),
            tool_call_id: None,
            usage: None,
            error: None,
            created_at,
            client_message_id: None,
        }
    }

    /// Set the text content.
    #[must_use]
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    /// Set the tool call back-reference.
    #[must_use]
    pub fn with_tool_call_id(mut self, id: impl Into<ToolCallId>) -> Self {
        self.tool_call_id = Some(id.into());
        self
    }

    /// Add a finalized tool call.
    #[must_use]
    pub fn with_tool_call(mut self, call: ToolCall) -> Self {
        self.tool_calls.push(call);
        self
    }

    /// Set the idempotency identifier.
    #[must_use]
    pub fn with_client_message_id(mut self, id: impl Into<ClientMessageId>) -> Self {
        self.client_message_id = Some(id.into());
        self
    }

    /// Whether the message is in a terminal status.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Whether a tool call with this id is already attached.
    #[must_use]
    pub fn has_tool_call(&self, id: &ToolCallId) -> bool {
        self.tool_calls.iter().any(|c| &c.id == id)
    }

    /// Attach a tool call unless one with the same id is present.
    ///
    /// Returns `true` if the call was attached.
    pub fn attach_tool_call(&mut self, call: ToolCall) -> bool {
        if self.has_tool_call(&call.id) {
            return false;
        }
        self.tool_calls.push(call);
        true
    }

    /// Ids of attachments referenced from the structured parts.
    pub fn attachment_ids(&self) -> impl Iterator<Item = &AttachmentId> {
        self.parts.iter().filter_map(|p| match p {
            ContentPart::Attachment { attachment_id } => Some(attachment_id),
            _ => None,
        })
    }
}
