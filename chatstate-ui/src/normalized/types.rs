//! Normalized event payloads.
//!
//! Coarse lifecycle events named with dotted types (`message.delta`,
//! `attachment.failed`, ...), as emitted by conversation backends that
//! predate the AG-UI event set.

use chatstate_core::{
    Attachment, AttachmentId, ChatStateError, ClientMessageId, Conversation, ConversationId,
    Message, MessageId, Result, Role, Usage,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Every type name of the normalized set.
pub const NORMALIZED_EVENT_TYPES: &[&str] = &[
    "conversation.created",
    "conversation.updated",
    "conversation.archived",
    "message.created",
    "message.started",
    "message.delta",
    "message.completed",
    "message.errored",
    "message.canceled",
    "attachment.available",
    "attachment.updated",
    "attachment.failed",
];

/// Whether `event_type` belongs to the normalized set.
#[must_use]
pub fn is_normalized_type(event_type: &str) -> bool {
    NORMALIZED_EVENT_TYPES.contains(&event_type)
}

/// Conversation record payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationPayload {
    /// The full record.
    pub conversation: Conversation,
}

/// Archive payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationRef {
    /// Target conversation.
    pub conversation_id: ConversationId,
}

/// Full message record payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessagePayload {
    /// The full record.
    pub message: Message,
}

/// Message start payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageStartedPayload {
    /// New message.
    pub message_id: MessageId,
    /// Owning conversation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<ConversationId>,
    /// Author role (assistant when absent).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    /// Idempotency identifier of the send that produced this message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_message_id: Option<ClientMessageId>,
    /// Creation timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Text fragment payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageDeltaPayload {
    /// Target message.
    pub message_id: MessageId,
    /// Fragment.
    pub delta: String,
}

/// Completion payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageCompletedPayload {
    /// Target message.
    pub message_id: MessageId,
    /// Final usage.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
}

/// Failure payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageErroredPayload {
    /// Target message.
    pub message_id: MessageId,
    /// Error text.
    #[serde(default)]
    pub error: String,
}

/// Cancel payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageRef {
    /// Target message.
    pub message_id: MessageId,
}

/// Attachment record payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentPayload {
    /// The full record.
    pub attachment: Attachment,
}

/// Attachment failure payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentFailedPayload {
    /// Target attachment.
    #[serde(alias = "id")]
    pub attachment_id: AttachmentId,
    /// Failure reason.
    #[serde(default)]
    pub error: String,
}

/// Any normalized event, tagged by its dotted `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum NormalizedEvent {
    /// `conversation.created`
    #[serde(rename = "conversation.created")]
    ConversationCreated(ConversationPayload),
    /// `conversation.updated`
    #[serde(rename = "conversation.updated")]
    ConversationUpdated(ConversationPayload),
    /// `conversation.archived`
    #[serde(rename = "conversation.archived")]
    ConversationArchived(ConversationRef),
    /// `message.created`
    #[serde(rename = "message.created")]
    MessageCreated(MessagePayload),
    /// `message.started`
    #[serde(rename = "message.started")]
    MessageStarted(MessageStartedPayload),
    /// `message.delta`
    #[serde(rename = "message.delta")]
    MessageDelta(MessageDeltaPayload),
    /// `message.completed`
    #[serde(rename = "message.completed")]
    MessageCompleted(MessageCompletedPayload),
    /// `message.errored`
    #[serde(rename = "message.errored")]
    MessageErrored(MessageErroredPayload),
    /// `message.canceled`
    #[serde(rename = "message.canceled")]
    MessageCanceled(MessageRef),
    /// `attachment.available`
    #[serde(rename = "attachment.available")]
    AttachmentAvailable(AttachmentPayload),
    /// `attachment.updated`
    #[serde(rename = "attachment.updated")]
    AttachmentUpdated(AttachmentPayload),
    /// `attachment.failed`
    #[serde(rename = "attachment.failed")]
    AttachmentFailed(AttachmentFailedPayload),
}

impl NormalizedEvent {
    /// Decode a `(type, payload)` pair. `Ok(None)` for a type outside the
    /// normalized set.
    pub fn decode(event_type: &str, payload: Value) -> Result<Option<Self>> {
        if !is_normalized_type(event_type) {
            return Ok(None);
        }
        let Value::Object(mut object) = payload else {
            return Err(ChatStateError::malformed(event_type, "expected an object"));
        };
        object.insert("type".to_string(), Value::String(event_type.to_string()));
        serde_json::from_value(Value::Object(object))
            .map(Some)
            .map_err(|e| ChatStateError::malformed(event_type, e))
    }
}
