//! The entity store.
//!
//! Flat keyed maps of conversations, messages and attachments plus the
//! conversation → message index, together with the ephemeral streaming
//! state (text buffers and in-progress tool calls) that never appears in a
//! snapshot.

use std::collections::HashMap;

use chatstate_core::{
    Attachment, AttachmentId, Conversation, ConversationId, Message, MessageId, ToolCallId,
};
use chatstate_streaming::{StreamingBuffers, ToolCallCorrelator};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde_json::{Map, Value};

/// Everything the reducer owns.
///
/// Entity maps keep insertion order so a snapshot taken from the store
/// lists records in the order they arrived (or the order of the snapshot
/// they were loaded from), which array-index patch paths depend on.
#[derive(Debug, Clone, Default)]
pub struct ChatState {
    pub(crate) conversations: IndexMap<ConversationId, Conversation>,
    pub(crate) messages: IndexMap<MessageId, Message>,
    pub(crate) attachments: IndexMap<AttachmentId, Attachment>,
    pub(crate) index: HashMap<ConversationId, Vec<MessageId>>,
    pub(crate) buffers: StreamingBuffers,
    pub(crate) tool_calls: ToolCallCorrelator,
    pub(crate) tool_call_owners: HashMap<ToolCallId, MessageId>,
    /// Message opened by chunk events and not yet closed.
    pub(crate) chunked_message: Option<MessageId>,
    /// Tool call opened by chunk events and not yet closed.
    pub(crate) chunked_tool_call: Option<ToolCallId>,
    pub(crate) revision: u64,
    pub(crate) metadata: Map<String, Value>,
}

impl ChatState {
    /// Create an empty store at revision 0.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store revision. Incremented by every effective change.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Session metadata carried by snapshots.
    #[must_use]
    pub fn metadata(&self) -> &Map<String, Value> {
        &self.metadata
    }

    /// Number of conversations.
    #[must_use]
    pub fn conversation_count(&self) -> usize {
        self.conversations.len()
    }

    /// Number of messages across all conversations.
    #[must_use]
    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    /// Message ids of a conversation in arrival order.
    #[must_use]
    pub fn message_ids(&self, conversation_id: &ConversationId) -> &[MessageId] {
        self.index.get(conversation_id).map_or(&[], Vec::as_slice)
    }

    /// Message a finalized tool call is attached to.
    #[must_use]
    pub fn tool_call_owner(&self, tool_call_id: &ToolCallId) -> Option<&MessageId> {
        self.tool_call_owners.get(tool_call_id)
    }

    /// Ephemeral text buffers.
    #[must_use]
    pub fn buffers(&self) -> &StreamingBuffers {
        &self.buffers
    }

    /// Ephemeral in-progress tool calls.
    #[must_use]
    pub fn tool_calls_in_progress(&self) -> &ToolCallCorrelator {
        &self.tool_calls
    }

    /// Create the conversation if it is unknown. Returns `true` if created.
    pub(crate) fn ensure_conversation(
        &mut self,
        conversation_id: &ConversationId,
        title: &str,
        now: DateTime<Utc>,
    ) -> bool {
        if self.conversations.contains_key(conversation_id) {
            return false;
        }
        self.conversations.insert(
            conversation_id.clone(),
            Conversation::new(conversation_id.clone(), title, now),
        );
        self.index.entry(conversation_id.clone()).or_default();
        true
    }

    /// Append a message id to its conversation's index unless present.
    pub(crate) fn index_message(&mut self, conversation_id: &ConversationId, message_id: &MessageId) {
        let ids = self.index.entry(conversation_id.clone()).or_default();
        if !ids.contains(message_id) {
            ids.push(message_id.clone());
        }
    }

    /// Insert or replace a message and index it.
    ///
    /// A message that moved to another conversation is removed from the old
    /// conversation's index.
    pub(crate) fn put_message(&mut self, message: Message) {
        if let Some(previous) = self.messages.get(&message.id) {
            if previous.conversation_id != message.conversation_id {
                if let Some(ids) = self.index.get_mut(&previous.conversation_id) {
                    ids.retain(|id| id != &message.id);
                }
            }
        }
        self.index_message(&message.conversation_id, &message.id);
        for call in &message.tool_calls {
            self.tool_call_owners.insert(call.id.clone(), message.id.clone());
        }
        self.messages.insert(message.id.clone(), message);
    }

    /// Remove a message with everything keyed by it.
    pub(crate) fn remove_message(&mut self, message_id: &MessageId) -> Option<Message> {
        let message = self.messages.shift_remove(message_id)?;
        if let Some(ids) = self.index.get_mut(&message.conversation_id) {
            ids.retain(|id| id != message_id);
        }
        self.buffers.take(message_id);
        self.tool_calls.retain(|r| &r.owner != message_id);
        self.tool_call_owners.retain(|_, owner| owner != message_id);
        if self.chunked_message.as_ref() == Some(message_id) {
            self.chunked_message = None;
        }
        if let Some(open) = &self.chunked_tool_call {
            if !self.tool_calls.contains(open) {
                self.chunked_tool_call = None;
            }
        }
        Some(message)
    }

    /// Last assistant message of a conversation, in index order.
    pub(crate) fn last_assistant_message(&self, conversation_id: &ConversationId) -> Option<&MessageId> {
        self.message_ids(conversation_id).iter().rev().find(|id| {
            self.messages
                .get(*id)
                .is_some_and(|m| m.role == chatstate_core::Role::Assistant)
        })
    }

    pub(crate) fn bump(&mut self) {
        self.revision = self.revision.saturating_add(1);
    }
}
