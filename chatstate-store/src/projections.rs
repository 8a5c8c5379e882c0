//! Read projections.
//!
//! Derived views over the store for a UI layer. Nothing here mutates state;
//! every view is recomputed from the entity maps and the ephemeral buffers
//! on each call.

use std::collections::HashSet;

use chatstate_core::{
    Attachment, AttachmentId, Conversation, ConversationId, Message, MessageId, MessageStatus,
    Role, ToolCallId,
};
use serde::Serialize;

use crate::state::ChatState;

/// Where a pending tool call stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolCallPhase {
    /// Arguments are still arriving.
    Streaming,
    /// Arguments are complete; no result has arrived yet.
    AwaitingResult,
}

/// A tool invocation without a result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingToolCall {
    /// Tool call identifier.
    pub tool_call_id: ToolCallId,
    /// Tool name.
    pub tool_name: String,
    /// Arguments received so far (complete once awaiting the result).
    pub arguments: String,
    /// Message carrying the call.
    pub message_id: MessageId,
    /// Phase.
    pub phase: ToolCallPhase,
}

impl ChatState {
    /// Look up a conversation.
    #[must_use]
    pub fn conversation(&self, id: &ConversationId) -> Option<&Conversation> {
        self.conversations.get(id)
    }

    /// All conversations in arrival order.
    pub fn conversations(&self) -> impl Iterator<Item = &Conversation> {
        self.conversations.values()
    }

    /// Conversations that are not archived, most recently updated first.
    #[must_use]
    pub fn active_conversations(&self) -> Vec<&Conversation> {
        let mut active: Vec<_> = self.conversations.values().filter(|c| !c.is_archived()).collect();
        active.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        active
    }

    /// Look up a message.
    #[must_use]
    pub fn message(&self, id: &MessageId) -> Option<&Message> {
        self.messages.get(id)
    }

    /// Look up an attachment.
    #[must_use]
    pub fn attachment(&self, id: &AttachmentId) -> Option<&Attachment> {
        self.attachments.get(id)
    }

    /// Known attachments referenced by a message, in reference order.
    #[must_use]
    pub fn attachments_for(&self, message_id: &MessageId) -> Vec<&Attachment> {
        self.messages.get(message_id).map_or_else(Vec::new, |m| {
            m.attachment_ids()
                .filter_map(|id| self.attachments.get(id))
                .collect()
        })
    }

    /// Messages of a conversation ordered by creation time.
    ///
    /// Messages with equal timestamps keep their arrival order.
    #[must_use]
    pub fn messages(&self, conversation_id: &ConversationId) -> Vec<&Message> {
        let mut messages: Vec<&Message> = self
            .message_ids(conversation_id)
            .iter()
            .filter_map(|id| self.messages.get(id))
            .collect();
        messages.sort_by_key(|m| m.created_at);
        messages
    }

    /// Whether any message of the conversation is still streaming.
    #[must_use]
    pub fn is_streaming(&self, conversation_id: &ConversationId) -> bool {
        self.message_ids(conversation_id).iter().any(|id| {
            self.messages
                .get(id)
                .is_some_and(|m| m.status == MessageStatus::Streaming)
        })
    }

    /// Text to display for a message: the live buffer while streaming,
    /// the settled content otherwise.
    #[must_use]
    pub fn live_text(&self, message_id: &MessageId) -> Option<&str> {
        self.buffers
            .get(message_id)
            .or_else(|| self.messages.get(message_id).map(|m| m.content.as_str()))
    }

    /// Tool calls of a conversation still waiting on arguments or a result.
    ///
    /// In-flight calls come first in start order, then finalized calls in
    /// message order.
    #[must_use]
    pub fn pending_tool_calls(&self, conversation_id: &ConversationId) -> Vec<PendingToolCall> {
        let ids = self.message_ids(conversation_id);
        let in_conversation: HashSet<&MessageId> = ids.iter().collect();

        let mut pending: Vec<PendingToolCall> = self
            .tool_calls
            .iter()
            .filter(|r| in_conversation.contains(&r.owner))
            .map(|r| PendingToolCall {
                tool_call_id: r.tool_call_id.clone(),
                tool_name: r.tool_name.clone(),
                arguments: r.args_buffer.clone(),
                message_id: r.owner.clone(),
                phase: ToolCallPhase::Streaming,
            })
            .collect();

        let messages: Vec<&Message> = ids.iter().filter_map(|id| self.messages.get(id)).collect();
        let answered: HashSet<&ToolCallId> = messages
            .iter()
            .filter(|m| m.role == Role::Tool)
            .filter_map(|m| m.tool_call_id.as_ref())
            .collect();

        for message in &messages {
            for call in &message.tool_calls {
                if !answered.contains(&call.id) {
                    pending.push(PendingToolCall {
                        tool_call_id: call.id.clone(),
                        tool_name: call.name.clone(),
                        arguments: call.arguments.clone(),
                        message_id: message.id.clone(),
                        phase: ToolCallPhase::AwaitingResult,
                    });
                }
            }
        }
        pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reducer::{reduce, ReduceContext};
    use chatstate_core::{ContentPart, Snapshot, StoreEvent};
    use chrono::{Duration, TimeZone, Utc};
    use pretty_assertions::assert_eq;

    fn ctx() -> ReduceContext {
        ReduceContext::new()
            .with_conversation("c1")
            .with_now(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap())
    }

    fn apply(state: &mut ChatState, events: impl IntoIterator<Item = StoreEvent>) {
        let ctx = ctx();
        for event in events {
            reduce(state, event, &ctx);
        }
    }

    #[test]
    fn test_snapshot_projection_sorted_by_creation_time() {
        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let snapshot = Snapshot {
            conversations: vec![Conversation::new("c1", "A", t0), Conversation::new("c2", "B", t0)],
            messages: vec![
                Message::new("late", "c1", Role::Assistant, MessageStatus::Completed, t0 + Duration::minutes(5)),
                Message::new("other", "c2", Role::User, MessageStatus::Completed, t0),
                Message::new("early", "c1", Role::User, MessageStatus::Completed, t0),
            ],
            ..Snapshot::default()
        };
        let mut state = ChatState::new();
        apply(&mut state, [StoreEvent::StateSnapshot(snapshot)]);

        let c1: Vec<_> = state.messages(&"c1".into()).iter().map(|m| m.id.as_str()).collect();
        let c2: Vec<_> = state.messages(&"c2".into()).iter().map(|m| m.id.as_str()).collect();
        assert_eq!(c1, vec!["early", "late"]);
        assert_eq!(c2, vec!["other"]);
    }

    #[test]
    fn test_equal_timestamps_keep_arrival_order() {
        let mut state = ChatState::new();
        apply(
            &mut state,
            ["b", "a", "c"].map(|id| StoreEvent::message_started(id, chatstate_core::Role::User)),
        );
        let ids: Vec<_> = state.messages(&"c1".into()).iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_streaming_flag_and_live_text() {
        let mut state = ChatState::new();
        apply(
            &mut state,
            [
                StoreEvent::message_started("m1", Role::Assistant),
                StoreEvent::message_content("m1", "Hel"),
            ],
        );
        assert!(state.is_streaming(&"c1".into()));
        assert_eq!(state.live_text(&"m1".into()), Some("Hel"));
        assert_eq!(state.message(&"m1".into()).unwrap().content, "");

        apply(
            &mut state,
            [StoreEvent::message_content("m1", "lo"), StoreEvent::message_ended("m1")],
        );
        assert!(!state.is_streaming(&"c1".into()));
        assert_eq!(state.live_text(&"m1".into()), Some("Hello"));
        assert_eq!(state.live_text(&"nope".into()), None);
    }

    #[test]
    fn test_pending_tool_calls() {
        let mut state = ChatState::new();
        apply(
            &mut state,
            [
                StoreEvent::message_started("m1", Role::Assistant),
                StoreEvent::tool_call_started("done", "lookup", Some("m1".into())),
                StoreEvent::tool_call_ended("done"),
                StoreEvent::tool_call_started("waiting", "search", Some("m1".into())),
                StoreEvent::tool_call_ended("waiting"),
                StoreEvent::tool_call_started("live", "fetch", Some("m1".into())),
                StoreEvent::tool_call_args("live", "{\"url\":"),
                StoreEvent::ToolCallResult {
                    message_id: "t1".into(),
                    tool_call_id: "done".into(),
                    content: "found".into(),
                    conversation_id: None,
                    created_at: None,
                },
            ],
        );
        let pending = state.pending_tool_calls(&"c1".into());
        let summary: Vec<_> = pending
            .iter()
            .map(|p| (p.tool_call_id.as_str(), p.phase, p.arguments.as_str()))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("live", ToolCallPhase::Streaming, "{\"url\":"),
                ("waiting", ToolCallPhase::AwaitingResult, ""),
            ]
        );
        assert!(state.pending_tool_calls(&"c2".into()).is_empty());
    }

    #[test]
    fn test_active_conversations_exclude_archived() {
        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mut state = ChatState::new();
        apply(
            &mut state,
            [
                StoreEvent::ConversationCreated(Conversation::new("old", "Old", t0)),
                StoreEvent::ConversationCreated(Conversation::new("new", "New", t0 + Duration::hours(1))),
                StoreEvent::ConversationCreated(Conversation::new("gone", "Gone", t0)),
                StoreEvent::ConversationArchived { conversation_id: "gone".into() },
            ],
        );
        let active: Vec<_> = state.active_conversations().iter().map(|c| c.id.as_str()).collect();
        assert_eq!(active, vec!["new", "old"]);
        assert_eq!(state.conversations().count(), 3);
    }

    #[test]
    fn test_attachments_for_message() {
        let mut state = ChatState::new();
        let mut message = Message::new("m1", "c1", Role::User, MessageStatus::Completed, ctx().now);
        message.parts = vec![
            ContentPart::Attachment { attachment_id: "a1".into() },
            ContentPart::Attachment { attachment_id: "missing".into() },
        ];
        apply(
            &mut state,
            [
                StoreEvent::AttachmentUpdated(Attachment::new("a1", "a.png", "image/png", 1, "s3://a1")),
                StoreEvent::MessageUpserted(message),
            ],
        );
        let names: Vec<_> = state.attachments_for(&"m1".into()).iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["a.png"]);
        assert!(state.attachment(&"a1".into()).is_some());
    }
}
