//! Snapshot/patch reconciliation.
//!
//! The store is flattened into a [`Snapshot`] of ordered lists, patched in
//! that shape, and re-normalized back into keyed maps.

use chatstate_core::{PatchOperation, Result, Snapshot};

use crate::patch::apply_patch;
use crate::state::ChatState;

impl ChatState {
    /// Flatten the settled state. Ephemeral buffers and in-progress tool
    /// calls are not included.
    #[must_use]
    pub fn to_snapshot(&self) -> Snapshot {
        Snapshot {
            revision: self.revision,
            metadata: self.metadata.clone(),
            conversations: self.conversations.values().cloned().collect(),
            messages: self.messages.values().cloned().collect(),
            attachments: self.attachments.values().cloned().collect(),
        }
    }

    /// Rebuild a store from a snapshot, with no ephemeral state.
    ///
    /// The message index is rebuilt in snapshot list order; every
    /// conversation gets an index entry even when it has no messages.
    #[must_use]
    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        let mut state = ChatState {
            revision: snapshot.revision,
            metadata: snapshot.metadata,
            ..ChatState::default()
        };
        for conversation in snapshot.conversations {
            state.index.entry(conversation.id.clone()).or_default();
            state.conversations.insert(conversation.id.clone(), conversation);
        }
        for message in snapshot.messages {
            state.put_message(message);
        }
        for attachment in snapshot.attachments {
            state.attachments.insert(attachment.id.clone(), attachment);
        }
        state
    }

    /// Compute the state a delta produces, without touching `self`.
    ///
    /// The delta is applied to the flattened state and the result
    /// re-normalized. Text buffers and in-progress tool calls whose message
    /// survives the patch are carried over. The resulting revision is at
    /// least one past the current one.
    pub fn patched(&self, operations: &[PatchOperation]) -> Result<ChatState> {
        let mut document = self.to_snapshot().to_value()?;
        apply_patch(&mut document, operations)?;
        let snapshot = Snapshot::from_value(document)?;

        let mut next = ChatState::from_snapshot(snapshot);
        next.buffers = self.buffers.clone();
        next.buffers.retain(|id| next.messages.contains_key(id));
        next.tool_calls = self.tool_calls.clone();
        let surviving = &next.messages;
        next.tool_calls.retain(|r| surviving.contains_key(&r.owner));
        next.chunked_message = self
            .chunked_message
            .clone()
            .filter(|id| next.messages.contains_key(id));
        next.chunked_tool_call = self
            .chunked_tool_call
            .clone()
            .filter(|id| next.tool_calls.contains(id));
        next.revision = next.revision.max(self.revision.saturating_add(1));
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatstate_core::{Attachment, ChatStateError, Conversation, Message, MessageStatus, Role};
    use chrono::{Duration, TimeZone, Utc};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn sample() -> Snapshot {
        let t0 = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        Snapshot {
            revision: 7,
            metadata: json!({"user": "u1"}).as_object().cloned().unwrap(),
            conversations: vec![
                Conversation::new("c2", "Second", t0),
                Conversation::new("c1", "First", t0),
            ],
            messages: vec![
                Message::new("m3", "c1", Role::Assistant, MessageStatus::Completed, t0 + Duration::seconds(3))
                    .with_content("three"),
                Message::new("m1", "c1", Role::User, MessageStatus::Completed, t0 + Duration::seconds(1))
                    .with_content("one"),
                Message::new("m2", "c2", Role::User, MessageStatus::Completed, t0 + Duration::seconds(2)),
            ],
            attachments: vec![Attachment::new("a1", "doc.pdf", "application/pdf", 10, "s3://a1")],
        }
    }

    #[test]
    fn test_round_trip_preserves_order() {
        let snapshot = sample();
        let state = ChatState::from_snapshot(snapshot.clone());
        assert_eq!(state.to_snapshot(), snapshot);
    }

    #[test]
    fn test_from_snapshot_builds_index() {
        let state = ChatState::from_snapshot(sample());
        let ids: Vec<_> = state.message_ids(&"c1".into()).iter().map(|m| m.as_str()).collect();
        assert_eq!(ids, vec!["m3", "m1"]);
        assert_eq!(state.message_ids(&"c2".into()).len(), 1);
        assert_eq!(state.revision(), 7);
    }

    #[test]
    fn test_from_snapshot_discards_ephemeral_state() {
        let mut state = ChatState::from_snapshot(sample());
        state.buffers.append(&"m3".into(), "more");
        let rebuilt = ChatState::from_snapshot(state.to_snapshot());
        assert!(rebuilt.buffers().is_empty());
    }

    #[test]
    fn test_patched_applies_and_bumps_revision() {
        let state = ChatState::from_snapshot(sample());
        let next = state
            .patched(&[PatchOperation::replace("/messages/2/content", json!("two"))])
            .unwrap();
        assert_eq!(next.messages[&chatstate_core::MessageId::from("m2")].content, "two");
        assert_eq!(next.revision(), 8);
    }

    #[test]
    fn test_patched_keeps_higher_revision() {
        let state = ChatState::from_snapshot(sample());
        let next = state
            .patched(&[PatchOperation::replace("/revision", json!(20))])
            .unwrap();
        assert_eq!(next.revision(), 20);
    }

    #[test]
    fn test_patched_at_max_revision_saturates() {
        let state = ChatState::from_snapshot(Snapshot { revision: u64::MAX, ..sample() });
        let next = state
            .patched(&[PatchOperation::replace("/messages/2/content", json!("two"))])
            .unwrap();
        assert_eq!(next.revision(), u64::MAX);
    }

    #[test]
    fn test_patched_carries_surviving_buffers() {
        let mut state = ChatState::from_snapshot(sample());
        state.buffers.append(&"m1".into(), "live");
        state.buffers.append(&"m2".into(), "gone");
        let next = state.patched(&[PatchOperation::remove("/messages/2")]).unwrap();
        assert_eq!(next.buffers().get(&"m1".into()), Some("live"));
        assert!(!next.buffers().contains(&"m2".into()));
    }

    #[test]
    fn test_patched_rejects_non_snapshot_shape() {
        let state = ChatState::from_snapshot(sample());
        let err = state
            .patched(&[PatchOperation::replace("/messages/0/role", json!("robot"))])
            .unwrap_err();
        assert!(matches!(err, ChatStateError::InvalidSnapshot(_)));
    }

    #[test]
    fn test_patched_failure_leaves_original() {
        let state = ChatState::from_snapshot(sample());
        let before = state.to_snapshot();
        assert!(state
            .patched(&[
                PatchOperation::remove("/messages/0"),
                PatchOperation::remove("/conversations/9"),
            ])
            .is_err());
        assert_eq!(state.to_snapshot(), before);
    }
}
