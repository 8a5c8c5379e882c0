//! Translation from AG-UI events into store events.

use chatstate_core::identifier::timestamp_from_millis;
use chatstate_core::{MessageRecord, Role, StoreEvent, ToolCall};

use super::types::{AgUiEvent, TextMessageChunkEvent, ToolCallChunkEvent, WireMessage};

impl From<WireMessage> for MessageRecord {
    fn from(message: WireMessage) -> Self {
        Self {
            id: message.id,
            role: message.role,
            content: message.content.unwrap_or_default(),
            tool_calls: message.tool_calls.into_iter().map(ToolCall::from).collect(),
            tool_call_id: message.tool_call_id,
            created_at: None,
        }
    }
}

impl AgUiEvent {
    /// Translate into the store vocabulary.
    ///
    /// Chunk events stay chunks; the store opens and closes chunked
    /// messages and tool calls itself. Events with no effect on the
    /// conversation model yield nothing.
    #[must_use]
    pub fn into_store_events(self) -> Vec<StoreEvent> {
        let created_at = self.timestamp().and_then(timestamp_from_millis);
        match self {
            AgUiEvent::RunStarted(e) => vec![StoreEvent::RunStarted {
                conversation_id: e.thread_id.into(),
                run_id: e.run_id,
            }],
            AgUiEvent::RunFinished(e) => vec![StoreEvent::RunFinished {
                conversation_id: e.thread_id.into(),
                run_id: e.run_id,
            }],
            AgUiEvent::RunError(e) => vec![StoreEvent::RunErrored {
                conversation_id: None,
                error: e.message,
            }],
            AgUiEvent::TextMessageStart(e) => vec![StoreEvent::MessageStarted {
                message_id: e.message_id,
                conversation_id: None,
                role: e.role.unwrap_or(Role::Assistant),
                client_message_id: None,
                created_at,
            }],
            AgUiEvent::TextMessageContent(e) => {
                vec![StoreEvent::message_content(e.message_id, e.delta)]
            }
            AgUiEvent::TextMessageEnd(e) => vec![StoreEvent::message_ended(e.message_id)],
            AgUiEvent::TextMessageChunk(chunk) => text_chunk(chunk, created_at),
            AgUiEvent::ToolCallStart(e) => vec![StoreEvent::tool_call_started(
                e.tool_call_id,
                e.tool_call_name,
                e.parent_message_id,
            )],
            AgUiEvent::ToolCallArgs(e) => vec![StoreEvent::tool_call_args(e.tool_call_id, e.delta)],
            AgUiEvent::ToolCallEnd(e) => vec![StoreEvent::tool_call_ended(e.tool_call_id)],
            AgUiEvent::ToolCallChunk(chunk) => tool_chunk(chunk),
            AgUiEvent::ToolCallResult(e) => vec![StoreEvent::ToolCallResult {
                message_id: e.message_id,
                tool_call_id: e.tool_call_id,
                content: e.content,
                conversation_id: None,
                created_at,
            }],
            AgUiEvent::StateSnapshot(e) => vec![StoreEvent::StateSnapshot(e.snapshot)],
            AgUiEvent::StateDelta(e) => vec![StoreEvent::StateDelta(e.delta)],
            AgUiEvent::MessagesSnapshot(e) => vec![StoreEvent::MessagesSnapshot {
                conversation_id: None,
                messages: e.messages.into_iter().map(MessageRecord::from).collect(),
            }],
            AgUiEvent::StepStarted(_)
            | AgUiEvent::StepFinished(_)
            | AgUiEvent::ThinkingStart(_)
            | AgUiEvent::ThinkingEnd(_)
            | AgUiEvent::ThinkingTextMessageStart(_)
            | AgUiEvent::ThinkingTextMessageContent(_)
            | AgUiEvent::ThinkingTextMessageEnd(_)
            | AgUiEvent::Custom(_)
            | AgUiEvent::Raw(_) => Vec::new(),
        }
    }
}

fn text_chunk(
    chunk: TextMessageChunkEvent,
    created_at: Option<chrono::DateTime<chrono::Utc>>,
) -> Vec<StoreEvent> {
    let Some(message_id) = chunk.message_id else {
        tracing::debug!(target: "chatstate::adapter", "dropping text chunk without messageId");
        return Vec::new();
    };
    vec![StoreEvent::MessageChunk {
        message_id,
        role: chunk.role.unwrap_or(Role::Assistant),
        delta: chunk.delta.unwrap_or_default(),
        created_at,
    }]
}

fn tool_chunk(chunk: ToolCallChunkEvent) -> Vec<StoreEvent> {
    let Some(tool_call_id) = chunk.tool_call_id else {
        tracing::debug!(target: "chatstate::adapter", "dropping tool call chunk without toolCallId");
        return Vec::new();
    };
    vec![StoreEvent::ToolCallChunk {
        tool_call_id,
        tool_call_name: chunk.tool_call_name,
        parent_message_id: chunk.parent_message_id,
        delta: chunk.delta.unwrap_or_default(),
    }]
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatstate_core::{MessageId, PatchOperation, Snapshot, ToolCallId};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn adapt(event_type: &str, payload: serde_json::Value) -> Vec<StoreEvent> {
        AgUiEvent::decode(event_type, payload)
            .unwrap()
            .unwrap()
            .into_store_events()
    }

    #[test]
    fn test_text_message_sequence() {
        let start = adapt("TEXT_MESSAGE_START", json!({"messageId": "m1", "role": "assistant"}));
        assert!(matches!(
            &start[..],
            [StoreEvent::MessageStarted { message_id, role: Role::Assistant, conversation_id: None, .. }]
                if message_id.as_str() == "m1"
        ));
        assert_eq!(
            adapt("TEXT_MESSAGE_CONTENT", json!({"messageId": "m1", "delta": "Hi"})),
            vec![StoreEvent::message_content("m1", "Hi")]
        );
        assert_eq!(
            adapt("TEXT_MESSAGE_END", json!({"messageId": "m1"})),
            vec![StoreEvent::message_ended("m1")]
        );
    }

    #[test]
    fn test_start_without_role_defaults_to_assistant() {
        let events = adapt("TEXT_MESSAGE_START", json!({"messageId": "m1"}));
        assert!(matches!(events[0], StoreEvent::MessageStarted { role: Role::Assistant, .. }));
    }

    #[test]
    fn test_timestamp_becomes_created_at() {
        let events = adapt(
            "TEXT_MESSAGE_START",
            json!({"messageId": "m1", "timestamp": 1_700_000_000_000_i64}),
        );
        let StoreEvent::MessageStarted { created_at, .. } = &events[0] else {
            panic!("expected start");
        };
        assert_eq!(created_at.map(|t| t.timestamp()), Some(1_700_000_000));
    }

    #[test]
    fn test_text_chunk_maps_to_message_chunk() {
        let events = adapt("TEXT_MESSAGE_CHUNK", json!({"messageId": "m1", "delta": "Hey"}));
        assert_eq!(
            events,
            vec![StoreEvent::MessageChunk {
                message_id: "m1".into(),
                role: Role::Assistant,
                delta: "Hey".into(),
                created_at: None,
            }]
        );

        assert!(adapt("TEXT_MESSAGE_CHUNK", json!({"delta": "orphan"})).is_empty());
    }

    #[test]
    fn test_tool_call_sequence() {
        assert_eq!(
            adapt(
                "TOOL_CALL_START",
                json!({"toolCallId": "tc1", "toolCallName": "search", "parentMessageId": "m1"})
            ),
            vec![StoreEvent::tool_call_started("tc1", "search", Some(MessageId::from("m1")))]
        );
        assert_eq!(
            adapt("TOOL_CALL_ARGS", json!({"toolCallId": "tc1", "delta": "{}"})),
            vec![StoreEvent::tool_call_args("tc1", "{}")]
        );
        assert_eq!(
            adapt("TOOL_CALL_END", json!({"toolCallId": "tc1"})),
            vec![StoreEvent::tool_call_ended("tc1")]
        );
    }

    #[test]
    fn test_tool_chunk_maps_to_tool_call_chunk() {
        let first = adapt(
            "TOOL_CALL_CHUNK",
            json!({"toolCallId": "tc1", "toolCallName": "search", "parentMessageId": "m1", "delta": "{\"q\""}),
        );
        assert_eq!(
            first,
            vec![StoreEvent::ToolCallChunk {
                tool_call_id: "tc1".into(),
                tool_call_name: Some("search".into()),
                parent_message_id: Some("m1".into()),
                delta: "{\"q\"".into(),
            }]
        );
        let rest = adapt("TOOL_CALL_CHUNK", json!({"toolCallId": "tc1"}));
        assert_eq!(
            rest,
            vec![StoreEvent::ToolCallChunk {
                tool_call_id: "tc1".into(),
                tool_call_name: None,
                parent_message_id: None,
                delta: String::new(),
            }]
        );
        assert!(adapt("TOOL_CALL_CHUNK", json!({"delta": "{}"})).is_empty());
    }

    #[test]
    fn test_tool_call_result() {
        let events = adapt(
            "TOOL_CALL_RESULT",
            json!({"messageId": "t1", "toolCallId": "tc1", "content": "42", "role": "tool"}),
        );
        let StoreEvent::ToolCallResult { message_id, tool_call_id, content, .. } = &events[0] else {
            panic!("expected tool call result");
        };
        assert_eq!(message_id.as_str(), "t1");
        assert_eq!(tool_call_id, &ToolCallId::from("tc1"));
        assert_eq!(content, "42");
    }

    #[test]
    fn test_run_lifecycle() {
        let events = adapt("RUN_STARTED", json!({"threadId": "c1", "runId": "r1"}));
        assert!(matches!(
            &events[..],
            [StoreEvent::RunStarted { conversation_id, .. }] if conversation_id.as_str() == "c1"
        ));
        let events = adapt("RUN_ERROR", json!({"message": "boom"}));
        assert!(matches!(
            &events[..],
            [StoreEvent::RunErrored { conversation_id: None, error }] if error == "boom"
        ));
    }

    #[test]
    fn test_state_events() {
        let events = adapt("STATE_SNAPSHOT", json!({"snapshot": {"revision": 3}}));
        let StoreEvent::StateSnapshot(snapshot) = &events[0] else {
            panic!("expected snapshot");
        };
        assert_eq!(snapshot, &Snapshot { revision: 3, ..Snapshot::default() });

        let events = adapt(
            "STATE_DELTA",
            json!({"delta": [{"op": "replace", "path": "/revision", "value": 4}]}),
        );
        assert_eq!(
            events,
            vec![StoreEvent::StateDelta(vec![PatchOperation::replace("/revision", json!(4))])]
        );
    }

    #[test]
    fn test_messages_snapshot_records() {
        let events = adapt(
            "MESSAGES_SNAPSHOT",
            json!({"messages": [
                {"id": "m1", "role": "user", "content": "hi"},
                {"id": "m2", "role": "assistant", "toolCalls": [
                    {"id": "tc1", "type": "function", "function": {"name": "f", "arguments": "{}"}}
                ]}
            ]}),
        );
        let StoreEvent::MessagesSnapshot { messages, .. } = &events[0] else {
            panic!("expected messages snapshot");
        };
        assert_eq!(messages[0].content, "hi");
        assert_eq!(messages[1].content, "");
        assert_eq!(messages[1].tool_calls, vec![ToolCall::new("tc1", "f", "{}")]);
    }

    #[test]
    fn test_passthrough_events_map_to_nothing() {
        assert!(adapt("THINKING_START", json!({})).is_empty());
        assert!(adapt("STEP_STARTED", json!({"stepName": "plan"})).is_empty());
        assert!(adapt("CUSTOM", json!({"name": "x", "value": 1})).is_empty());
        assert!(adapt("RAW", json!({"event": {"a": 1}})).is_empty());
    }
}
