//! # chatstate - Conversation State for Streaming Agent UIs
//!
//! chatstate reduces the event stream of an agent backend (AG-UI events or
//! the older dotted lifecycle events) into a normalized conversation store
//! a UI can render from, and issues the outbound intents a chat client
//! needs.
//!
//! ## Quick Start
//!
//! ```rust
//! use chatstate::prelude::*;
//! use serde_json::json;
//!
//! let mut session = Session::default();
//! session.apply_raw("RUN_STARTED", json!({"threadId": "c1", "runId": "r1"}));
//! session.apply_raw("TEXT_MESSAGE_START", json!({"messageId": "m1", "role": "assistant"}));
//! session.apply_raw("TEXT_MESSAGE_CONTENT", json!({"messageId": "m1", "delta": "Hi"}));
//!
//! let state = session.state();
//! assert!(state.is_streaming(&"c1".into()));
//! assert_eq!(state.live_text(&"m1".into()), Some("Hi"));
//! ```
//!
//! ## Architecture
//!
//! - [`chatstate_core`] - Model, events, snapshots, patches and errors
//! - [`chatstate_streaming`] - Text buffers and the tool-call correlator
//! - [`chatstate_ui`] - Wire format adapters
//! - [`chatstate_store`] - Store, reducer, projections, session and client

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![deny(unsafe_code)]

// ============================================================================
// Crate Re-exports
// ============================================================================

/// Model, events, snapshots and errors.
pub use chatstate_core as core;

/// Streaming accumulation state.
pub use chatstate_streaming as streaming;

/// Wire format adapters.
pub use chatstate_ui as ui;

/// Store, reducer and session.
pub use chatstate_store as store;

// ============================================================================
// Flat Re-exports
// ============================================================================

pub use chatstate_core::{
    Attachment, AttachmentId, AttachmentState, ChatStateError, ClientMessageId, ContentPart,
    Conversation, ConversationId, ConversationStatus, Message, MessageId, MessageStatus,
    PatchOperation, Result, Role, Snapshot, StoreEvent, StoreSettings, ToolCall, ToolCallId,
    Usage,
};
pub use chatstate_store::{
    apply_patch, reduce, AttachmentRegistration, ChatClient, ChatState, Intent, IntentTransport,
    PendingToolCall, ReduceContext, RecordingTransport, SendReceipt, Session, ToolCallPhase,
};
pub use chatstate_ui::{adapt, RawEvent};

/// Prelude module for common imports.
///
/// ```rust
/// use chatstate::prelude::*;
/// ```
pub mod prelude {
    pub use crate::core::{
        ChatStateError, ConversationId, Message, MessageId, MessageStatus, Result, Role,
        StoreEvent, StoreSettings, ToolCallId,
    };
    pub use crate::store::{
        reduce, ChatClient, ChatState, IntentTransport, PendingToolCall, ReduceContext, Session,
        ToolCallPhase,
    };
    pub use crate::ui::RawEvent;
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn replay(lines: &[&str]) -> Session {
        let mut session = Session::default();
        for line in lines {
            if let Some(event) = RawEvent::from_json_line(line).unwrap() {
                session.apply_raw_event(event);
            }
        }
        session
    }

    #[test]
    fn test_tool_round_trip_from_wire() {
        let session = replay(&[
            r#"{"type":"RUN_STARTED","threadId":"c1","runId":"r1"}"#,
            r#"data: {"type":"TEXT_MESSAGE_START","messageId":"m1","role":"assistant"}"#,
            r#"{"type":"TOOL_CALL_START","toolCallId":"tc1","toolCallName":"search","parentMessageId":"m1"}"#,
            r#"{"type":"TOOL_CALL_ARGS","toolCallId":"tc1","delta":"{\"q\":"}"#,
            r#"{"type":"TOOL_CALL_ARGS","toolCallId":"tc1","delta":"\"rust\"}"}"#,
            "",
            r#"{"type":"TOOL_CALL_END","toolCallId":"tc1"}"#,
            r#"{"type":"TEXT_MESSAGE_END","messageId":"m1"}"#,
        ]);
        let state = session.state();
        let calls = &state.message(&"m1".into()).unwrap().tool_calls;
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].arguments, r#"{"q":"rust"}"#);

        let pending = state.pending_tool_calls(&"c1".into());
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].phase, ToolCallPhase::AwaitingResult);

        let mut session = session;
        session.apply_raw(
            "TOOL_CALL_RESULT",
            json!({"messageId": "t1", "toolCallId": "tc1", "content": "3 hits"}),
        );
        let state = session.state();
        assert!(state.pending_tool_calls(&"c1".into()).is_empty());
        let roles: Vec<_> = state.messages(&"c1".into()).iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![Role::Assistant, Role::Tool]);
    }

    #[test]
    fn test_chunk_only_stream_settles_on_run_finished() {
        let session = replay(&[
            r#"{"type":"RUN_STARTED","threadId":"c1","runId":"r1"}"#,
            r#"{"type":"TEXT_MESSAGE_CHUNK","messageId":"m1","delta":"Hi"}"#,
            r#"{"type":"TOOL_CALL_CHUNK","toolCallId":"tc1","toolCallName":"f","parentMessageId":"m1","delta":"{}"}"#,
            r#"{"type":"RUN_FINISHED","threadId":"c1","runId":"r1"}"#,
        ]);
        let state = session.state();
        let m1 = state.message(&"m1".into()).unwrap();
        assert_eq!(m1.status, MessageStatus::Completed);
        assert_eq!(m1.content, "Hi");
        assert!(!state.is_streaming(&"c1".into()));
        assert_eq!(state.live_text(&"m1".into()), Some("Hi"));
        let pending: Vec<_> = state
            .pending_tool_calls(&"c1".into())
            .into_iter()
            .map(|p| (p.tool_call_id.to_string(), p.phase))
            .collect();
        assert_eq!(pending, vec![("tc1".to_string(), ToolCallPhase::AwaitingResult)]);
    }

    #[test]
    fn test_state_snapshot_then_delta_from_wire() {
        let mut session = replay(&[r#"{"type":"STATE_SNAPSHOT","snapshot":{
            "revision": 3,
            "conversations": [{"id":"c1","title":"Chat","status":"active","revision":1,
                "createdAt":"2024-05-01T12:00:00Z","updatedAt":"2024-05-01T12:00:00Z"}],
            "messages": [],
            "attachments": []
        }}"#
        .replace('\n', " ")
        .as_str()]);
        assert_eq!(session.state().revision(), 3);

        let changed = session.apply_raw(
            "STATE_DELTA",
            json!({"delta": [{"op": "replace", "path": "/conversations/0/title", "value": "Renamed"}]}),
        );
        assert!(changed);
        assert_eq!(session.state().conversation(&"c1".into()).unwrap().title, "Renamed");
        assert_eq!(session.state().revision(), 4);

        let revision = session.state().revision();
        let rejected = session.apply_raw(
            "STATE_DELTA",
            json!({"delta": [{"op": "remove", "path": "/conversations/5"}]}),
        );
        assert!(!rejected);
        assert_eq!(session.state().revision(), revision);
    }
}
