//! AG-UI protocol adapter for chatstate.
//!
//! Decodes AG-UI (Agent-User Interaction) events as they arrive on a client
//! and translates them into [`StoreEvent`](chatstate_core::StoreEvent)s.
//!
//! # Overview
//!
//! - **Run lifecycle**: `RUN_STARTED`, `RUN_FINISHED`, `RUN_ERROR`
//! - **Text messages**: start/content/end, plus the combined `TEXT_MESSAGE_CHUNK`
//! - **Tool calls**: start/args/end/result, plus the combined `TOOL_CALL_CHUNK`
//! - **State management**: `STATE_SNAPSHOT`, `STATE_DELTA`, `MESSAGES_SNAPSHOT`
//!
//! Thinking, step, custom and raw events decode but carry nothing the
//! conversation model keeps.
//!
//! # Example
//!
//! ```rust
//! use chatstate_ui::ag_ui::AgUiEvent;
//! use serde_json::json;
//!
//! let event = AgUiEvent::decode("TEXT_MESSAGE_CONTENT", json!({"messageId": "m1", "delta": "Hi"}))
//!     .unwrap()
//!     .unwrap();
//! assert_eq!(event.into_store_events().len(), 1);
//! ```

mod adapter;
mod types;

pub use types::{
    AgUiEvent,
    EventType,
    FunctionCall,
    MessagesSnapshotEvent,
    PassthroughEvent,
    // Run lifecycle
    RunErrorEvent,
    RunFinishedEvent,
    RunStartedEvent,
    // State
    StateDeltaEvent,
    StateSnapshotEvent,
    StepEvent,
    // Text messages
    TextMessageChunkEvent,
    TextMessageContentEvent,
    TextMessageEndEvent,
    TextMessageStartEvent,
    ThinkingEvent,
    // Tool calls
    ToolCallArgsEvent,
    ToolCallChunkEvent,
    ToolCallEndEvent,
    ToolCallResultEvent,
    ToolCallStartEvent,
    WireMessage,
    WireToolCall,
};
