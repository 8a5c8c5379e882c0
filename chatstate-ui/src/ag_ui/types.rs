//! Inbound AG-UI events.
//!
//! Each event is a flat JSON object whose `type` names the variant; most
//! carry an optional millisecond `timestamp`. Only the fields the store
//! consumes are modeled strictly; unknown fields are ignored so newer
//! servers keep decoding.
//!
//! Groups: run lifecycle and steps, text messages (plus chunks), thinking,
//! tool calls (plus chunks and results), state sync, passthrough.

use chatstate_core::{
    ChatStateError, MessageId, PatchOperation, Result, Role, Snapshot, ToolCall, ToolCallId,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Event type discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    /// Run has started.
    RunStarted,
    /// Run has finished successfully.
    RunFinished,
    /// Run encountered an error.
    RunError,
    /// Step started.
    StepStarted,
    /// Step finished.
    StepFinished,
    /// Text message started.
    TextMessageStart,
    /// Text message content delta.
    TextMessageContent,
    /// Text message ended.
    TextMessageEnd,
    /// Combined start/content chunk.
    TextMessageChunk,
    /// Thinking/reasoning started.
    ThinkingStart,
    /// Thinking/reasoning ended.
    ThinkingEnd,
    /// Thinking text message started (nested in thinking).
    ThinkingTextMessageStart,
    /// Thinking text message content delta.
    ThinkingTextMessageContent,
    /// Thinking text message ended.
    ThinkingTextMessageEnd,
    /// Tool call started.
    ToolCallStart,
    /// Tool call arguments delta.
    ToolCallArgs,
    /// Tool call ended (arguments complete).
    ToolCallEnd,
    /// Combined start/args chunk.
    ToolCallChunk,
    /// Tool call result received.
    ToolCallResult,
    /// State snapshot (full state).
    StateSnapshot,
    /// State delta (JSON patch).
    StateDelta,
    /// Messages snapshot.
    MessagesSnapshot,
    /// Custom event.
    Custom,
    /// Raw event (passthrough).
    Raw,
}

impl EventType {
    /// Parse a wire type name. Unknown names yield `None`.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        serde_json::from_value(Value::String(name.to_string())).ok()
    }

    /// Wire type name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::RunStarted => "RUN_STARTED",
            Self::RunFinished => "RUN_FINISHED",
            Self::RunError => "RUN_ERROR",
            Self::StepStarted => "STEP_STARTED",
            Self::StepFinished => "STEP_FINISHED",
            Self::TextMessageStart => "TEXT_MESSAGE_START",
            Self::TextMessageContent => "TEXT_MESSAGE_CONTENT",
            Self::TextMessageEnd => "TEXT_MESSAGE_END",
            Self::TextMessageChunk => "TEXT_MESSAGE_CHUNK",
            Self::ThinkingStart => "THINKING_START",
            Self::ThinkingEnd => "THINKING_END",
            Self::ThinkingTextMessageStart => "THINKING_TEXT_MESSAGE_START",
            Self::ThinkingTextMessageContent => "THINKING_TEXT_MESSAGE_CONTENT",
            Self::ThinkingTextMessageEnd => "THINKING_TEXT_MESSAGE_END",
            Self::ToolCallStart => "TOOL_CALL_START",
            Self::ToolCallArgs => "TOOL_CALL_ARGS",
            Self::ToolCallEnd => "TOOL_CALL_END",
            Self::ToolCallChunk => "TOOL_CALL_CHUNK",
            Self::ToolCallResult => "TOOL_CALL_RESULT",
            Self::StateSnapshot => "STATE_SNAPSHOT",
            Self::StateDelta => "STATE_DELTA",
            Self::MessagesSnapshot => "MESSAGES_SNAPSHOT",
            Self::Custom => "CUSTOM",
            Self::Raw => "RAW",
        }
    }
}

fn now_millis() -> Option<i64> {
    Some(chrono::Utc::now().timestamp_millis())
}

// ============================================================================
// Run Lifecycle Events
// ============================================================================

/// Run started event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunStartedEvent {
    /// Thread identifier (the conversation).
    pub thread_id: String,
    /// Run identifier.
    pub run_id: String,
    /// Timestamp in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

impl RunStartedEvent {
    /// Create a new run started event.
    pub fn new(thread_id: impl Into<String>, run_id: impl Into<String>) -> Self {
        Self {
            thread_id: thread_id.into(),
            run_id: run_id.into(),
            timestamp: now_millis(),
        }
    }
}

/// Run finished event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunFinishedEvent {
    /// Thread identifier.
    pub thread_id: String,
    /// Run identifier.
    pub run_id: String,
    /// Run result, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    /// Timestamp in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

impl RunFinishedEvent {
    /// Create a new run finished event.
    pub fn new(thread_id: impl Into<String>, run_id: impl Into<String>) -> Self {
        Self {
            thread_id: thread_id.into(),
            run_id: run_id.into(),
            result: None,
            timestamp: now_millis(),
        }
    }
}

/// Run error event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunErrorEvent {
    /// Error message.
    pub message: String,
    /// Error code (optional).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Timestamp in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

impl RunErrorEvent {
    /// Create a new run error event.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
            timestamp: now_millis(),
        }
    }
}

/// Step boundary event (`STEP_STARTED` / `STEP_FINISHED`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepEvent {
    /// Step name.
    pub step_name: String,
    /// Timestamp in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

// ============================================================================
// Text Message Events
// ============================================================================

/// Text message start event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextMessageStartEvent {
    /// Message identifier.
    pub message_id: MessageId,
    /// Role of the message sender (assistant when absent).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    /// Timestamp in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

impl TextMessageStartEvent {
    /// Create a new text message start event.
    pub fn new(message_id: impl Into<MessageId>) -> Self {
        Self {
            message_id: message_id.into(),
            role: Some(Role::Assistant),
            timestamp: now_millis(),
        }
    }

    /// Set the role.
    #[must_use]
    pub fn with_role(mut self, role: Role) -> Self {
        self.role = Some(role);
        self
    }
}

/// Text message content event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextMessageContentEvent {
    /// Message identifier.
    pub message_id: MessageId,
    /// Content delta.
    pub delta: String,
    /// Timestamp in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

impl TextMessageContentEvent {
    /// Create a new text message content event.
    pub fn new(message_id: impl Into<MessageId>, delta: impl Into<String>) -> Self {
        Self {
            message_id: message_id.into(),
            delta: delta.into(),
            timestamp: now_millis(),
        }
    }
}

/// Text message end event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextMessageEndEvent {
    /// Message identifier.
    pub message_id: MessageId,
    /// Timestamp in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

impl TextMessageEndEvent {
    /// Create a new text message end event.
    pub fn new(message_id: impl Into<MessageId>) -> Self {
        Self {
            message_id: message_id.into(),
            timestamp: now_millis(),
        }
    }
}

/// Combined text chunk: implicitly starts the message, then appends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextMessageChunkEvent {
    /// Message identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<MessageId>,
    /// Role of the sender.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    /// Content delta.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delta: Option<String>,
    /// Timestamp in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

// ============================================================================
// Thinking Events
// ============================================================================

/// Any thinking event. Reasoning text is not part of the conversation
/// model, so only the timestamp is kept.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThinkingEvent {
    /// Content delta, for `THINKING_TEXT_MESSAGE_CONTENT`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delta: Option<String>,
    /// Timestamp in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

// ============================================================================
// Tool Call Events
// ============================================================================

/// Tool call start event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCallStartEvent {
    /// Tool call identifier.
    pub tool_call_id: ToolCallId,
    /// Tool name.
    pub tool_call_name: String,
    /// Parent message ID (the assistant message containing this tool call).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_message_id: Option<MessageId>,
    /// Timestamp in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

impl ToolCallStartEvent {
    /// Create a new tool call start event.
    pub fn new(tool_call_id: impl Into<ToolCallId>, tool_call_name: impl Into<String>) -> Self {
        Self {
            tool_call_id: tool_call_id.into(),
            tool_call_name: tool_call_name.into(),
            parent_message_id: None,
            timestamp: now_millis(),
        }
    }

    /// Set the parent message ID.
    #[must_use]
    pub fn with_parent_message_id(mut self, id: impl Into<MessageId>) -> Self {
        self.parent_message_id = Some(id.into());
        self
    }
}

/// Tool call args event (streaming arguments).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCallArgsEvent {
    /// Tool call identifier.
    pub tool_call_id: ToolCallId,
    /// Arguments delta (JSON fragment).
    pub delta: String,
    /// Timestamp in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

impl ToolCallArgsEvent {
    /// Create a new tool call args event.
    pub fn new(tool_call_id: impl Into<ToolCallId>, delta: impl Into<String>) -> Self {
        Self {
            tool_call_id: tool_call_id.into(),
            delta: delta.into(),
            timestamp: now_millis(),
        }
    }
}

/// Tool call end event (arguments complete).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCallEndEvent {
    /// Tool call identifier.
    pub tool_call_id: ToolCallId,
    /// Timestamp in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

impl ToolCallEndEvent {
    /// Create a new tool call end event.
    pub fn new(tool_call_id: impl Into<ToolCallId>) -> Self {
        Self {
            tool_call_id: tool_call_id.into(),
            timestamp: now_millis(),
        }
    }
}

/// Combined tool call chunk: implicitly starts the call, then appends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCallChunkEvent {
    /// Tool call identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<ToolCallId>,
    /// Tool name (present on the first chunk).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_name: Option<String>,
    /// Parent message ID.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_message_id: Option<MessageId>,
    /// Arguments delta.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delta: Option<String>,
    /// Timestamp in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

/// Tool call result event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCallResultEvent {
    /// The `tool` message carrying the result.
    pub message_id: MessageId,
    /// Tool call identifier.
    pub tool_call_id: ToolCallId,
    /// Result content.
    pub content: String,
    /// Role (always `tool` when present).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    /// Timestamp in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

impl ToolCallResultEvent {
    /// Create a new tool call result event.
    pub fn new(
        message_id: impl Into<MessageId>,
        tool_call_id: impl Into<ToolCallId>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            message_id: message_id.into(),
            tool_call_id: tool_call_id.into(),
            content: content.into(),
            role: Some(Role::Tool),
            timestamp: now_millis(),
        }
    }
}

// ============================================================================
// State Events
// ============================================================================

/// State snapshot event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateSnapshotEvent {
    /// Flattened state.
    pub snapshot: Snapshot,
    /// Timestamp in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

impl StateSnapshotEvent {
    /// Create a new state snapshot event.
    pub fn new(snapshot: Snapshot) -> Self {
        Self {
            snapshot,
            timestamp: now_millis(),
        }
    }
}

/// State delta event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateDeltaEvent {
    /// JSON patch operations against the flattened state.
    pub delta: Vec<PatchOperation>,
    /// Timestamp in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

impl StateDeltaEvent {
    /// Create a new state delta event.
    pub fn new(delta: Vec<PatchOperation>) -> Self {
        Self {
            delta,
            timestamp: now_millis(),
        }
    }
}

/// Function part of an AG-UI tool call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionCall {
    /// Tool name.
    pub name: String,
    /// Raw argument string.
    #[serde(default)]
    pub arguments: String,
}

/// A tool call as it appears inside a snapshot message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireToolCall {
    /// Tool call identifier.
    pub id: ToolCallId,
    /// Always `function`.
    #[serde(rename = "type", default = "function_type")]
    pub call_type: String,
    /// Function name and arguments.
    pub function: FunctionCall,
}

fn function_type() -> String {
    "function".to_string()
}

impl From<WireToolCall> for ToolCall {
    fn from(call: WireToolCall) -> Self {
        ToolCall::new(call.id, call.function.name, call.function.arguments)
    }
}

/// A message inside a messages snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireMessage {
    /// Message identifier.
    pub id: MessageId,
    /// Author role.
    pub role: Role,
    /// Text content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Tool calls made by an assistant message.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<WireToolCall>,
    /// For tool messages: the answered tool call.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<ToolCallId>,
}

/// Messages snapshot event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagesSnapshotEvent {
    /// Messages in display order.
    pub messages: Vec<WireMessage>,
    /// Timestamp in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

// ============================================================================
// Custom/Raw Events
// ============================================================================

/// Custom or raw passthrough event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PassthroughEvent {
    /// Event name (custom events).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Payload.
    #[serde(default, alias = "event", alias = "data")]
    pub value: Value,
    /// Timestamp in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

// ============================================================================
// Tagged union
// ============================================================================

/// Any AG-UI event, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AgUiEvent {
    /// `RUN_STARTED`
    RunStarted(RunStartedEvent),
    /// `RUN_FINISHED`
    RunFinished(RunFinishedEvent),
    /// `RUN_ERROR`
    RunError(RunErrorEvent),
    /// `STEP_STARTED`
    StepStarted(StepEvent),
    /// `STEP_FINISHED`
    StepFinished(StepEvent),
    /// `TEXT_MESSAGE_START`
    TextMessageStart(TextMessageStartEvent),
    /// `TEXT_MESSAGE_CONTENT`
    TextMessageContent(TextMessageContentEvent),
    /// `TEXT_MESSAGE_END`
    TextMessageEnd(TextMessageEndEvent),
    /// `TEXT_MESSAGE_CHUNK`
    TextMessageChunk(TextMessageChunkEvent),
    /// `THINKING_START`
    ThinkingStart(ThinkingEvent),
    /// `THINKING_END`
    ThinkingEnd(ThinkingEvent),
    /// `THINKING_TEXT_MESSAGE_START`
    ThinkingTextMessageStart(ThinkingEvent),
    /// `THINKING_TEXT_MESSAGE_CONTENT`
    ThinkingTextMessageContent(ThinkingEvent),
    /// `THINKING_TEXT_MESSAGE_END`
    ThinkingTextMessageEnd(ThinkingEvent),
    /// `TOOL_CALL_START`
    ToolCallStart(ToolCallStartEvent),
    /// `TOOL_CALL_ARGS`
    ToolCallArgs(ToolCallArgsEvent),
    /// `TOOL_CALL_END`
    ToolCallEnd(ToolCallEndEvent),
    /// `TOOL_CALL_CHUNK`
    ToolCallChunk(ToolCallChunkEvent),
    /// `TOOL_CALL_RESULT`
    ToolCallResult(ToolCallResultEvent),
    /// `STATE_SNAPSHOT`
    StateSnapshot(StateSnapshotEvent),
    /// `STATE_DELTA`
    StateDelta(StateDeltaEvent),
    /// `MESSAGES_SNAPSHOT`
    MessagesSnapshot(MessagesSnapshotEvent),
    /// `CUSTOM`
    Custom(PassthroughEvent),
    /// `RAW`
    Raw(PassthroughEvent),
}

impl AgUiEvent {
    /// Decode a `(type, payload)` pair.
    ///
    /// Returns `Ok(None)` for a type name this protocol does not know, and
    /// an error for a known type whose payload does not decode.
    pub fn decode(event_type: &str, payload: Value) -> Result<Option<Self>> {
        if EventType::parse(event_type).is_none() {
            return Ok(None);
        }
        let mut object = match payload {
            Value::Object(map) => map,
            Value::Null => serde_json::Map::new(),
            other => {
                return Err(ChatStateError::malformed(
                    event_type,
                    format!("expected an object, got {other}"),
                ))
            }
        };
        object.insert("type".to_string(), Value::String(event_type.to_string()));
        serde_json::from_value(Value::Object(object))
            .map(Some)
            .map_err(|e| ChatStateError::malformed(event_type, e))
    }

    /// Event type discriminator.
    #[must_use]
    pub fn event_type(&self) -> EventType {
        match self {
            Self::RunStarted(_) => EventType::RunStarted,
            Self::RunFinished(_) => EventType::RunFinished,
            Self::RunError(_) => EventType::RunError,
            Self::StepStarted(_) => EventType::StepStarted,
            Self::StepFinished(_) => EventType::StepFinished,
            Self::TextMessageStart(_) => EventType::TextMessageStart,
            Self::TextMessageContent(_) => EventType::TextMessageContent,
            Self::TextMessageEnd(_) => EventType::TextMessageEnd,
            Self::TextMessageChunk(_) => EventType::TextMessageChunk,
            Self::ThinkingStart(_) => EventType::ThinkingStart,
            Self::ThinkingEnd(_) => EventType::ThinkingEnd,
            Self::ThinkingTextMessageStart(_) => EventType::ThinkingTextMessageStart,
            Self::ThinkingTextMessageContent(_) => EventType::ThinkingTextMessageContent,
            Self::ThinkingTextMessageEnd(_) => EventType::ThinkingTextMessageEnd,
            Self::ToolCallStart(_) => EventType::ToolCallStart,
            Self::ToolCallArgs(_) => EventType::ToolCallArgs,
            Self::ToolCallEnd(_) => EventType::ToolCallEnd,
            Self::ToolCallChunk(_) => EventType::ToolCallChunk,
            Self::ToolCallResult(_) => EventType::ToolCallResult,
            Self::StateSnapshot(_) => EventType::StateSnapshot,
            Self::StateDelta(_) => EventType::StateDelta,
            Self::MessagesSnapshot(_) => EventType::MessagesSnapshot,
            Self::Custom(_) => EventType::Custom,
            Self::Raw(_) => EventType::Raw,
        }
    }

    /// Timestamp (milliseconds since epoch), when the sender set one.
    #[must_use]
    pub fn timestamp(&self) -> Option<i64> {
        match self {
            Self::RunStarted(e) => e.timestamp,
            Self::RunFinished(e) => e.timestamp,
            Self::RunError(e) => e.timestamp,
            Self::StepStarted(e) | Self::StepFinished(e) => e.timestamp,
            Self::TextMessageStart(e) => e.timestamp,
            Self::TextMessageContent(e) => e.timestamp,
            Self::TextMessageEnd(e) => e.timestamp,
            Self::TextMessageChunk(e) => e.timestamp,
            Self::ThinkingStart(e)
            | Self::ThinkingEnd(e)
            | Self::ThinkingTextMessageStart(e)
            | Self::ThinkingTextMessageContent(e)
            | Self::ThinkingTextMessageEnd(e) => e.timestamp,
            Self::ToolCallStart(e) => e.timestamp,
            Self::ToolCallArgs(e) => e.timestamp,
            Self::ToolCallEnd(e) => e.timestamp,
            Self::ToolCallChunk(e) => e.timestamp,
            Self::ToolCallResult(e) => e.timestamp,
            Self::StateSnapshot(e) => e.timestamp,
            Self::StateDelta(e) => e.timestamp,
            Self::MessagesSnapshot(e) => e.timestamp,
            Self::Custom(e) | Self::Raw(e) => e.timestamp,
        }
    }

    /// Encode as a JSON string (including `type`).
    #[must_use]
    pub fn encode(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}
